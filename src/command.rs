use std::fmt::Debug;
use crate::core::{Digit, Error, Index};
use crate::model::SujikoGrid;

pub const ALREADY_EXECUTED: Error =
    Error::new_const("execute(): command was already executed");
pub const NOT_YET_EXECUTED: Error =
    Error::new_const("revert(): command was not yet executed");
pub const ADD_STATE_MISMATCH: Error =
    Error::new_const("add(): execution state of added command does not match the compound's");

/// One reversible mutation of the puzzle grid. A command is created inert,
/// `execute` applies it and `revert` takes it back exactly; both receive the
/// grid explicitly so commands never own or alias puzzle state. Every
/// precondition is checked before any mutation happens.
pub trait Command: Debug {
    /// Applies the command. Errors if it is already executed.
    fn execute(&mut self, grid: &mut SujikoGrid) -> Result<(), Error>;

    /// Takes the command back. Errors if it has not been executed.
    fn revert(&mut self, grid: &mut SujikoGrid) -> Result<(), Error>;

    fn is_executed(&self) -> bool;

    /// The cells this command (transitively, for compounds) reads or writes.
    fn involved_cells(&self) -> Vec<Index>;
}

/// Sets one cell to a new value (or clears it with `None`). The previous
/// value is captured when the command executes, not when it is constructed;
/// the cell may well change in between.
#[derive(Debug, Clone)]
pub struct SetCommand {
    index: Index,
    new: Option<Digit>,
    // Only meaningful once execute() has run at least once.
    prev: Option<Digit>,
    executed: bool,
}

impl SetCommand {
    pub fn new(index: Index, new: Option<Digit>) -> Self {
        SetCommand { index, new, prev: None, executed: false }
    }

    pub fn index(&self) -> Index {
        self.index
    }

    pub fn new_value(&self) -> Option<Digit> {
        self.new
    }
}

impl Command for SetCommand {
    fn execute(&mut self, grid: &mut SujikoGrid) -> Result<(), Error> {
        if self.executed {
            return Err(ALREADY_EXECUTED);
        }
        let prev = grid.get(self.index);
        grid.set(self.index, self.new)?;
        self.prev = prev;
        self.executed = true;
        Ok(())
    }

    fn revert(&mut self, grid: &mut SujikoGrid) -> Result<(), Error> {
        if !self.executed {
            return Err(NOT_YET_EXECUTED);
        }
        grid.set(self.index, self.prev)?;
        self.executed = false;
        Ok(())
    }

    fn is_executed(&self) -> bool {
        self.executed
    }

    fn involved_cells(&self) -> Vec<Index> {
        vec![self.index]
    }
}

/// An ordered sequence of commands executed and reverted as one transaction.
/// Members are executed in insertion order and reverted in reverse order, so
/// later mutations are undone before the earlier ones they may depend on.
/// Every added command must share the compound's execution state at the
/// moment it is added.
#[derive(Debug, Default)]
pub struct CompoundCommand {
    sequence: Vec<Box<dyn Command>>,
    executed: bool,
}

impl CompoundCommand {
    pub fn new() -> Self {
        Self::with_state(false)
    }

    /// A compound whose execution state starts out as `executed`; used by
    /// reasoners, whose forced moves have already run against the grid.
    pub fn with_state(executed: bool) -> Self {
        CompoundCommand { sequence: Vec::new(), executed }
    }

    pub fn add(&mut self, command: Box<dyn Command>) -> Result<(), Error> {
        if self.executed != command.is_executed() {
            return Err(ADD_STATE_MISMATCH);
        }
        self.sequence.push(command);
        Ok(())
    }

    /// A `None` command is tolerated and ignored.
    pub fn add_opt(&mut self, command: Option<Box<dyn Command>>) -> Result<(), Error> {
        match command {
            Some(c) => self.add(c),
            None => Ok(()),
        }
    }

    /// Splices another compound's members onto the end of this one.
    pub fn add_all(&mut self, other: CompoundCommand) -> Result<(), Error> {
        if self.executed != other.executed {
            return Err(ADD_STATE_MISMATCH);
        }
        self.sequence.extend(other.sequence);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

impl Command for CompoundCommand {
    fn execute(&mut self, grid: &mut SujikoGrid) -> Result<(), Error> {
        // An empty compound never flips its own flag; executing it twice in a
        // row is a no-op, not a contract violation.
        if !self.sequence.is_empty() {
            if self.executed {
                return Err(ALREADY_EXECUTED);
            }
            self.executed = true;
        }
        for command in &mut self.sequence {
            command.execute(grid)?;
        }
        Ok(())
    }

    fn revert(&mut self, grid: &mut SujikoGrid) -> Result<(), Error> {
        if !self.sequence.is_empty() {
            if !self.executed {
                return Err(NOT_YET_EXECUTED);
            }
            self.executed = false;
        }
        for command in self.sequence.iter_mut().rev() {
            command.revert(grid)?;
        }
        Ok(())
    }

    fn is_executed(&self) -> bool {
        self.executed
    }

    fn involved_cells(&self) -> Vec<Index> {
        let mut result: Vec<Index> = Vec::new();
        for command in &self.sequence {
            for index in command.involved_cells() {
                if !result.contains(&index) {
                    result.push(index);
                }
            }
        }
        result
    }
}

#[cfg(any(test, feature = "test-util"))]
pub mod test_util {
    use std::cell::RefCell;
    use std::rc::Rc;
    use super::*;

    pub type Trace = Rc<RefCell<Vec<String>>>;

    pub fn new_trace() -> Trace {
        Rc::new(RefCell::new(Vec::new()))
    }

    /// Command that records its execute/revert calls in a shared trace and
    /// touches nothing else. Used to observe ordering.
    #[derive(Debug)]
    pub struct TraceCommand {
        label: &'static str,
        trace: Trace,
        executed: bool,
    }

    impl TraceCommand {
        pub fn new(label: &'static str, trace: &Trace) -> Self {
            TraceCommand { label, trace: Rc::clone(trace), executed: false }
        }
    }

    impl Command for TraceCommand {
        fn execute(&mut self, _: &mut SujikoGrid) -> Result<(), Error> {
            if self.executed {
                return Err(ALREADY_EXECUTED);
            }
            self.trace.borrow_mut().push(format!("+{}", self.label));
            self.executed = true;
            Ok(())
        }

        fn revert(&mut self, _: &mut SujikoGrid) -> Result<(), Error> {
            if !self.executed {
                return Err(NOT_YET_EXECUTED);
            }
            self.trace.borrow_mut().push(format!("-{}", self.label));
            self.executed = false;
            Ok(())
        }

        fn is_executed(&self) -> bool {
            self.executed
        }

        fn involved_cells(&self) -> Vec<Index> {
            vec![]
        }
    }
}
