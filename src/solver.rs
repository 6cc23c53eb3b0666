use std::fmt::Debug;
use serde_derive::Serialize;
use crate::command::{Command, SetCommand};
use crate::core::{Digit, Error, Index};
use crate::model::SujikoGrid;
use crate::reasoning::{Reasoner, ReasonerResult};

/// Validity and completion checks the generic backtracking engine is
/// parameterized over. `is_valid_move` judges the most recent placement at
/// `index`; `is_solved` judges a grid with no empty cell left.
pub trait MoveChecker: Debug {
    fn is_valid_move(&self, grid: &SujikoGrid, index: Index) -> bool;
    fn is_solved(&self, grid: &SujikoGrid) -> bool;
}

/// The standard Sujiko rules: the placed digit must be unique in the grid
/// and every sum group touching it must still be able to reach its target.
#[derive(Debug, Default, Clone, Copy)]
pub struct SujikoChecker;

impl MoveChecker for SujikoChecker {
    fn is_valid_move(&self, grid: &SujikoGrid, index: Index) -> bool {
        grid.is_unique_in_grid(index) && grid.group_feasible(index)
    }

    fn is_solved(&self, grid: &SujikoGrid) -> bool {
        grid.is_solved()
    }
}

/// Called after every placement attempt; handy for debugging a failing
/// search without inverting control over the whole solve loop.
pub trait StepObserver {
    fn after_step(&mut self, grid: &SujikoGrid, depth: usize);
}

/// Observer that does nothing.
pub struct NullObserver;

impl StepObserver for NullObserver {
    fn after_step(&mut self, _: &SujikoGrid, _: usize) {}
}

/// Counters for one `solve` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SolveStats {
    /// Speculative placements executed.
    pub steps: usize,
    /// Speculative placements reverted.
    pub backtracks: usize,
    /// Placements applied by the reasoner rather than speculation.
    pub forced: usize,
    pub solved: bool,
}

/// Recursive depth-first solver. Every speculative placement goes through a
/// `SetCommand`; the commands recording the path to the current node live on
/// an internal stack (independent of any interactive `UndoRedo` history) and
/// are popped and reverted when a node is abandoned. On failure the grid is
/// exactly what it was before the call; on success it holds the first
/// solution in 1-through-9, row-major order, and the stack holds one command
/// per cell the search filled.
///
/// An optional reasoner runs before each node is expanded; whatever it
/// forces is pushed and reverted like any speculated move.
pub struct BacktrackSolver<C: MoveChecker> {
    checker: C,
    reasoner: Option<Box<dyn Reasoner>>,
    commands: Vec<Box<dyn Command>>,
    stats: SolveStats,
}

impl<C: MoveChecker> Debug for BacktrackSolver<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f, "BacktrackSolver {{ checker: {:?}, depth: {}, stats: {:?} }}",
            self.checker, self.commands.len(), self.stats,
        )
    }
}

impl<C: MoveChecker> BacktrackSolver<C> {
    pub fn new(checker: C) -> Self {
        BacktrackSolver {
            checker,
            reasoner: None,
            commands: Vec::new(),
            stats: SolveStats::default(),
        }
    }

    pub fn with_reasoner(checker: C, reasoner: Box<dyn Reasoner>) -> Self {
        BacktrackSolver { reasoner: Some(reasoner), ..Self::new(checker) }
    }

    /// The commands whose execution led to the current grid state, deepest
    /// last. After a successful solve, one entry per filled cell (plus one
    /// compound per reasoner intervention, when a reasoner is attached).
    pub fn commands(&self) -> &[Box<dyn Command>] {
        &self.commands
    }

    pub fn stats(&self) -> SolveStats {
        self.stats
    }

    /// Finds the first solution reachable from the grid's current state.
    /// `Ok(false)` means exhaustion, not an error: no solution exists and the
    /// grid is unchanged.
    pub fn solve(&mut self, grid: &mut SujikoGrid) -> Result<bool, Error> {
        self.solve_with(grid, &mut NullObserver)
    }

    pub fn solve_with(
        &mut self,
        grid: &mut SujikoGrid,
        observer: &mut dyn StepObserver,
    ) -> Result<bool, Error> {
        self.commands.clear();
        self.stats = SolveStats::default();
        let solved = self.solve_node(grid, observer)?;
        self.stats.solved = solved;
        Ok(solved)
    }

    fn solve_node(
        &mut self,
        grid: &mut SujikoGrid,
        observer: &mut dyn StepObserver,
    ) -> Result<bool, Error> {
        let deduced = match &self.reasoner {
            Some(reasoner) => Some(reasoner.apply(grid)?),
            None => None,
        };
        let mut forced = None;
        match deduced {
            Some(ReasonerResult::Contradiction(_)) => return Ok(false),
            Some(ReasonerResult::Forced(cc)) if !cc.is_empty() => {
                self.stats.forced += cc.len();
                forced = Some(cc);
            }
            _ => {}
        }
        if let Some(cc) = forced {
            self.commands.push(Box::new(cc));
            if self.expand(grid, observer)? {
                return Ok(true);
            }
            let mut cc = self.commands.pop().unwrap();
            cc.revert(grid)?;
            return Ok(false);
        }
        self.expand(grid, observer)
    }

    fn expand(
        &mut self,
        grid: &mut SujikoGrid,
        observer: &mut dyn StepObserver,
    ) -> Result<bool, Error> {
        let index = match grid.next_empty_cell() {
            None => return Ok(self.checker.is_solved(grid)),
            Some(index) => index,
        };
        for digit in Digit::possibilities() {
            let mut command = SetCommand::new(index, Some(digit));
            command.execute(grid)?;
            self.stats.steps += 1;
            observer.after_step(grid, self.commands.len());
            if self.checker.is_valid_move(grid, index) {
                self.commands.push(Box::new(command));
                if self.solve_node(grid, observer)? {
                    return Ok(true);
                }
                let mut command = self.commands.pop().unwrap();
                self.stats.backtracks += 1;
                command.revert(grid)?;
            } else {
                self.stats.backtracks += 1;
                command.revert(grid)?;
            }
        }
        Ok(false)
    }
}
