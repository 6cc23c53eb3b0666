use std::fmt::Debug;
use crate::command::{Command, CompoundCommand};
use crate::core::{Attribution, Error};
use crate::model::SujikoGrid;

/// Outcome of one reasoning pass over the grid.
///
/// `Forced` carries the placements the reasoner could deduce, as a compound
/// command that has *already been executed* against the grid; an empty
/// compound means nothing was deduced and the grid is unchanged. On
/// `Contradiction` the grid is likewise unchanged and no completion exists
/// from the current state; the attribution names the deduction that noticed.
#[derive(Debug)]
pub enum ReasonerResult {
    Forced(CompoundCommand),
    Contradiction(Attribution),
}

impl ReasonerResult {
    /// An executed-but-empty compound: the "nothing to contribute" outcome.
    pub fn no_op() -> Self {
        ReasonerResult::Forced(CompoundCommand::with_state(true))
    }

    pub fn is_no_op(&self) -> bool {
        match self {
            ReasonerResult::Forced(cc) => cc.is_empty(),
            ReasonerResult::Contradiction(_) => false,
        }
    }
}

/// A reasoning strategy fills in cells that are forced by the current grid
/// state, or detects that no completion exists. Callers (the search engine
/// in particular) revert a returned compound exactly like a speculated
/// placement when the node it belongs to fails.
pub trait Reasoner: Debug {
    fn apply(&self, grid: &mut SujikoGrid) -> Result<ReasonerResult, Error>;
}

/// Reasoner that never deduces anything. The default extension point.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpReasoner;

impl Reasoner for NoOpReasoner {
    fn apply(&self, _: &mut SujikoGrid) -> Result<ReasonerResult, Error> {
        Ok(ReasonerResult::no_op())
    }
}

/// An ordered list of reasoners applied once each, in sequence, with their
/// forced moves merged into one transaction. Composition is plain iteration
/// rather than nested decoration. If any member reports a contradiction, the
/// moves already forced by earlier members are reverted first, so the
/// grid-unchanged contract holds for the chain as a whole.
#[derive(Debug)]
pub struct ReasonerChain {
    reasoners: Vec<Box<dyn Reasoner>>,
}

impl ReasonerChain {
    pub fn new(reasoners: Vec<Box<dyn Reasoner>>) -> Self {
        ReasonerChain { reasoners }
    }
}

impl Reasoner for ReasonerChain {
    fn apply(&self, grid: &mut SujikoGrid) -> Result<ReasonerResult, Error> {
        let mut applied = CompoundCommand::with_state(true);
        for reasoner in &self.reasoners {
            match reasoner.apply(grid)? {
                ReasonerResult::Forced(cc) => applied.add_all(cc)?,
                ReasonerResult::Contradiction(a) => {
                    applied.revert(grid)?;
                    return Ok(ReasonerResult::Contradiction(a));
                }
            }
        }
        Ok(ReasonerResult::Forced(applied))
    }
}

/// Applies one reasoner repeatedly until it stops producing moves, merging
/// everything it forced along the way. Termination relies on the inner
/// reasoner only ever filling cells; with nine cells in the grid that bounds
/// the iterations.
#[derive(Debug)]
pub struct FixpointReasoner {
    inner: Box<dyn Reasoner>,
}

impl FixpointReasoner {
    pub fn new(inner: Box<dyn Reasoner>) -> Self {
        FixpointReasoner { inner }
    }
}

impl Reasoner for FixpointReasoner {
    fn apply(&self, grid: &mut SujikoGrid) -> Result<ReasonerResult, Error> {
        let mut applied = CompoundCommand::with_state(true);
        loop {
            match self.inner.apply(grid)? {
                ReasonerResult::Forced(cc) => {
                    if cc.is_empty() {
                        return Ok(ReasonerResult::Forced(applied));
                    }
                    applied.add_all(cc)?;
                }
                ReasonerResult::Contradiction(a) => {
                    applied.revert(grid)?;
                    return Ok(ReasonerResult::Contradiction(a));
                }
            }
        }
    }
}

#[cfg(any(test, feature = "test-util"))]
pub mod test_util {
    use super::*;
    use crate::command::SetCommand;
    use crate::core::{Digit, Index};

    /// Forces one fixed placement whenever its cell is still empty.
    #[derive(Debug)]
    pub struct ForcedMoveReasoner {
        pub index: Index,
        pub digit: Digit,
    }

    impl Reasoner for ForcedMoveReasoner {
        fn apply(&self, grid: &mut SujikoGrid) -> Result<ReasonerResult, Error> {
            if grid.get(self.index).is_some() {
                return Ok(ReasonerResult::no_op());
            }
            let mut command = SetCommand::new(self.index, Some(self.digit));
            command.execute(grid)?;
            let mut forced = CompoundCommand::with_state(true);
            forced.add(Box::new(command))?;
            Ok(ReasonerResult::Forced(forced))
        }
    }

    /// Always reports a contradiction.
    #[derive(Debug)]
    pub struct ContradictionReasoner;

    impl Reasoner for ContradictionReasoner {
        fn apply(&self, _: &mut SujikoGrid) -> Result<ReasonerResult, Error> {
            Ok(ReasonerResult::Contradiction(Attribution::new("TEST_CONTRADICTION")))
        }
    }
}
