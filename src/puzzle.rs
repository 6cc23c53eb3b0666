use std::fmt;
use strum_macros::{Display, EnumString};
use crate::core::Error;
use crate::model::SujikoGrid;

pub const NOT_IN_EDIT_MODE: Error =
    Error::new_const("Puzzle is not in edit mode");

/// What a puzzle currently allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    /// Can only be viewed.
    View,
    /// Can be edited (cells and metadata).
    Edit,
    /// Can be solved, but not edited.
    Solve,
}

/// A named Sujiko puzzle: a grid plus presentation-level metadata. Loading
/// leaves it in view mode.
#[derive(Debug, Clone)]
pub struct Puzzle {
    grid: SujikoGrid,
    name: String,
    mode: Mode,
}

impl Puzzle {
    pub fn new(grid: SujikoGrid, name: impl Into<String>) -> Self {
        Puzzle { grid, name: name.into(), mode: Mode::View }
    }

    pub fn parse(s: &str, name: impl Into<String>) -> Result<Self, Error> {
        Ok(Self::new(SujikoGrid::parse(s)?, name))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the puzzle. Only allowed in edit mode.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), Error> {
        if self.mode != Mode::Edit {
            return Err(NOT_IN_EDIT_MODE);
        }
        self.name = name.into();
        Ok(())
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn grid(&self) -> &SujikoGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut SujikoGrid {
        &mut self.grid
    }

    /// Resets every non-blocked cell, e.g. to restart a solving session.
    pub fn clear(&mut self) {
        self.grid.clear_unblocked();
    }
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.grid)
    }
}
