use std::fmt::{self, Display};
use crate::core::{Digit, DigitSet, Error, Index};

/// Rows and columns of the grid.
pub const GRID_SIZE: usize = 3;
/// Cells per sum group.
pub const GROUP_SIZE: usize = 4;
/// Number of sum groups.
pub const GROUP_COUNT: usize = 4;

pub const BLOCKED_CELL: Error =
    Error::new_const("Cell is blocked by the puzzle definition");

/// One grid cell. Blocked cells were pre-filled by the puzzle definition and
/// are never mutated by search or edits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DigitCell {
    digit: Option<Digit>,
    blocked: bool,
}

impl DigitCell {
    pub fn digit(&self) -> Option<Digit> {
        self.digit
    }

    pub fn is_empty(&self) -> bool {
        self.digit.is_none()
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }
}

/// A fixed target sum over four cells. The four standard Sujiko groups are
/// the overlapping 2x2 windows of the grid; a cell may belong to several.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SumGroup {
    target: u8,
    members: [Index; GROUP_SIZE],
}

impl SumGroup {
    pub fn target(&self) -> u8 {
        self.target
    }

    pub fn members(&self) -> &[Index; GROUP_SIZE] {
        &self.members
    }

    pub fn contains(&self, index: Index) -> bool {
        self.members.contains(&index)
    }
}

/// The sums of the `k` smallest and `k` largest digits not in `used`. If
/// fewer than `k` digits remain, the sums cover what is available.
fn unused_sum_bounds(used: &DigitSet, k: usize) -> (u8, u8) {
    let unused: Vec<u8> = used.missing().iter().map(Digit::val).collect();
    let min_sum = unused.iter().take(k).sum();
    let max_sum = unused.iter().rev().take(k).sum();
    (min_sum, max_sum)
}

/// The puzzle state: nine cells and four sum groups, explicitly owned and
/// explicitly passed to whatever operates on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SujikoGrid {
    cells: [DigitCell; GRID_SIZE * GRID_SIZE],
    groups: [SumGroup; GROUP_COUNT],
}

/// The four 2x2 windows, anchored at (0,0), (0,1), (1,0), (1,1).
fn standard_windows() -> [[Index; GROUP_SIZE]; GROUP_COUNT] {
    [
        [[0, 0], [0, 1], [1, 0], [1, 1]],
        [[0, 1], [0, 2], [1, 1], [1, 2]],
        [[1, 0], [1, 1], [2, 0], [2, 1]],
        [[1, 1], [1, 2], [2, 1], [2, 2]],
    ]
}

impl SujikoGrid {
    /// An empty grid with the standard windows and the given target sums.
    pub fn new(targets: [u8; GROUP_COUNT]) -> Self {
        let windows = standard_windows();
        SujikoGrid {
            cells: [DigitCell::default(); GRID_SIZE * GRID_SIZE],
            groups: std::array::from_fn(|i| SumGroup {
                target: targets[i],
                members: windows[i],
            }),
        }
    }

    /// Parses the puzzle text format: three lines of three digits (0 for an
    /// empty cell), then one line with the four target sums. Pre-filled cells
    /// come back blocked.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let lines: Vec<&str> = s.lines()
            .filter(|line| !line.trim().is_empty())
            .collect();
        if lines.len() != GRID_SIZE + 1 {
            return Err(Error::new(format!(
                "Expected {} grid rows and a sums row; got {} lines",
                GRID_SIZE, lines.len(),
            )));
        }
        let sums: Vec<&str> = lines[GRID_SIZE].split_whitespace().collect();
        if sums.len() != GROUP_COUNT {
            return Err(Error::new(format!(
                "Expected {} target sums; got {}", GROUP_COUNT, sums.len(),
            )));
        }
        let mut targets = [0u8; GROUP_COUNT];
        for (i, tok) in sums.iter().enumerate() {
            targets[i] = tok.parse::<u8>()
                .map_err(|_| Error::new(format!("Invalid target sum: {:?}", tok)))?;
        }
        let mut grid = Self::new(targets);
        for (r, line) in lines[..GRID_SIZE].iter().enumerate() {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() != GRID_SIZE {
                return Err(Error::new(format!(
                    "Expected {} digits in row {}; got {}",
                    GRID_SIZE, r, tokens.len(),
                )));
            }
            for (c, tok) in tokens.iter().enumerate() {
                let digit = match *tok {
                    "0" => None,
                    _ => Some(Digit::parse(tok)?),
                };
                grid.cells[r * GRID_SIZE + c] = DigitCell {
                    digit,
                    blocked: digit.is_some(),
                };
            }
        }
        Ok(grid)
    }

    pub fn cell(&self, index: Index) -> &DigitCell {
        &self.cells[index[0] * GRID_SIZE + index[1]]
    }

    pub fn get(&self, index: Index) -> Option<Digit> {
        self.cell(index).digit
    }

    /// Writes a cell. Blocked cells reject the write before any mutation.
    pub fn set(&mut self, index: Index, digit: Option<Digit>) -> Result<(), Error> {
        let cell = &mut self.cells[index[0] * GRID_SIZE + index[1]];
        if cell.blocked {
            return Err(BLOCKED_CELL);
        }
        cell.digit = digit;
        Ok(())
    }

    pub fn groups(&self) -> &[SumGroup; GROUP_COUNT] {
        &self.groups
    }

    pub fn groups_containing(&self, index: Index) -> impl Iterator<Item = &SumGroup> {
        self.groups.iter().filter(move |g| g.contains(index))
    }

    /// First empty cell in row-major order, or `None` if the grid is full.
    /// The fixed scan order keeps search traces reproducible.
    pub fn next_empty_cell(&self) -> Option<Index> {
        for r in 0..GRID_SIZE {
            for c in 0..GRID_SIZE {
                if self.get([r, c]).is_none() {
                    return Some([r, c]);
                }
            }
        }
        None
    }

    /// Whether no other cell holds the same digit as the cell at `index`.
    /// Vacuously true for an empty cell.
    pub fn is_unique_in_grid(&self, index: Index) -> bool {
        let digit = match self.get(index) {
            Some(d) => d,
            None => return true,
        };
        for r in 0..GRID_SIZE {
            for c in 0..GRID_SIZE {
                if [r, c] != index && self.get([r, c]) == Some(digit) {
                    return false;
                }
            }
        }
        true
    }

    /// The digits currently placed anywhere in the grid.
    pub fn used_digits(&self) -> DigitSet {
        let mut used = DigitSet::empty();
        for cell in &self.cells {
            if let Some(d) = cell.digit {
                used.insert(d);
            }
        }
        used
    }

    /// Sum of the group's filled members (empty cells contribute 0).
    pub fn group_sum(&self, group: &SumGroup) -> u8 {
        group.members.iter()
            .filter_map(|&m| self.get(m))
            .map(Digit::val)
            .sum()
    }

    /// Whether the group's target is still reachable: with `k` empty members
    /// and the grid-wide used digits, the target must lie between the current
    /// sum plus the `k` smallest unused digits and the current sum plus the
    /// `k` largest. Necessary but not sufficient; prune-only.
    pub fn sum_reachable(&self, group: &SumGroup) -> bool {
        let current = self.group_sum(group);
        let empty = group.members.iter()
            .filter(|&&m| self.get(m).is_none())
            .count();
        let (min_sum, max_sum) = unused_sum_bounds(&self.used_digits(), empty);
        current + min_sum <= group.target && group.target <= current + max_sum
    }

    /// Whether every group containing `index` can still reach its target.
    pub fn group_feasible(&self, index: Index) -> bool {
        self.groups_containing(index).all(|g| self.sum_reachable(g))
    }

    /// Whether every group's member sum equals its target exactly. Note this
    /// checks sums only, not fullness: a partially filled grid whose filled
    /// cells happen to hit every target would also pass. The solver only
    /// consults it once `next_empty_cell()` returns `None`.
    pub fn is_solved(&self) -> bool {
        self.groups.iter().all(|g| self.group_sum(g) == g.target)
    }

    /// Resets every non-blocked cell to empty.
    pub fn clear_unblocked(&mut self) {
        for cell in &mut self.cells {
            if !cell.blocked {
                cell.digit = None;
            }
        }
    }
}

impl Display for SujikoGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..GRID_SIZE {
            for c in 0..GRID_SIZE {
                if c > 0 {
                    write!(f, " ")?;
                }
                match self.get([r, c]) {
                    Some(d) => write!(f, "{}", d)?,
                    None => write!(f, "0")?,
                }
            }
            writeln!(f)?;
        }
        for (i, g) in self.groups.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", g.target)?;
        }
        writeln!(f)
    }
}

#[cfg(any(test, feature = "test-util"))]
pub mod test_util {
    use super::*;

    pub const SAMPLE_PUZZLE: &str = "0 4 0\n0 0 2\n3 0 0\n18 18 19 26\n";

    /// The sample puzzle from the solver tests; six empty cells, one
    /// solution.
    pub fn sample_grid() -> SujikoGrid {
        SujikoGrid::parse(SAMPLE_PUZZLE).unwrap()
    }
}
