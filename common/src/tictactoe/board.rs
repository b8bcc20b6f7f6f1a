use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const BOARD_SIZE: usize = 9;

// Rows, then columns, then diagonals. The order is fixed so that winner
// detection is deterministic.
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn other(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::X => write!(f, "X"),
            Mark::O => write!(f, "O"),
        }
    }
}

// An empty cell is None
pub type Cell = Option<Mark>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CellIndexError {
    #[error("Cell index {0} exceeds the board size of {}", BOARD_SIZE)]
    OutOfBounds(usize),
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "usize", into = "usize")]
pub struct CellIndex(usize);

impl CellIndex {
    pub fn new(idx: usize) -> Result<Self, CellIndexError> {
        if idx >= BOARD_SIZE {
            return Err(CellIndexError::OutOfBounds(idx));
        }
        Ok(CellIndex(idx))
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl TryFrom<usize> for CellIndex {
    type Error = CellIndexError;

    fn try_from(idx: usize) -> Result<Self, Self::Error> {
        CellIndex::new(idx)
    }
}

impl From<CellIndex> for usize {
    fn from(idx: CellIndex) -> usize {
        idx.0
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Board([Cell; BOARD_SIZE]);

impl Board {
    pub fn new(cells: [Cell; BOARD_SIZE]) -> Self {
        Board(cells)
    }

    pub fn get(&self) -> &[Cell; BOARD_SIZE] {
        &self.0
    }

    pub fn cell(&self, idx: CellIndex) -> Cell {
        self.0[idx.get()]
    }

    pub fn is_empty_at(&self, idx: CellIndex) -> bool {
        self.cell(idx).is_none()
    }

    pub(crate) fn place(&mut self, idx: CellIndex, mark: Mark) {
        self.0[idx.get()] = Some(mark);
    }

    pub fn empty_cells(&self) -> impl Iterator<Item = CellIndex> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(idx, _)| CellIndex(idx))
    }

    pub fn detect_winner(&self) -> Option<Mark> {
        WINNING_LINES.iter().find_map(|&[a, b, c]| match self.0[a] {
            Some(mark) if self.0[b] == Some(mark) && self.0[c] == Some(mark) => Some(mark),
            _ => None,
        })
    }

    // Only meaningful once detect_winner has returned None
    pub fn is_draw(&self) -> bool {
        self.0.iter().all(|cell| cell.is_some())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self
            .0
            .chunks(3)
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        Some(mark) => mark.to_string(),
                        None => ".".to_string(),
                    })
                    .collect::<String>()
            })
            .collect::<Vec<String>>();
        write!(f, "{}", rows.join("\n"))
    }
}
