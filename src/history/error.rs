use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HistoryBoundsError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Undo,
    Redo,
}

impl fmt::Display for Direction {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undo => formatter.write_str("undo"),
            Self::Redo => formatter.write_str("redo"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {direction}: at position {index} of {len}")]
pub struct HistoryBoundsError {
    pub direction: Direction,
    pub index: usize,
    pub len: usize,
}
