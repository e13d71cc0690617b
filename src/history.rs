mod error;
mod stack;

#[cfg(test)]
mod tests;

pub use error::{Direction, HistoryBoundsError, Result};
pub use stack::HistoryStack;
