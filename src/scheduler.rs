mod debounce;

#[cfg(test)]
mod tests;

pub use debounce::{Debouncer, Ticket};
