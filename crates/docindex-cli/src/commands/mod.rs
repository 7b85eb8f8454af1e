//! Command implementations for the docindex CLI.

mod build;
mod check;
mod fmt;
mod search;
mod stats;

pub use build::execute as build;
pub use check::execute as check;
pub use fmt::execute as fmt;
pub use search::{SearchArgs, execute as search};
pub use stats::execute as stats;

/// How a command finished, when it did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Clean,
    /// The command ran but found problems (validation errors, stale output).
    Problems,
}
