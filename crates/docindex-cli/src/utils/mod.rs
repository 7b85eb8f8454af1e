//! Shared CLI helpers.

mod logging;

pub use logging::initialize_logging;
