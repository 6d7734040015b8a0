//! Utilities - logging setup, terminal styling and progress indicators

pub mod logging;
pub mod progress;
pub mod styling;

pub use logging::*;
pub use progress::*;
pub use styling::*;
