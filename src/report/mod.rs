//! Report module - summarizing and exporting run results

pub mod result_export;
pub mod summary;

pub use result_export::*;
pub use summary::*;
