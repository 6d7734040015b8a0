//! Configuration module - operation schema and pipeline document

pub mod operation;
pub mod pipeline;

pub use operation::*;
pub use pipeline::*;
