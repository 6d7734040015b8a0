//! Pipeline module - dataset handling, operations and evaluation

pub mod checkpoint;
pub mod dataset;
pub mod evaluate;
pub mod loader;
pub mod operations;
pub mod runner;
pub mod split;
pub mod target;

pub use checkpoint::*;
pub use dataset::*;
pub use evaluate::*;
pub use loader::*;
pub use operations::*;
pub use runner::*;
pub use split::*;
pub use target::*;
