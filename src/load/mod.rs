//! Reading input files and loading their rows into a sink.

pub mod loader;
pub mod reader;

pub use loader::BatchLoader;
pub use reader::{BadRow, RowRead, RowReader};
