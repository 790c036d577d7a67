pub mod file;
pub mod storage;
pub mod webhook;

pub use file::*;
pub use storage::*;
pub use webhook::*;
