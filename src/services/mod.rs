pub mod file_manager;
pub mod ledger;
pub mod listing;

pub use file_manager::*;
pub use ledger::*;
