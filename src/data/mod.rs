//! Source loading and the merged table.

pub mod loader;
pub mod table;

pub use loader::{load_and_merge, LoadOptions};
pub use table::{KeyColumns, Table};
