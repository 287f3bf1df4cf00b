//! Flat-file tables: loading, equality filtering and text rendering.

pub mod error;
pub mod filter;
pub mod loader;
pub mod render;
pub mod types;

pub use error::TableError;
pub use filter::{filter_eq_ignore_case, EqualityFilter};
pub use loader::{parse_csv, TableLoader};
pub use render::{render_table, truncate_tokens, DEFAULT_MAX_TOKENS};
pub use types::{CellValue, FilterCondition, Table};
