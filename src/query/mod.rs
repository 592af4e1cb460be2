// Filter compilation and result ordering
mod compile;
mod cursor;
mod order;
mod parse;
mod sort;
mod types;

// Public API re-exports
pub use compile::{QueryCompiler, compile, unescape_pattern};
pub use cursor::{Cursor, page_window};
pub use order::{SortValue, resolve_sort_field};
pub use parse::{parse_filter, parse_filter_json};
pub use sort::SortSpecifier;
pub use types::{Context, FilterNode, FindOptions, Order, SortSpec};
