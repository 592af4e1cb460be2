//! Mongo-style filter documents and cursors over a store that only understands predicate
//! trees.
//!
//! A filter is parsed into a [`query::FilterNode`] tree, compiled against a store's
//! [`store::PredicateBuilder`], evaluated by the store, and the results are ordered and
//! paginated by a [`query::Cursor`].

pub mod cli;
pub mod collection;
pub mod config;
pub mod database;
pub mod errors;
pub mod logger;
pub mod query;
pub mod results;
pub mod store;
pub mod utils;

pub use collection::{Collection, InsertOptions};
pub use database::Database;
pub use errors::DbError;
