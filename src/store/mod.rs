//! The storage seam. The query compiler only ever talks to [`PredicateBuilder`]; collections
//! talk to [`Store`]. [`MemoryStore`] is the in-process implementation of both.

mod memory;
mod predicate;

pub use memory::MemoryStore;
pub use predicate::Predicate;

use crate::errors::DbError;
use bson::{Bson, Document};
use std::fmt;

/// Internal row id assigned by a store on insert.
pub type EntryId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CmpOp {
    /// Map a filter operator key (`$gt`, `$lte`, ...) to its comparison.
    #[must_use]
    pub fn from_operator(key: &str) -> Option<Self> {
        match key {
            "$eq" => Some(Self::Eq),
            "$ne" => Some(Self::Ne),
            "$gt" => Some(Self::Gt),
            "$gte" => Some(Self::Gte),
            "$lt" => Some(Self::Lt),
            "$lte" => Some(Self::Lte),
            _ => None,
        }
    }

    /// The comparison that holds exactly when `self` does not.
    #[must_use]
    pub const fn invert(self) -> Self {
        match self {
            Self::Eq => Self::Ne,
            Self::Ne => Self::Eq,
            Self::Gt => Self::Lte,
            Self::Gte => Self::Lt,
            Self::Lt => Self::Gte,
            Self::Lte => Self::Gt,
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Predicate construction capability exposed by a store. Paths are dotted field paths.
pub trait PredicateBuilder {
    type Predicate: Clone + fmt::Debug;

    fn equals(&self, path: &str, value: &Bson) -> Self::Predicate;

    fn compare(&self, path: &str, op: CmpOp, value: &Bson) -> Self::Predicate;

    /// Field is a list holding at least one of `values`.
    fn any_of(&self, path: &str, values: &[Bson]) -> Self::Predicate;

    /// Field is a list holding every one of `values`.
    fn all_of(&self, path: &str, values: &[Bson]) -> Self::Predicate;

    /// # Errors
    /// Returns `Regex` when the pattern does not compile.
    fn matches(&self, path: &str, pattern: &str) -> Result<Self::Predicate, DbError>;

    fn and(&self, lhs: Self::Predicate, rhs: Self::Predicate) -> Self::Predicate;

    fn or(&self, lhs: Self::Predicate, rhs: Self::Predicate) -> Self::Predicate;
}

/// Document persistence primitives. Every call is atomic from the caller's point of view.
pub trait Store: PredicateBuilder {
    fn search(&self, predicate: &Self::Predicate) -> Vec<Document>;

    fn get(&self, predicate: &Self::Predicate) -> Option<Document>;

    fn all(&self) -> Vec<Document>;

    fn insert(&self, doc: Document) -> EntryId;

    fn insert_multiple(&self, docs: Vec<Document>) -> Vec<EntryId>;

    /// Merge `fields` into every matching document.
    ///
    /// # Errors
    /// Implementations report storage failures here.
    fn update(
        &self,
        fields: &Document,
        predicate: &Self::Predicate,
    ) -> Result<Vec<EntryId>, DbError>;

    fn remove(&self, predicate: &Self::Predicate) -> Vec<EntryId>;

    /// Remove every document.
    fn drop_all(&self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
