use bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::sort::SortSpecifier;
use crate::errors::DbError;
use crate::store::CmpOp;

// Depth guard for dotted sort paths
pub(crate) const MAX_PATH_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    /// `1` is ascending and `-1` descending; every other value is rejected.
    #[must_use]
    pub const fn from_direction(d: i64) -> Option<Self> {
        match d {
            1 => Some(Self::Asc),
            -1 => Some(Self::Desc),
            _ => None,
        }
    }

    #[must_use]
    pub const fn direction(self) -> i32 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub order: Order,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, order: Order) -> Self {
        Self { field: field.into(), order }
    }
}

/// Options for `Collection::find` and `Cursor::with_options`.
///
/// Sorting happens before pagination. See [`super::cursor::page_window`] for how
/// `skip` and `limit` interact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindOptions {
    pub sort: Option<SortSpecifier>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

/// Parsed form of a filter document.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    /// `(path == value) OR (path contains value)`
    FieldEquals { path: String, value: Bson },
    Comparison { path: String, op: CmpOp, value: Bson },
    /// Raw pattern as written in the filter; unescaped at compile time.
    Regex { path: String, pattern: String },
    Negation(Box<FilterNode>),
    And(Vec<FilterNode>),
    Or(Vec<FilterNode>),
    In { path: String, values: Vec<Bson>, alternatives: Vec<FilterNode> },
    All { path: String, values: Vec<Bson> },
    MatchAll,
}

impl FilterNode {
    /// Wrap several clauses into one; a single clause is returned as is.
    #[must_use]
    pub fn conjoin(mut nodes: Vec<Self>) -> Self {
        if nodes.len() == 1 { nodes.remove(0) } else { Self::And(nodes) }
    }

    /// Push every `Negation` down to the comparisons beneath it.
    ///
    /// Comparisons under an odd number of negations get their operator inverted, so
    /// `{"$not": {"$gte": 5}}` becomes a plain `< 5`. Negated groups keep their conjunction.
    ///
    /// # Errors
    /// Returns `QueryError` when a negation covers anything but comparisons and groups of them.
    pub fn fold_negations(self) -> Result<Self, DbError> {
        self.fold(false)
    }

    fn fold(self, negated: bool) -> Result<Self, DbError> {
        match self {
            Self::Negation(inner) => inner.fold(!negated),
            Self::Comparison { path, op, value } => {
                let op = if negated { op.invert() } else { op };
                Ok(Self::Comparison { path, op, value })
            }
            Self::And(children) => Ok(Self::And(
                children.into_iter().map(|c| c.fold(negated)).collect::<Result<_, _>>()?,
            )),
            other if negated => {
                Err(DbError::QueryError(format!("$not cannot be applied to {}", other.kind())))
            }
            Self::Or(children) => Ok(Self::Or(
                children.into_iter().map(|c| c.fold(false)).collect::<Result<_, _>>()?,
            )),
            Self::In { path, values, alternatives } => Ok(Self::In {
                path,
                values,
                alternatives: alternatives
                    .into_iter()
                    .map(|c| c.fold(false))
                    .collect::<Result<_, _>>()?,
            }),
            leaf => Ok(leaf),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::FieldEquals { .. } => "field equality",
            Self::Comparison { .. } => "comparison",
            Self::Regex { .. } => "$regex",
            Self::Negation(_) => "$not",
            Self::And(_) => "$and",
            Self::Or(_) => "$or",
            Self::In { .. } => "$in",
            Self::All { .. } => "$all",
            Self::MatchAll => "match-all",
        }
    }
}

impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn group(f: &mut fmt::Formatter<'_>, name: &str, nodes: &[FilterNode]) -> fmt::Result {
            write!(f, "{name}(")?;
            for (i, n) in nodes.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{n}")?;
            }
            f.write_str(")")
        }
        match self {
            Self::FieldEquals { path, value } => write!(f, "{path} = {value}"),
            Self::Comparison { path, op, value } => write!(f, "{path} {op} {value}"),
            Self::Regex { path, pattern } => write!(f, "{path} ~ /{pattern}/"),
            Self::Negation(inner) => write!(f, "NOT({inner})"),
            Self::And(nodes) => group(f, "AND", nodes),
            Self::Or(nodes) => group(f, "OR", nodes),
            Self::In { path, values, .. } => {
                write!(f, "{path} IN {}", Bson::Array(values.clone()))
            }
            Self::All { path, values } => write!(f, "{path} ALL {}", Bson::Array(values.clone())),
            Self::MatchAll => f.write_str("TRUE"),
        }
    }
}

/// Recursion state while walking a filter document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    /// Field that operator keys at this level apply to.
    pub path: String,
    pub negated: bool,
    /// Field the innermost `$not` was attached to.
    pub negation_base: Option<String>,
}

impl Context {
    /// The root context takes the last key of the document as its implicit field.
    #[must_use]
    pub fn root(filter: &Document) -> Self {
        let path = filter.keys().last().cloned().unwrap_or_default();
        Self { path, negated: false, negation_base: None }
    }

    #[must_use]
    pub fn at(&self, path: &str) -> Self {
        Self { path: path.to_string(), ..self.clone() }
    }

    #[must_use]
    pub fn negate(&self) -> Self {
        Self {
            path: self.path.clone(),
            negated: !self.negated,
            negation_base: Some(self.path.clone()),
        }
    }
}
