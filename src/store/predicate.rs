use super::CmpOp;
use crate::utils::value::{compare_scalars, get_path, values_equal};
use bson::{Bson, Document};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;

/// Predicate tree evaluated by [`super::MemoryStore`].
///
/// A path that does not resolve never matches, including under `Ne`.
#[derive(Debug, Clone)]
pub enum Predicate {
    Eq { path: String, value: Bson },
    Cmp { path: String, op: CmpOp, value: Bson },
    Any { path: String, values: Vec<Bson> },
    All { path: String, values: Vec<Bson> },
    Matches { path: String, regex: Regex },
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
}

impl Predicate {
    #[must_use]
    pub fn matches(&self, doc: &Document, max_depth: usize) -> bool {
        match self {
            Self::Eq { path, value } => {
                get_path(doc, path, max_depth).is_some_and(|v| values_equal(v, value))
            }
            Self::Cmp { path, op, value } => {
                get_path(doc, path, max_depth).is_some_and(|v| eval_cmp(v, *op, value))
            }
            Self::Any { path, values } => match get_path(doc, path, max_depth) {
                Some(Bson::Array(items)) => {
                    items.iter().any(|e| values.iter().any(|v| values_equal(e, v)))
                }
                _ => false,
            },
            Self::All { path, values } => match get_path(doc, path, max_depth) {
                Some(Bson::Array(items)) => {
                    values.iter().all(|v| items.iter().any(|e| values_equal(e, v)))
                }
                _ => false,
            },
            Self::Matches { path, regex } => match get_path(doc, path, max_depth) {
                Some(Bson::String(s)) => regex.is_match(s),
                _ => false,
            },
            Self::And(l, r) => l.matches(doc, max_depth) && r.matches(doc, max_depth),
            Self::Or(l, r) => l.matches(doc, max_depth) || r.matches(doc, max_depth),
        }
    }
}

fn eval_cmp(field: &Bson, op: CmpOp, value: &Bson) -> bool {
    match op {
        CmpOp::Eq => values_equal(field, value),
        CmpOp::Ne => !values_equal(field, value),
        _ => compare_scalars(field, value).is_some_and(|ord| match op {
            CmpOp::Gt => ord == Ordering::Greater,
            CmpOp::Gte => ord != Ordering::Less,
            CmpOp::Lt => ord == Ordering::Less,
            CmpOp::Lte => ord != Ordering::Greater,
            CmpOp::Eq | CmpOp::Ne => false,
        }),
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq { path, value } => write!(f, "('{path}' == {value})"),
            Self::Cmp { path, op, value } => write!(f, "('{path}' {op} {value})"),
            Self::Any { path, values } => {
                write!(f, "('{path}' any {})", Bson::Array(values.clone()))
            }
            Self::All { path, values } => {
                write!(f, "('{path}' all {})", Bson::Array(values.clone()))
            }
            Self::Matches { path, regex } => write!(f, "('{path}' ~ /{}/)", regex.as_str()),
            Self::And(l, r) => write!(f, "({l} & {r})"),
            Self::Or(l, r) => write!(f, "({l} | {r})"),
        }
    }
}
