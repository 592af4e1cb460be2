//! Sort keys. Every BSON value maps to a [`SortValue`] whose type class decides the order
//! between kinds before the payload is looked at:
//!
//! empty array < null/unsupported < number < string < document < array < boolean

use crate::utils::value::{as_f64, cmp_f64, is_number};
use bson::{Bson, Document};
use std::cmp::Ordering;

use super::types::{MAX_PATH_DEPTH, Order};

#[derive(Debug, Clone)]
pub enum SortValue {
    /// A top-level `[]`, which sorts below a missing field.
    EmptyArray,
    /// Null, missing, and every BSON type without a defined order.
    Unsupported,
    Number(f64),
    Text(String),
    Document(Vec<(String, SortValue)>),
    Array(Vec<SortValue>),
    Boolean(bool),
}

impl SortValue {
    /// Build the sort key of a field value.
    ///
    /// With `extreme` set, a top-level array collapses to its smallest member for
    /// ascending order and its largest for descending. Arrays below the top level are
    /// always compared element by element.
    #[must_use]
    pub fn from_bson(value: Option<&Bson>, extreme: Option<Order>) -> Self {
        let Some(value) = value else {
            return Self::Unsupported;
        };
        match value {
            Bson::Boolean(b) => Self::Boolean(*b),
            v if is_number(v) => as_f64(v).map_or(Self::Unsupported, Self::Number),
            Bson::String(s) => Self::Text(s.clone()),
            Bson::Document(d) => Self::from_document(d),
            Bson::Array(items) => {
                let members: Vec<Self> = if items.is_empty() {
                    vec![Self::EmptyArray]
                } else {
                    items.iter().map(|v| Self::from_bson(Some(v), None)).collect()
                };
                match extreme {
                    Some(Order::Asc) => members.into_iter().min().unwrap_or(Self::EmptyArray),
                    Some(Order::Desc) => members.into_iter().max().unwrap_or(Self::EmptyArray),
                    None => Self::Array(members),
                }
            }
            _ => Self::Unsupported,
        }
    }

    fn from_document(doc: &Document) -> Self {
        Self::Document(
            doc.iter().map(|(k, v)| (k.clone(), Self::from_bson(Some(v), None))).collect(),
        )
    }

    #[must_use]
    pub const fn class(&self) -> i8 {
        match self {
            Self::EmptyArray => -1,
            Self::Unsupported => 0,
            Self::Number(_) => 1,
            Self::Text(_) => 2,
            Self::Document(_) => 3,
            Self::Array(_) => 4,
            Self::Boolean(_) => 5,
        }
    }

    fn cmp_payload(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => cmp_f64(*a, *b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Boolean(a), Self::Boolean(b)) => a.cmp(b),
            (Self::Array(a), Self::Array(b)) => a.cmp(b),
            (Self::Document(a), Self::Document(b)) => {
                // entries compare as (class, key, payload)
                for ((ka, va), (kb, vb)) in a.iter().zip(b) {
                    let ord = va
                        .class()
                        .cmp(&vb.class())
                        .then_with(|| ka.cmp(kb))
                        .then_with(|| va.cmp_payload(vb));
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            _ => Ordering::Equal,
        }
    }
}

impl Ord for SortValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.class().cmp(&other.class()).then_with(|| self.cmp_payload(other))
    }
}

impl PartialOrd for SortValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortValue {}

/// Resolve a dotted sort path.
///
/// Embedded documents are walked by key. When a segment meets an array, ascending order
/// only looks inside a single-element array wrapping a document, while descending order
/// takes the first member document that has the key. Anything else is unresolved.
#[must_use]
pub fn resolve_sort_field<'a>(doc: &'a Document, path: &str, order: Order) -> Option<&'a Bson> {
    let mut parts = path.split('.');
    let mut cur = doc.get(parts.next()?)?;
    for (depth, key) in parts.enumerate() {
        if depth + 1 >= MAX_PATH_DEPTH {
            return None;
        }
        cur = match cur {
            Bson::Document(d) => d.get(key)?,
            Bson::Array(items) => match order {
                Order::Asc => match items.as_slice() {
                    [only] => only.as_document()?.get(key)?,
                    _ => return None,
                },
                Order::Desc => items.iter().filter_map(Bson::as_document).find_map(|d| d.get(key))?,
            },
            _ => return None,
        };
    }
    Some(cur)
}
