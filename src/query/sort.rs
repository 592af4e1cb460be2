use crate::errors::DbError;
use crate::logger::CURSOR_TARGET;
use crate::utils::json::parse_json_to_bson;
use bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use super::order::{SortValue, resolve_sort_field};
use super::types::{Order, SortSpec};

/// Ordered list of sort keys; earlier keys take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortSpecifier(Vec<SortSpec>);

impl SortSpecifier {
    #[must_use]
    pub const fn new(specs: Vec<SortSpec>) -> Self {
        Self(specs)
    }

    pub fn single(field: impl Into<String>, order: Order) -> Self {
        Self(vec![SortSpec::new(field, order)])
    }

    /// Validate a sort request given as a field name with an optional direction, or as a
    /// list of `[field, direction]` pairs.
    ///
    /// # Errors
    /// Returns `InvalidSort` when:
    /// - a direction is not the integer `1` or `-1`
    /// - a direction is passed next to a list of pairs
    /// - a pair is not a two-element array starting with a string
    /// - `key_or_list` is neither a string nor an array
    pub fn parse(key_or_list: &Bson, direction: Option<&Bson>) -> Result<Self, DbError> {
        let direction = direction.filter(|d| !matches!(d, Bson::Null));
        match key_or_list {
            Bson::Array(pairs) => {
                if direction.is_some() {
                    return Err(DbError::InvalidSort(
                        "direction can not be set separately when sorting by multiple fields"
                            .into(),
                    ));
                }
                pairs.iter().map(parse_pair).collect::<Result<Vec<_>, _>>().map(Self)
            }
            Bson::String(field) => {
                let order = direction.map_or(Ok(Order::Asc), parse_direction)?;
                Ok(Self::single(field.clone(), order))
            }
            other => Err(DbError::InvalidSort(format!(
                "expected a field name or a list of (field, direction) pairs, got {other}"
            ))),
        }
    }

    /// Parse a command-line sort argument. JSON input goes through [`Self::parse`]; text that
    /// is not JSON is taken as a field name sorted ascending.
    ///
    /// # Errors
    /// Same as [`Self::parse`].
    pub fn parse_arg(arg: &str) -> Result<Self, DbError> {
        match parse_json_to_bson(arg) {
            Ok(value) => Self::parse(&value, None),
            Err(_) => Ok(Self::single(arg, Order::Asc)),
        }
    }

    #[must_use]
    pub fn specs(&self) -> &[SortSpec] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Stable multi-key sort. Documents are moved into place, never cloned.
    pub fn sort_documents(&self, docs: &mut Vec<Document>) {
        if self.0.is_empty() || docs.len() < 2 {
            return;
        }
        log::debug!(target: CURSOR_TARGET, "sorting {} documents by [{self}]", docs.len());
        let keys: Vec<Vec<SortValue>> = docs
            .iter()
            .map(|d| {
                self.0
                    .iter()
                    .map(|s| {
                        let value = resolve_sort_field(d, &s.field, s.order);
                        SortValue::from_bson(value, Some(s.order))
                    })
                    .collect()
            })
            .collect();
        let mut indices: Vec<usize> = (0..docs.len()).collect();
        indices.sort_by(|&a, &b| self.compare_keys(&keys[a], &keys[b]));

        let mut slots: Vec<Option<Document>> = std::mem::take(docs).into_iter().map(Some).collect();
        docs.extend(indices.into_iter().filter_map(|i| slots[i].take()));
    }

    fn compare_keys(&self, a: &[SortValue], b: &[SortValue]) -> Ordering {
        for ((spec, ka), kb) in self.0.iter().zip(a).zip(b) {
            let ord = match spec.order {
                Order::Asc => ka.cmp(kb),
                Order::Desc => kb.cmp(ka),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

impl From<Vec<SortSpec>> for SortSpecifier {
    fn from(specs: Vec<SortSpec>) -> Self {
        Self(specs)
    }
}

impl fmt::Display for SortSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, s) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}:{}", s.field, s.order.direction())?;
        }
        Ok(())
    }
}

fn parse_direction(value: &Bson) -> Result<Order, DbError> {
    let d = match value {
        Bson::Int32(i) => i64::from(*i),
        Bson::Int64(i) => *i,
        other => {
            return Err(DbError::InvalidSort(format!("direction must be 1 or -1, got {other}")));
        }
    };
    Order::from_direction(d)
        .ok_or_else(|| DbError::InvalidSort(format!("direction must be 1 or -1, got {d}")))
}

fn parse_pair(pair: &Bson) -> Result<SortSpec, DbError> {
    let Bson::Array(items) = pair else {
        return Err(DbError::InvalidSort(format!("key pair should be an array, got {pair}")));
    };
    match items.as_slice() {
        [Bson::String(field), direction] => {
            Ok(SortSpec::new(field.clone(), parse_direction(direction)?))
        }
        [other, _] => Err(DbError::InvalidSort(format!(
            "first item in each key pair must be a string, got {other}"
        ))),
        _ => Err(DbError::InvalidSort(format!(
            "need a (key, direction) pair, got {} item(s)",
            items.len()
        ))),
    }
}
