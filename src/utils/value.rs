//! Helpers for comparing `Bson` values the way the query layer expects: numbers compare across
//! their concrete BSON types and embedded documents compare without regard to key order.

use bson::{Bson, Document};
use std::cmp::Ordering;

#[must_use]
pub const fn is_number(v: &Bson) -> bool {
    matches!(v, Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_))
}

#[must_use]
pub fn as_f64(v: &Bson) -> Option<f64> {
    #[allow(clippy::cast_precision_loss)]
    match v {
        Bson::Int32(i) => Some(f64::from(*i)),
        Bson::Int64(i) => Some(*i as f64),
        Bson::Double(f) => Some(*f),
        Bson::Decimal128(d) => d.to_string().parse::<f64>().ok(),
        _ => None,
    }
}

/// Numeric ordering that treats `0.0` and `-0.0` as equal and stays total for NaN.
#[must_use]
pub fn cmp_f64(a: f64, b: f64) -> Ordering {
    if a == b { Ordering::Equal } else { a.total_cmp(&b) }
}

/// Equality used by `$eq`-style predicates.
#[must_use]
pub fn values_equal(a: &Bson, b: &Bson) -> bool {
    match (a, b) {
        (x, y) if is_number(x) && is_number(y) => match (as_f64(x), as_f64(y)) {
            (Some(l), Some(r)) => l == r,
            _ => false,
        },
        (Bson::Array(x), Bson::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| values_equal(l, r))
        }
        (Bson::Document(x), Bson::Document(y)) => documents_equal(x, y),
        _ => a == b,
    }
}

#[must_use]
pub fn documents_equal(a: &Document, b: &Document) -> bool {
    a.len() == b.len() && a.iter().all(|(k, v)| b.get(k).is_some_and(|w| values_equal(v, w)))
}

/// Ordering for range predicates. `None` when the two values are of incomparable kinds.
#[must_use]
pub fn compare_scalars(a: &Bson, b: &Bson) -> Option<Ordering> {
    if is_number(a) && is_number(b) {
        return Some(cmp_f64(as_f64(a)?, as_f64(b)?));
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Walk a dotted path through embedded documents.
#[must_use]
pub fn get_path<'a>(doc: &'a Document, path: &str, max_depth: usize) -> Option<&'a Bson> {
    if path.is_empty() {
        return None;
    }
    let mut parts = path.split('.').enumerate().peekable();
    let mut cur = doc;
    while let Some((depth, part)) = parts.next() {
        if depth >= max_depth {
            return None;
        }
        let v = cur.get(part)?;
        if parts.peek().is_none() {
            return Some(v);
        }
        match v {
            Bson::Document(d) => cur = d,
            _ => return None,
        }
    }
    None
}
