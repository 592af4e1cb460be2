use super::{CmpOp, EntryId, Predicate, PredicateBuilder, Store};
use crate::config::QueryConfig;
use crate::errors::DbError;
use bson::{Bson, Document};
use parking_lot::RwLock;
use regex::Regex;

/// In-memory table of documents in insertion order.
///
/// Patterns passed to [`PredicateBuilder::matches`] are anchored at the start of the field value.
pub struct MemoryStore {
    rows: RwLock<Vec<(EntryId, Document)>>,
    next_id: RwLock<EntryId>,
    max_depth: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&QueryConfig::default())
    }

    #[must_use]
    pub fn with_config(cfg: &QueryConfig) -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            next_id: RwLock::new(1),
            max_depth: cfg.max_path_depth,
        }
    }

    fn allocate(&self) -> EntryId {
        let mut next = self.next_id.write();
        let id = *next;
        *next += 1;
        id
    }
}

impl PredicateBuilder for MemoryStore {
    type Predicate = Predicate;

    fn equals(&self, path: &str, value: &Bson) -> Predicate {
        Predicate::Eq { path: path.to_string(), value: value.clone() }
    }

    fn compare(&self, path: &str, op: CmpOp, value: &Bson) -> Predicate {
        Predicate::Cmp { path: path.to_string(), op, value: value.clone() }
    }

    fn any_of(&self, path: &str, values: &[Bson]) -> Predicate {
        Predicate::Any { path: path.to_string(), values: values.to_vec() }
    }

    fn all_of(&self, path: &str, values: &[Bson]) -> Predicate {
        Predicate::All { path: path.to_string(), values: values.to_vec() }
    }

    fn matches(&self, path: &str, pattern: &str) -> Result<Predicate, DbError> {
        let regex = Regex::new(&format!("^(?:{pattern})"))?;
        Ok(Predicate::Matches { path: path.to_string(), regex })
    }

    fn and(&self, lhs: Predicate, rhs: Predicate) -> Predicate {
        Predicate::And(Box::new(lhs), Box::new(rhs))
    }

    fn or(&self, lhs: Predicate, rhs: Predicate) -> Predicate {
        Predicate::Or(Box::new(lhs), Box::new(rhs))
    }
}

impl Store for MemoryStore {
    fn search(&self, predicate: &Predicate) -> Vec<Document> {
        self.rows
            .read()
            .iter()
            .filter(|(_, d)| predicate.matches(d, self.max_depth))
            .map(|(_, d)| d.clone())
            .collect()
    }

    fn get(&self, predicate: &Predicate) -> Option<Document> {
        self.rows
            .read()
            .iter()
            .find(|(_, d)| predicate.matches(d, self.max_depth))
            .map(|(_, d)| d.clone())
    }

    fn all(&self) -> Vec<Document> {
        self.rows.read().iter().map(|(_, d)| d.clone()).collect()
    }

    fn insert(&self, doc: Document) -> EntryId {
        let id = self.allocate();
        self.rows.write().push((id, doc));
        id
    }

    fn insert_multiple(&self, docs: Vec<Document>) -> Vec<EntryId> {
        let mut rows = self.rows.write();
        docs.into_iter()
            .map(|doc| {
                let id = self.allocate();
                rows.push((id, doc));
                id
            })
            .collect()
    }

    fn update(&self, fields: &Document, predicate: &Predicate) -> Result<Vec<EntryId>, DbError> {
        let mut rows = self.rows.write();
        let mut updated = Vec::new();
        for (id, doc) in rows.iter_mut() {
            if predicate.matches(doc, self.max_depth) {
                for (k, v) in fields {
                    doc.insert(k.clone(), v.clone());
                }
                updated.push(*id);
            }
        }
        Ok(updated)
    }

    fn remove(&self, predicate: &Predicate) -> Vec<EntryId> {
        let mut rows = self.rows.write();
        let mut removed = Vec::new();
        rows.retain(|(id, d)| {
            if predicate.matches(d, self.max_depth) {
                removed.push(*id);
                false
            } else {
                true
            }
        });
        removed
    }

    fn drop_all(&self) {
        self.rows.write().clear();
    }

    fn len(&self) -> usize {
        self.rows.read().len()
    }
}
