use crate::errors::DbError;
use crate::logger::CURSOR_TARGET;
use bson::{Bson, Document};
use std::collections::BTreeMap;
use std::ops::{Index, Range};

use super::sort::SortSpecifier;
use super::types::FindOptions;

/// Result set of a query. Sorting and pagination are applied in place; iteration hands out
/// copies of the documents.
#[derive(Debug, Clone, Default)]
pub struct Cursor {
    docs: Vec<Document>,
    // index of the record last returned by `next`
    pos: Option<usize>,
    sort: Option<SortSpecifier>,
    skip: Option<usize>,
    limit: Option<usize>,
}

impl Cursor {
    #[must_use]
    pub fn new(docs: Vec<Document>) -> Self {
        Self { docs, ..Self::default() }
    }

    /// Sort by `opts.sort`, then cut the page selected by `opts.skip` and `opts.limit`.
    #[must_use]
    pub fn with_options(docs: Vec<Document>, opts: &FindOptions) -> Self {
        let mut cursor = Self::new(docs);
        if let Some(spec) = &opts.sort {
            cursor.sort_by(spec.clone());
        }
        cursor.skip = opts.skip;
        cursor.limit = opts.limit;
        cursor.paginate();
        cursor
    }

    /// Validate a sort request and reorder the documents.
    ///
    /// # Errors
    /// Returns `InvalidSort` for a malformed request; the documents are left untouched.
    pub fn sort(
        &mut self,
        key_or_list: &Bson,
        direction: Option<&Bson>,
    ) -> Result<&mut Self, DbError> {
        let spec = SortSpecifier::parse(key_or_list, direction)?;
        Ok(self.sort_by(spec))
    }

    pub fn sort_by(&mut self, spec: SortSpecifier) -> &mut Self {
        spec.sort_documents(&mut self.docs);
        self.sort = Some(spec);
        self
    }

    fn paginate(&mut self) {
        let Some(window) = page_window(self.docs.len(), self.skip, self.limit) else {
            return;
        };
        log::debug!(
            target: CURSOR_TARGET,
            "paginating {} documents to {window:?} (skip {:?}, limit {:?})",
            self.docs.len(),
            self.skip,
            self.limit
        );
        self.docs.truncate(window.end);
        self.docs.drain(..window.start);
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.docs.len()
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.pos.map_or(0, |p| p + 1) < self.docs.len()
    }

    /// The record last returned by `next`, if any.
    ///
    /// This follows iteration rather than pinning the last record of the result set: a
    /// fresh cursor has no current record, and after a `sort` the position keeps its index.
    #[must_use]
    pub fn current(&self) -> Option<&Document> {
        self.docs.get(self.pos?)
    }

    /// Field of the current record.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Bson> {
        self.current()?.get(key)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Document> {
        self.docs.get(index)
    }

    #[must_use]
    pub fn sort_spec(&self) -> Option<&SortSpecifier> {
        self.sort.as_ref()
    }

    #[must_use]
    pub fn to_vec(self) -> Vec<Document> {
        self.docs
    }
}

impl Index<usize> for Cursor {
    type Output = Document;

    fn index(&self, index: usize) -> &Document {
        &self.docs[index]
    }
}

impl Iterator for Cursor {
    type Item = Document;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.pos.map_or(0, |p| p + 1);
        let doc = self.docs.get(next)?.clone();
        self.pos = Some(next);
        Some(doc)
    }
}

/// Slice of a result set of `count` documents that a `skip`/`limit` request keeps.
///
/// `None` means no slicing: no limit, a zero limit, an empty result, or a limit that
/// already covers every document (`skip` is ignored then). Otherwise pages are laid out
/// every `limit` documents; a `skip` landing on a page start keeps that page, any other
/// `skip` keeps everything from `skip` to the end.
#[must_use]
pub fn page_window(
    count: usize,
    skip: Option<usize>,
    limit: Option<usize>,
) -> Option<Range<usize>> {
    let limit = limit.filter(|l| *l > 0)?;
    if count == 0 || limit >= count {
        return None;
    }
    let skip = skip.unwrap_or(0);
    let mut bounds = BTreeMap::new();
    let mut last = 0;
    for page in 0..count.div_ceil(limit) {
        let current = limit * page;
        bounds.insert(last, current);
        last = current;
    }
    let end = bounds.get(&skip).copied().unwrap_or(count).min(count);
    Some(skip.min(end)..end)
}
