use crate::config::QueryConfig;
use crate::errors::DbError;
use crate::query::{Cursor, FindOptions, QueryCompiler};
use crate::results::{DeleteResult, InsertManyResult, InsertOneResult, UpdateResult};
use crate::store::Store;
use crate::utils::value::{as_f64, is_number};
use bson::{Bson, Document};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default)]
pub struct InsertOptions {
    /// Skip the duplicate `_id` check.
    pub bypass_document_validation: bool,
}

/// Mongo-style operations over a [`Store`]. Filters are compiled into store predicates and
/// results come back as [`Cursor`]s.
pub struct Collection<S: Store> {
    name: String,
    store: Arc<S>,
    config: QueryConfig,
}

impl<S: Store> Clone for Collection<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S: Store> Collection<S> {
    pub fn new(name: impl Into<String>, store: Arc<S>) -> Self {
        Self::with_config(name, store, QueryConfig::default())
    }

    pub fn with_config(name: impl Into<String>, store: Arc<S>, config: QueryConfig) -> Self {
        Self { name: name.into(), store, config }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    fn compile(&self, filter: Option<&Document>) -> Result<S::Predicate, DbError> {
        QueryCompiler::new(self.store.as_ref()).with_config(self.config.clone()).compile(filter)
    }

    fn id_predicate(&self, id: &Bson) -> S::Predicate {
        self.store.equals(&self.config.id_field, id)
    }

    /// Assign a fresh `_id` unless the document carries a usable one.
    fn ensure_id(&self, doc: &mut Document) -> Bson {
        match doc.get(&self.config.id_field) {
            Some(id) if !is_blank_id(id) => id.clone(),
            _ => {
                let id = Bson::String(uuid::Uuid::new_v4().to_string());
                doc.insert(self.config.id_field.clone(), id.clone());
                id
            }
        }
    }

    fn duplicate(&self, id: &Bson) -> DbError {
        DbError::DuplicateKey { id: id_text(id), collection: self.name.clone() }
    }

    /// # Errors
    /// Returns `DuplicateKey` if a document with the same `_id` is already stored.
    pub fn insert_one(&self, doc: Document) -> Result<InsertOneResult, DbError> {
        self.insert_one_with_options(doc, InsertOptions::default())
    }

    /// # Errors
    /// Returns `DuplicateKey` unless validation is bypassed.
    pub fn insert_one_with_options(
        &self,
        mut doc: Document,
        opts: InsertOptions,
    ) -> Result<InsertOneResult, DbError> {
        let id = self.ensure_id(&mut doc);
        if !opts.bypass_document_validation && self.store.get(&self.id_predicate(&id)).is_some() {
            return Err(self.duplicate(&id));
        }
        let eid = self.store.insert(doc);
        log::debug!("inserted {} into {}", id_text(&id), self.name);
        Ok(InsertOneResult { eid, inserted_id: id })
    }

    /// Insert a batch. Duplicates are checked against stored documents and within the batch
    /// before anything is written.
    ///
    /// # Errors
    /// Returns `DuplicateKey` for the first repeated `_id`.
    pub fn insert_many(&self, docs: Vec<Document>) -> Result<InsertManyResult, DbError> {
        self.insert_many_with_options(docs, InsertOptions::default())
    }

    /// # Errors
    /// Returns `DuplicateKey` unless validation is bypassed.
    pub fn insert_many_with_options(
        &self,
        mut docs: Vec<Document>,
        opts: InsertOptions,
    ) -> Result<InsertManyResult, DbError> {
        let mut existing: HashSet<String> = if opts.bypass_document_validation {
            HashSet::new()
        } else {
            self.store
                .all()
                .iter()
                .filter_map(|d| d.get(&self.config.id_field))
                .map(id_key)
                .collect()
        };
        let mut inserted_ids = Vec::with_capacity(docs.len());
        for doc in &mut docs {
            let id = self.ensure_id(doc);
            if !opts.bypass_document_validation && !existing.insert(id_key(&id)) {
                return Err(self.duplicate(&id));
            }
            inserted_ids.push(id);
        }
        let eids = self.store.insert_multiple(docs);
        log::debug!("inserted {} documents into {}", eids.len(), self.name);
        Ok(InsertManyResult { eids, inserted_ids })
    }

    /// Run a query. `None` returns every document without compiling a predicate.
    ///
    /// # Errors
    /// Propagates filter compilation errors.
    pub fn find(&self, filter: Option<&Document>, opts: &FindOptions) -> Result<Cursor, DbError> {
        let docs = match filter {
            None => self.store.all(),
            Some(f) => self.store.search(&self.compile(Some(f))?),
        };
        Ok(Cursor::with_options(docs, opts))
    }

    /// # Errors
    /// Propagates filter compilation errors.
    pub fn find_one(&self, filter: Option<&Document>) -> Result<Option<Document>, DbError> {
        Ok(self.store.get(&self.compile(filter)?))
    }

    /// # Errors
    /// Propagates filter compilation errors.
    pub fn count(&self, filter: Option<&Document>) -> Result<usize, DbError> {
        Ok(self.find(filter, &FindOptions::default())?.count())
    }

    /// Apply each update document in turn.
    ///
    /// # Errors
    /// Propagates filter compilation errors.
    pub fn update(
        &self,
        query: &Document,
        docs: &[Document],
    ) -> Result<Vec<UpdateResult>, DbError> {
        docs.iter().map(|d| self.update_one(query, d)).collect()
    }

    /// Merge `doc` (or its `$set` section) into every document matching `query`.
    ///
    /// A store failure is logged and reported as an unacknowledged result.
    ///
    /// # Errors
    /// Propagates filter compilation errors.
    pub fn update_one(&self, query: &Document, doc: &Document) -> Result<UpdateResult, DbError> {
        let fields = match doc.get("$set") {
            Some(Bson::Document(set)) => set,
            _ => doc,
        };
        let predicate = self.compile(Some(query))?;
        match self.store.update(fields, &predicate) {
            Ok(ids) => Ok(UpdateResult { raw_result: Some(ids) }),
            Err(e) => {
                log::warn!("update on {} failed: {e}", self.name);
                Ok(UpdateResult { raw_result: None })
            }
        }
    }

    /// # Errors
    /// Propagates filter compilation errors.
    pub fn delete_one(&self, query: &Document) -> Result<DeleteResult, DbError> {
        let Some(id) = self
            .find_one(Some(query))?
            .and_then(|d| d.get(&self.config.id_field).cloned())
        else {
            return Ok(DeleteResult::default());
        };
        Ok(DeleteResult { raw_result: self.store.remove(&self.id_predicate(&id)) })
    }

    /// Remove every match. An empty query also clears the store.
    ///
    /// # Errors
    /// Propagates filter compilation errors.
    pub fn delete_many(&self, query: &Document) -> Result<DeleteResult, DbError> {
        let mut removed = Vec::new();
        for doc in self.find(Some(query), &FindOptions::default())? {
            if let Some(id) = doc.get(&self.config.id_field) {
                removed.extend(self.store.remove(&self.id_predicate(id)));
            }
        }
        if query.is_empty() {
            self.store.drop_all();
        }
        Ok(DeleteResult { raw_result: removed })
    }

    /// # Errors
    /// Propagates filter compilation errors.
    pub fn remove(&self, query: &Document, multi: bool) -> Result<DeleteResult, DbError> {
        if multi { self.delete_many(query) } else { self.delete_one(query) }
    }

    /// Remove every document. Returns whether there was anything to remove.
    pub fn drop(&self) -> bool {
        let had_docs = !self.store.is_empty();
        self.store.drop_all();
        log::info!("dropped collection {}", self.name);
        had_docs
    }
}

// falsy ids (null, false, zero, empty text or containers) are replaced
fn is_blank_id(id: &Bson) -> bool {
    match id {
        Bson::Null | Bson::Boolean(false) => true,
        Bson::String(s) => s.is_empty(),
        Bson::Array(items) => items.is_empty(),
        Bson::Document(doc) => doc.is_empty(),
        v if is_number(v) => as_f64(v) == Some(0.0),
        _ => false,
    }
}

// numeric ids compare by value across BSON number types
fn id_key(id: &Bson) -> String {
    as_f64(id).map_or_else(|| id.to_string(), |n| format!("#{n}"))
}

fn id_text(id: &Bson) -> String {
    match id {
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}
