use crate::collection::Collection;
use crate::config::QueryConfig;
use crate::errors::DbError;
use crate::store::{MemoryStore, Store};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

const INVALID_NAME_CHARS: [char; 7] = [' ', '.', '$', '/', '\\', '\0', '"'];

/// Check a database name.
///
/// # Errors
/// Returns `InvalidName` for the empty string or a name containing a space, `.`, `$`, `/`,
/// `\`, NUL or `"`.
pub fn check_name(name: &str) -> Result<(), DbError> {
    if name.is_empty() {
        return Err(DbError::InvalidName("database name cannot be the empty string".into()));
    }
    if let Some(c) = name.chars().find(|c| INVALID_NAME_CHARS.contains(c)) {
        return Err(DbError::InvalidName(format!(
            "database names cannot contain the character {c:?}"
        )));
    }
    Ok(())
}

/// Named set of in-memory collections.
pub struct Database {
    name: String,
    config: QueryConfig,
    collections: RwLock<BTreeMap<String, Arc<MemoryStore>>>,
}

impl Database {
    /// # Errors
    /// Returns `InvalidName` when the name fails [`check_name`].
    pub fn new(name: &str) -> Result<Self, DbError> {
        Self::with_config(name, QueryConfig::default())
    }

    /// # Errors
    /// Returns `InvalidName` or `Config` for a bad name or configuration.
    pub fn with_config(name: &str, config: QueryConfig) -> Result<Self, DbError> {
        check_name(name)?;
        config.validate()?;
        log::info!("opened database {name}");
        Ok(Self { name: name.to_string(), config, collections: RwLock::new(BTreeMap::new()) })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a collection, creating its store on first use.
    ///
    /// # Errors
    /// Returns `InvalidName` for an empty collection name.
    pub fn collection(&self, name: &str) -> Result<Collection<MemoryStore>, DbError> {
        if name.is_empty() {
            return Err(DbError::InvalidName("collection name cannot be the empty string".into()));
        }
        let store = Arc::clone(
            self.collections
                .write()
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(MemoryStore::with_config(&self.config))),
        );
        Ok(Collection::with_config(name, store, self.config.clone()))
    }

    /// Get an existing collection.
    ///
    /// # Errors
    /// Returns `NoSuchCollection` if it was never created or has been dropped.
    pub fn get_collection(&self, name: &str) -> Result<Collection<MemoryStore>, DbError> {
        let store = self
            .collections
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| DbError::NoSuchCollection(name.to_string()))?;
        Ok(Collection::with_config(name, store, self.config.clone()))
    }

    #[must_use]
    pub fn collection_names(&self) -> Vec<String> {
        self.collections.read().keys().cloned().collect()
    }

    /// Remove a collection and its documents. Returns whether it existed.
    pub fn drop_collection(&self, name: &str) -> bool {
        let Some(store) = self.collections.write().remove(name) else {
            return false;
        };
        store.drop_all();
        log::info!("dropped collection {name} from {}", self.name);
        true
    }
}
