use crate::errors::DbError;
use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_ID_FIELD: &str = "_id";
pub(crate) const DEFAULT_MATCH_ALL_SENTINEL: &str = "-1";
pub(crate) const DEFAULT_MAX_PATH_DEPTH: usize = 32;

/// Settings shared by the compiler, the store and the collection facade.
///
/// `match_all_sentinel` must be a value no stored document ever carries in `id_field`;
/// an empty filter compiles to `id_field != match_all_sentinel`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub id_field: String,
    pub match_all_sentinel: String,
    pub max_path_depth: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            id_field: DEFAULT_ID_FIELD.to_string(),
            match_all_sentinel: DEFAULT_MATCH_ALL_SENTINEL.to_string(),
            max_path_depth: DEFAULT_MAX_PATH_DEPTH,
        }
    }
}

impl QueryConfig {
    /// Defaults overridden by `FRIEDLITE_ID_FIELD`, `FRIEDLITE_MATCH_ALL_SENTINEL`
    /// and `FRIEDLITE_MAX_PATH_DEPTH` when set.
    #[must_use]
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env();
        cfg
    }

    pub fn apply_env(&mut self) {
        if let Ok(s) = std::env::var("FRIEDLITE_ID_FIELD")
            && !s.is_empty()
        {
            self.id_field = s;
        }
        if let Ok(s) = std::env::var("FRIEDLITE_MATCH_ALL_SENTINEL") {
            self.match_all_sentinel = s;
        }
        if let Some(depth) = std::env::var("FRIEDLITE_MAX_PATH_DEPTH")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|d| *d > 0)
        {
            self.max_path_depth = depth;
        }
    }

    /// # Errors
    /// Returns `Config` if the text is not valid TOML for this structure.
    pub fn from_toml_str(s: &str) -> Result<Self, DbError> {
        let cfg: Self = toml::from_str(s).map_err(|e| DbError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    /// Returns `Config` when the id field is empty or the path depth is zero.
    pub fn validate(&self) -> Result<(), DbError> {
        if self.id_field.is_empty() {
            return Err(DbError::Config("id_field must not be empty".into()));
        }
        if self.max_path_depth == 0 {
            return Err(DbError::Config("max_path_depth must be at least 1".into()));
        }
        Ok(())
    }
}
