use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid regular expression: {0}")]
    Regex(#[from] regex::Error),

    #[error("Invalid sort specification: {0}")]
    InvalidSort(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("filter compiled to no clauses")]
    EmptyFilter,

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("_id:{id} already exists in collection:{collection}")]
    DuplicateKey { id: String, collection: String },

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Collection not found: {0}")]
    NoSuchCollection(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl From<std::io::Error> for DbError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
