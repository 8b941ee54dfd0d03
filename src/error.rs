use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("vocabulary file not found: {0}")]
    MissingFile(String),
    #[error("vocabulary file is not valid utf-8: {0}")]
    NotUtf8(String),
    #[error("invalid vocabulary json in {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown category: {0}")]
    UnknownCategory(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt history row {id}: {reason}")]
    CorruptRow { id: i64, reason: String },
}
