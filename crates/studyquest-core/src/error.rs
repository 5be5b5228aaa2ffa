//! Error types for studyquest-core.
//!
//! The progress engine itself never fails: invalid references and
//! precondition violations are absorbed as no-ops. These types cover the
//! layers around it (storage, configuration, syllabus loading, parent links).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("store: {0}")]
    Store(#[from] StoreError),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Progress store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("cannot open progress store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("store query failed: {0}")]
    QueryFailed(String),

    #[error("schema migration failed: {0}")]
    MigrationFailed(String),

    /// Another process holds the SQLite write lock
    #[error("progress store is busy, try again")]
    Locked,

    #[error("stored progress record for '{user_id}' is corrupt: {message}")]
    CorruptRecord { user_id: String, message: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("cannot write config {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("bad value for config key '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("config is not valid TOML: {0}")]
    ParseFailed(String),
}

/// Input rejected before it reaches a progress record or the store.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Chapter and sub-topic ids must be unique across the whole syllabus
    #[error("duplicate {kind} id: {id}")]
    DuplicateId { kind: String, id: String },

    #[error("'{parent}' is not linked to '{child}'")]
    NotLinked { parent: String, child: String },

    #[error("cannot link '{0}' to itself")]
    SelfLink(String),

    /// No progress record has been stored for this user yet
    #[error("'{0}' has no progress yet")]
    UnknownUser(String),

    #[error("invalid {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked) => {
                StoreError::Locked
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Store(err.into())
    }
}

pub type Result<T, E = CoreError> = std::result::Result<T, E>;
