use std::path::PathBuf;

use thiserror::Error;

use crate::fingerprint::Fingerprint;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("fingerprint {0} is already registered")]
    Duplicate(Fingerprint),
    #[error("fingerprint store is not connected")]
    Closed,
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("schema migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

#[derive(Debug, Error)]
pub enum GenError {
    /// Every candidate in the attempt budget collided with a known fingerprint.
    #[error("no unseen image after {attempts} attempts")]
    Exhausted { attempts: u32 },
    #[error("png encode failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("not a sha-256 hex digest: {0:?}")]
pub struct FingerprintParseError(pub String);
