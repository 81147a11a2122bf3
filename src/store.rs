use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

use crate::{error::StoreError, fingerprint::Fingerprint};

/// Durable set of every fingerprint ever saved, mirrored in memory.
///
/// A fingerprint is in `seen` iff it has a row in `generated_images`. The only
/// way to break that is a crash between the memory insert and the commit.
pub struct FingerprintStore {
    pool: Option<SqlitePool>,
    path: PathBuf,
    seen: HashSet<Fingerprint>,
}

impl FingerprintStore {
    /// Opens (or creates) the SQLite file at `path`, applies the schema and
    /// loads all known fingerprints.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::Io { path: parent.to_path_buf(), source })?;
        }

        let opts = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Delete);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        let rows: Vec<Option<String>> = sqlx::query_scalar("SELECT hash FROM generated_images")
            .fetch_all(&pool)
            .await?;
        let mut seen = HashSet::with_capacity(rows.len());
        for raw in rows.into_iter().flatten() {
            match raw.parse::<Fingerprint>() {
                Ok(fp) => {
                    seen.insert(fp);
                }
                Err(e) => tracing::warn!("skipping stored row: {e}"),
            }
        }

        tracing::info!(path = %path.display(), known = seen.len(), "fingerprint store opened");
        Ok(Self { pool: Some(pool), path, seen })
    }

    /// A store with no backing connection. Lookups work against an empty set,
    /// every `register` fails with [`StoreError::Closed`].
    pub fn disconnected(path: impl AsRef<Path>) -> Self {
        Self { pool: None, path: path.as_ref().to_path_buf(), seen: HashSet::new() }
    }

    pub fn contains(&self, fp: &Fingerprint) -> bool {
        self.seen.contains(fp)
    }

    /// Records `fp` in memory, then in the table. A failed insert is rolled
    /// back out of memory.
    pub async fn register(&mut self, fp: &Fingerprint) -> Result<(), StoreError> {
        if self.seen.contains(fp) {
            return Err(StoreError::Duplicate(fp.clone()));
        }
        let pool = self.pool.as_ref().ok_or(StoreError::Closed)?;

        self.seen.insert(fp.clone());
        let res = sqlx::query("INSERT INTO generated_images (hash) VALUES (?)")
            .bind(fp.as_str())
            .execute(pool)
            .await;

        match res {
            Ok(_) => Ok(()),
            Err(e) => {
                self.seen.remove(fp);
                match e {
                    sqlx::Error::Database(db) if db.is_unique_violation() => {
                        Err(StoreError::Duplicate(fp.clone()))
                    }
                    other => Err(other.into()),
                }
            }
        }
    }

    /// Current size of the database file in bytes.
    pub async fn size_on_disk(&self) -> Result<u64, StoreError> {
        let meta = tokio::fs::metadata(&self.path)
            .await
            .map_err(|source| StoreError::Io { path: self.path.clone(), source })?;
        Ok(meta.len())
    }

    /// Number of rows in the table. Hits the database, unlike [`len`](Self::len).
    pub async fn count_rows(&self) -> Result<i64, StoreError> {
        let pool = self.pool.as_ref().ok_or(StoreError::Closed)?;
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM generated_images")
            .fetch_one(pool)
            .await?;
        Ok(n)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn fingerprints(&self) -> impl Iterator<Item = &Fingerprint> {
        self.seen.iter()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_connected(&self) -> bool {
        self.pool.as_ref().is_some_and(|p| !p.is_closed())
    }

    /// Closes the pool, waiting for the connection to be released. Safe to
    /// call more than once.
    pub async fn close(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.close().await;
            tracing::debug!(path = %self.path.display(), "fingerprint store closed");
        }
    }
}
