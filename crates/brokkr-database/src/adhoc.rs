//! Ad-hoc SQL application
//!
//! The payload is written to a temporary `.sql` file named after the target
//! database and handed to the script client. The file is removed on every
//! exit path unless [`ApplyOptions::keep_sql`] is set.

use brokkr_core::types::ConnectionCredentials;
use brokkr_core::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::io;
use std::sync::Arc;
use tempfile::{Builder, NamedTempFile};
use tracing::{debug, error, info};

use crate::client::ScriptClient;

/// Options for a single ad-hoc apply
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyOptions {
    /// Leave the temporary SQL file on disk for inspection
    pub keep_sql: bool,
}

/// Applies arbitrary SQL payloads
#[derive(Clone)]
pub struct AdHocExecutor {
    client: Arc<dyn ScriptClient>,
    temp_dir: Option<Utf8PathBuf>,
}

impl AdHocExecutor {
    pub fn new(client: Arc<dyn ScriptClient>) -> Self {
        Self {
            client,
            temp_dir: None,
        }
    }

    /// Write temporary files under `dir` instead of the system temp directory
    pub fn with_temp_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Apply `sql` to `creds.database` in a single transaction.
    ///
    /// Returns the path of the retained SQL file when `keep_sql` is set.
    pub async fn apply(
        &self,
        sql: &str,
        creds: &ConnectionCredentials,
        options: ApplyOptions,
    ) -> Result<Option<Utf8PathBuf>> {
        let file = self.create_artifact(&creds.database)?;
        let path = utf8_path(&file)?.to_owned();

        tokio::fs::write(&path, sql)
            .await
            .map_err(|source| Error::TempArtifactWrite {
                path: path.to_string(),
                source,
            })?;
        debug!("Wrote {} bytes of SQL to {}", sql.len(), path);

        let applied = self.client.apply_file(&path, creds).await;

        if options.keep_sql {
            file.keep().map_err(|e| Error::TempArtifactWrite {
                path: path.to_string(),
                source: e.error,
            })?;
            info!("Kept SQL file {}", path);
            applied?;
            return Ok(Some(path));
        }

        match applied {
            Ok(_) => {
                file.close().map_err(|source| Error::TempArtifactDelete {
                    path: path.to_string(),
                    source,
                })?;
                Ok(None)
            }
            Err(e) => {
                if let Err(close_err) = file.close() {
                    error!("Cannot delete written query file {}: {}", path, close_err);
                }
                Err(e)
            }
        }
    }

    fn create_artifact(&self, database: &str) -> Result<NamedTempFile> {
        let prefix = format!("temp_query_{}_", database);
        let mut builder = Builder::new();
        builder.prefix(&prefix).suffix(".sql");

        let created = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        };
        created.map_err(|source| Error::TempArtifactWrite {
            path: match &self.temp_dir {
                Some(dir) => dir.join(&prefix).to_string(),
                None => prefix.clone(),
            },
            source,
        })
    }
}

fn utf8_path(file: &NamedTempFile) -> Result<&Utf8Path> {
    Utf8Path::from_path(file.path()).ok_or_else(|| Error::TempArtifactWrite {
        path: file.path().display().to_string(),
        source: io::Error::other("temporary path is not valid UTF-8"),
    })
}
