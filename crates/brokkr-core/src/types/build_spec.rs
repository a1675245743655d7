//! Per-database build and target specifications

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// What to build one database from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSpec {
    /// Target database name
    pub database: String,

    /// Schema and seed SQL file (excludes `backup`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Utf8PathBuf>,

    /// Binary dump to restore (excludes `source`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup: Option<Utf8PathBuf>,

    /// Extension paths to install. Replaced by the installed list after a restore.
    #[serde(default)]
    pub extensions: Vec<String>,
}

/// Where a database build starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOrigin<'a> {
    Source(&'a Utf8Path),
    Backup(&'a Utf8Path),
}

impl BuildSpec {
    pub fn from_source(database: impl Into<String>, source: impl Into<Utf8PathBuf>) -> Self {
        Self {
            database: database.into(),
            source: Some(source.into()),
            ..Default::default()
        }
    }

    pub fn from_backup(database: impl Into<String>, backup: impl Into<Utf8PathBuf>) -> Self {
        Self {
            database: database.into(),
            backup: Some(backup.into()),
            ..Default::default()
        }
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Which branch of the lifecycle applies. Exactly one of source or backup must be set.
    pub fn origin(&self) -> Result<BuildOrigin<'_>> {
        match (&self.source, &self.backup) {
            (Some(source), None) => Ok(BuildOrigin::Source(source)),
            (None, Some(backup)) => Ok(BuildOrigin::Backup(backup)),
            (Some(_), Some(_)) => Err(Error::invalid_build_spec(
                &self.database,
                "source and backup are mutually exclusive",
            )),
            (None, None) => Err(Error::invalid_build_spec(
                &self.database,
                "one of source or backup is required",
            )),
        }
    }
}

/// A database plus the extension paths an operation targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub database: String,
    pub extensions: Vec<String>,
}

impl TargetSpec {
    pub fn new(database: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            extensions: vec![extension.into()],
        }
    }
}
