//! Database client capabilities
//!
//! Each operation takes the credentials it should run with, so one client
//! instance can serve several databases. Callers pass a copy made with
//! [`ConnectionCredentials::for_database`] when targeting a different
//! database than the configured one.

use async_trait::async_trait;
use brokkr_core::types::ConnectionCredentials;
use brokkr_core::Result;
use camino::Utf8Path;

/// Runs single statements against a live database
#[async_trait]
pub trait QueryClient: Send + Sync {
    /// Execute `sql`, binding `params` as text to `$1..$n`.
    ///
    /// Returns the number of rows affected when known.
    async fn execute(
        &self,
        sql: &str,
        params: &[String],
        creds: &ConnectionCredentials,
    ) -> Result<u64>;
}

/// Applies SQL files and binary dumps through external tooling
#[async_trait]
pub trait ScriptClient: Send + Sync {
    /// Apply a SQL file in a single transaction. Returns captured stdout.
    async fn apply_file(&self, path: &Utf8Path, creds: &ConnectionCredentials) -> Result<String>;

    /// Restore a binary dump using `jobs` parallel workers
    async fn restore(
        &self,
        backup: &Utf8Path,
        creds: &ConnectionCredentials,
        jobs: usize,
    ) -> Result<String>;
}

/// Lists the extensions registered in a database
#[async_trait]
pub trait ExtensionInspector: Send + Sync {
    /// Installed extension paths, in load order
    async fn installed_extensions(&self, creds: &ConnectionCredentials) -> Result<Vec<String>>;
}
