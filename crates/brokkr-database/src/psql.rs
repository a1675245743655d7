//! `psql` / `pg_restore` backed script client

use async_trait::async_trait;
use brokkr_core::config::{ClientConfig, DEFAULT_MAX_OUTPUT_BYTES};
use brokkr_core::types::ConnectionCredentials;
use brokkr_core::Result;
use camino::Utf8Path;
use tokio::process::Command;
use tracing::info;

use crate::client::ScriptClient;
use crate::process::run_capped;

/// Shells out to the PostgreSQL command line tools
#[derive(Debug, Clone)]
pub struct PsqlClient {
    psql: String,
    pg_restore: String,
    max_output_bytes: usize,
}

impl Default for PsqlClient {
    fn default() -> Self {
        Self {
            psql: "psql".to_string(),
            pg_restore: "pg_restore".to_string(),
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }
}

impl PsqlClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            psql: config.psql.clone(),
            pg_restore: config.pg_restore.clone(),
            max_output_bytes: config.max_output_bytes,
        }
    }

    pub fn with_max_output_bytes(mut self, max_output_bytes: usize) -> Self {
        self.max_output_bytes = max_output_bytes;
        self
    }

    fn command(&self, program: &str, creds: &ConnectionCredentials) -> Command {
        let mut cmd = Command::new(program);
        cmd.arg("-U")
            .arg(&creds.username)
            .arg("-h")
            .arg(&creds.hostname)
            .arg("-p")
            .arg(creds.port.to_string())
            .arg("-d")
            .arg(&creds.database);
        if let Some(password) = &creds.password {
            cmd.env("PGPASSWORD", password);
        }
        cmd
    }

    fn apply_command(&self, path: &Utf8Path, creds: &ConnectionCredentials) -> Command {
        let mut cmd = self.command(&self.psql, creds);
        cmd.args(["-v", "ON_ERROR_STOP=1", "--single-transaction", "-f"])
            .arg(path.as_str());
        cmd
    }

    fn restore_command(
        &self,
        backup: &Utf8Path,
        creds: &ConnectionCredentials,
        jobs: usize,
    ) -> Command {
        let mut cmd = self.command(&self.pg_restore, creds);
        cmd.arg("-j").arg(jobs.to_string()).arg(backup.as_str());
        cmd
    }
}

#[async_trait]
impl ScriptClient for PsqlClient {
    async fn apply_file(&self, path: &Utf8Path, creds: &ConnectionCredentials) -> Result<String> {
        info!("Applying {} to database {}", path, creds.database);
        let output = run_capped(
            self.apply_command(path, creds),
            &self.psql,
            self.max_output_bytes,
        )
        .await?;
        Ok(output.stdout)
    }

    async fn restore(
        &self,
        backup: &Utf8Path,
        creds: &ConnectionCredentials,
        jobs: usize,
    ) -> Result<String> {
        info!(
            "Restoring {} into database {} with {} jobs",
            backup, creds.database, jobs
        );
        let output = run_capped(
            self.restore_command(backup, creds, jobs),
            &self.pg_restore,
            self.max_output_bytes,
        )
        .await?;
        Ok(output.stdout)
    }
}
