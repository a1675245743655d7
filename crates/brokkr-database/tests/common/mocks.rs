//! Mock database clients
//!
//! `RecordingClient` implements every client capability, records each call
//! in order and fails the calls it has been told to fail.

use async_trait::async_trait;
use brokkr_core::types::ConnectionCredentials;
use brokkr_core::{Error, Result};
use brokkr_database::{ExtensionInspector, QueryClient, ScriptClient};
use camino::Utf8Path;
use std::sync::{Arc, Mutex};

/// Record of one client call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Execute {
        database: String,
        sql: String,
        params: Vec<String>,
    },
    ApplyFile {
        database: String,
        path: String,
        /// File content at the time of the call, if it could be read
        content: Option<String>,
    },
    Restore {
        database: String,
        backup: String,
        jobs: usize,
    },
    Inspect {
        database: String,
    },
}

impl Call {
    pub fn database(&self) -> &str {
        match self {
            Call::Execute { database, .. }
            | Call::ApplyFile { database, .. }
            | Call::Restore { database, .. }
            | Call::Inspect { database } => database,
        }
    }
}

#[derive(Default)]
struct Failures {
    apply_paths: Vec<String>,
    restore: bool,
    execute_databases: Vec<String>,
}

/// Mock implementing all client traits
#[derive(Clone, Default)]
pub struct RecordingClient {
    calls: Arc<Mutex<Vec<Call>>>,
    failures: Arc<Mutex<Failures>>,
    installed: Arc<Mutex<Vec<String>>>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail `apply_file` for any path ending in `suffix`
    pub fn fail_apply(&self, suffix: &str) -> &Self {
        self.failures.lock().unwrap().apply_paths.push(suffix.to_string());
        self
    }

    /// Fail every restore
    pub fn fail_restore(&self) -> &Self {
        self.failures.lock().unwrap().restore = true;
        self
    }

    /// Fail every statement executed against `database`
    pub fn fail_execute_on(&self, database: &str) -> &Self {
        self.failures
            .lock()
            .unwrap()
            .execute_databases
            .push(database.to_string());
        self
    }

    /// Extensions reported by the inspector
    pub fn with_installed(&self, extensions: &[&str]) -> &Self {
        *self.installed.lock().unwrap() = extensions.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, database: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.database() == database)
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl QueryClient for RecordingClient {
    async fn execute(
        &self,
        sql: &str,
        params: &[String],
        creds: &ConnectionCredentials,
    ) -> Result<u64> {
        self.record(Call::Execute {
            database: creds.database.clone(),
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        // Yield so concurrent callers interleave
        tokio::task::yield_now().await;

        let fail = self
            .failures
            .lock()
            .unwrap()
            .execute_databases
            .contains(&creds.database);
        if fail {
            return Err(Error::query(&creds.database, "connection refused"));
        }
        Ok(1)
    }
}

#[async_trait]
impl ScriptClient for RecordingClient {
    async fn apply_file(&self, path: &Utf8Path, creds: &ConnectionCredentials) -> Result<String> {
        self.record(Call::ApplyFile {
            database: creds.database.clone(),
            path: path.to_string(),
            content: std::fs::read_to_string(path).ok(),
        });

        let fail = self
            .failures
            .lock()
            .unwrap()
            .apply_paths
            .iter()
            .any(|suffix| path.as_str().ends_with(suffix.as_str()));
        if fail {
            return Err(Error::process("psql", "exit code 3", "ERROR:  syntax error"));
        }
        Ok(String::new())
    }

    async fn restore(
        &self,
        backup: &Utf8Path,
        creds: &ConnectionCredentials,
        jobs: usize,
    ) -> Result<String> {
        self.record(Call::Restore {
            database: creds.database.clone(),
            backup: backup.to_string(),
            jobs,
        });

        if self.failures.lock().unwrap().restore {
            return Err(Error::process(
                "pg_restore",
                "exit code 1",
                "pg_restore: warning: errors ignored on restore: 4",
            ));
        }
        Ok(String::new())
    }
}

#[async_trait]
impl ExtensionInspector for RecordingClient {
    async fn installed_extensions(&self, creds: &ConnectionCredentials) -> Result<Vec<String>> {
        self.record(Call::Inspect {
            database: creds.database.clone(),
        });
        Ok(self.installed.lock().unwrap().clone())
    }
}
