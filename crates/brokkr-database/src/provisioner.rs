//! Whole-database lifecycle
//!
//! A build spec selects one of two step sequences:
//!
//! - from source: drop, create, build schema, populate
//! - from backup: drop, create, restore, inspect
//!
//! Steps run strictly in order and the first failure stops the sequence.
//! The restore step is the exception: under [`RestoreFailurePolicy::Ignore`]
//! its failure is logged and the sequence carries on to inspection, whose
//! result replaces the build spec's extension list.

use brokkr_core::config::{BrokkrConfigFile, RestoreFailurePolicy};
use brokkr_core::pipeline::map_series;
use brokkr_core::types::{BuildOrigin, BuildSpec, ConnectionCredentials};
use brokkr_core::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{info, warn};

use crate::client::{ExtensionInspector, QueryClient, ScriptClient};

static DATABASE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*$").expect("database name regex is valid")
});

/// Reject names that cannot be interpolated into `drop`/`create` unquoted
pub fn validate_database_name(name: &str) -> Result<()> {
    if DATABASE_NAME.is_match(name) {
        Ok(())
    } else {
        Err(Error::InvalidDatabaseName {
            name: name.to_string(),
        })
    }
}

/// Provisioning knobs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionSettings {
    /// Database the drop/create statements run against
    pub maintenance_database: String,

    /// Template for the created database
    pub template_database: String,

    /// Schema file applied before the source, looked up next to it
    pub schema_file: String,

    /// Restore parallelism; available processing units when unset
    pub restore_jobs: Option<usize>,

    pub restore_failure: RestoreFailurePolicy,
}

impl Default for ProvisionSettings {
    fn default() -> Self {
        Self::from_config(&BrokkrConfigFile::default())
    }
}

impl ProvisionSettings {
    pub fn from_config(config: &BrokkrConfigFile) -> Self {
        Self {
            maintenance_database: config.client.maintenance_database.clone(),
            template_database: config.client.template_database.clone(),
            schema_file: config.layout.schema_file.clone(),
            restore_jobs: config.client.restore_jobs,
            restore_failure: config.client.restore_failure,
        }
    }

    fn jobs(&self) -> usize {
        self.restore_jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step<'a> {
    Drop,
    Create,
    BuildSchema(Utf8PathBuf),
    Populate(&'a Utf8Path),
    Restore(&'a Utf8Path),
    Inspect,
}

/// Drops, recreates and fills databases
#[derive(Clone)]
pub struct DatabaseProvisioner {
    query: Arc<dyn QueryClient>,
    scripts: Arc<dyn ScriptClient>,
    inspector: Arc<dyn ExtensionInspector>,
    settings: ProvisionSettings,
}

impl DatabaseProvisioner {
    pub fn new(
        query: Arc<dyn QueryClient>,
        scripts: Arc<dyn ScriptClient>,
        inspector: Arc<dyn ExtensionInspector>,
    ) -> Self {
        Self {
            query,
            scripts,
            inspector,
            settings: ProvisionSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ProvisionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &ProvisionSettings {
        &self.settings
    }

    /// Run the lifecycle for `spec`.
    ///
    /// `creds` is only read; every step gets its own copy pointed at either
    /// the target or the maintenance database. After a backup restore,
    /// `spec.extensions` holds the extensions found in the restored database.
    pub async fn provision(&self, spec: &mut BuildSpec, creds: &ConnectionCredentials) -> Result<()> {
        validate_database_name(&spec.database)?;
        validate_database_name(&self.settings.template_database)?;

        let target = creds.for_database(&spec.database);
        let maintenance = creds.for_database(&self.settings.maintenance_database);

        let installed = {
            let steps = self.plan(spec)?;
            let (target, maintenance) = (&target, &maintenance);
            let outcomes =
                map_series(steps, move |step| self.run_step(step, target, maintenance)).await?;
            outcomes.into_iter().flatten().last()
        };

        if let Some(installed) = installed {
            info!(
                "Database {} has {} installed extensions",
                spec.database,
                installed.len()
            );
            spec.extensions = installed;
        }
        Ok(())
    }

    fn plan<'a>(&self, spec: &'a BuildSpec) -> Result<Vec<Step<'a>>> {
        Ok(match spec.origin()? {
            BuildOrigin::Source(source) => {
                let schema = source
                    .parent()
                    .unwrap_or_else(|| Utf8Path::new(""))
                    .join(&self.settings.schema_file);
                vec![
                    Step::Drop,
                    Step::Create,
                    Step::BuildSchema(schema),
                    Step::Populate(source),
                ]
            }
            BuildOrigin::Backup(backup) => {
                vec![Step::Drop, Step::Create, Step::Restore(backup), Step::Inspect]
            }
        })
    }

    async fn run_step(
        &self,
        step: Step<'_>,
        target: &ConnectionCredentials,
        maintenance: &ConnectionCredentials,
    ) -> Result<Option<Vec<String>>> {
        let database = &target.database;
        match step {
            Step::Drop => {
                info!("Dropping database {}", database);
                let sql = format!("drop database if exists {};", database);
                self.query.execute(&sql, &[], maintenance).await?;
            }
            Step::Create => {
                info!("Creating database {}", database);
                let sql = format!(
                    "create database {} template {};",
                    database, self.settings.template_database
                );
                self.query.execute(&sql, &[], maintenance).await?;
            }
            Step::BuildSchema(schema) => {
                info!("Building schema for database {}", database);
                self.scripts.apply_file(&schema, target).await?;
            }
            Step::Populate(source) => {
                info!("Populating data for database {} from {}", database, source);
                self.scripts.apply_file(source, target).await?;
            }
            Step::Restore(backup) => {
                let result = self.scripts.restore(backup, target, self.settings.jobs()).await;
                match (result, self.settings.restore_failure) {
                    (Ok(_), _) => {}
                    (Err(e), RestoreFailurePolicy::Ignore) => {
                        warn!("Ignoring restore error for database {}: {}", database, e);
                    }
                    (Err(e), RestoreFailurePolicy::Fail) => return Err(e),
                }
            }
            Step::Inspect => {
                return Ok(Some(self.inspector.installed_extensions(target).await?));
            }
        }
        Ok(None)
    }
}
