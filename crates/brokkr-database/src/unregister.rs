//! Extension removal
//!
//! Deletes an extension's bookkeeping rows from each target database. Rows
//! that reference the extension go first and the `xt.ext` row itself last.
//! Databases are processed concurrently and independently; the operation
//! fails if any of them failed.

use brokkr_core::pipeline::{each_independent, map_series};
use brokkr_core::types::{ConnectionCredentials, TargetSpec};
use brokkr_core::{Error, Result};
use std::sync::Arc;
use tracing::{error, info};

use crate::client::QueryClient;

/// Deletion statements, in execution order. `$1` is the extension name.
pub const UNREGISTER_STATEMENTS: [&str; 6] = [
    "delete from xt.usrext where usrext_id in (select usrext_id from xt.usrext inner join xt.ext on usrext_ext_id = ext_id where ext_name = $1);",
    "delete from xt.grpext where grpext_id in (select grpext_id from xt.grpext inner join xt.ext on grpext_ext_id = ext_id where ext_name = $1);",
    "delete from xt.clientcode where clientcode_id in (select clientcode_id from xt.clientcode inner join xt.ext on clientcode_ext_id = ext_id where ext_name = $1);",
    "delete from xt.dict where dict_id in (select dict_id from xt.dict inner join xt.ext on dict_ext_id = ext_id where ext_name = $1);",
    "delete from xt.extdep where extdep_id in (select extdep_id from xt.extdep inner join xt.ext on extdep_from_ext_id = ext_id or extdep_to_ext_id = ext_id where ext_name = $1);",
    "delete from xt.ext where ext_name = $1;",
];

/// Bare extension name from an extension path: its last segment, ignoring a trailing `/`
pub fn extension_name(path: &str) -> Option<&str> {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
}

/// Removes an extension's rows from one or more databases
#[derive(Clone)]
pub struct ExtensionUnregisterer {
    client: Arc<dyn QueryClient>,
}

impl ExtensionUnregisterer {
    pub fn new(client: Arc<dyn QueryClient>) -> Self {
        Self { client }
    }

    /// Unregister the extension named by the first target's first extension
    /// path from every target database.
    ///
    /// Returns the extension name on success.
    pub async fn unregister(
        &self,
        targets: &[TargetSpec],
        creds: &ConnectionCredentials,
    ) -> Result<String> {
        let path = targets
            .first()
            .and_then(|t| t.extensions.first())
            .ok_or_else(|| Error::invalid_config("unregister needs at least one extension"))?;
        let name = extension_name(path)
            .ok_or_else(|| Error::invalid_config(format!("cannot name extension {:?}", path)))?
            .to_string();

        info!(
            "Unregistering extension {} from {} database(s)",
            name,
            targets.len()
        );

        let name_ref = name.as_str();
        let outcomes = each_independent(targets, move |target| {
            let creds = creds.for_database(&target.database);
            async move { self.unregister_one(name_ref, &creds).await }
        })
        .await;

        let failures: Vec<String> = targets
            .iter()
            .zip(outcomes)
            .filter_map(|(target, outcome)| {
                outcome.err().map(|e| {
                    error!("Cannot unregister {} from {}: {}", name, target.database, e);
                    format!("{}: {}", target.database, e)
                })
            })
            .collect();

        if failures.is_empty() {
            Ok(name)
        } else {
            Err(Error::UnregisterFailed {
                extension: name,
                failures,
            })
        }
    }

    async fn unregister_one(&self, name: &str, creds: &ConnectionCredentials) -> Result<()> {
        let params = [name.to_string()];
        let params = &params[..];
        map_series(UNREGISTER_STATEMENTS, move |sql| async move {
            self.client.execute(sql, params, creds).await
        })
        .await?;
        info!("Unregistered {} from {}", name, creds.database);
        Ok(())
    }
}
