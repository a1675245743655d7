//! Unregister command

use anyhow::{Context, Result};
use brokkr_core::types::TargetSpec;
use brokkr_database::{ExtensionUnregisterer, PgClient};
use camino::Utf8Path;
use std::sync::Arc;

use super::{credentials, load_config};
use crate::cli::UnregisterArgs;
use crate::output;

pub async fn run(args: UnregisterArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let creds = credentials(&config, &args.connection, None);

    let targets: Vec<TargetSpec> = args
        .databases
        .iter()
        .map(|database| TargetSpec::new(database, &args.extension))
        .collect();

    let name = ExtensionUnregisterer::new(Arc::new(PgClient::new()))
        .unregister(&targets, &creds)
        .await
        .with_context(|| format!("Failed to unregister {}", args.extension))?;

    output::success(&format!(
        "Unregistered {} from {}",
        name,
        args.databases.join(", ")
    ));
    Ok(())
}
