//! Provision command

use anyhow::{Context, Result};
use brokkr_core::types::BuildSpec;
use camino::Utf8Path;

use super::{credentials, load_config, provisioner, psql_client};
use crate::cli::ProvisionArgs;
use crate::output;

pub async fn run(args: ProvisionArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let creds = credentials(&config, &args.connection, None);

    let mut spec = BuildSpec {
        database: args.database.clone(),
        source: args.source.as_deref().map(|p| config.resolve_path(p)),
        backup: args.backup.as_deref().map(|p| config.resolve_path(p)),
        extensions: Vec::new(),
    };

    let pb = output::spinner(&format!("Provisioning database {}", spec.database));
    let result = provisioner(&config, psql_client(&config))
        .provision(&mut spec, &creds)
        .await;
    pb.finish_and_clear();
    result.with_context(|| format!("Failed to provision database {}", spec.database))?;

    output::success(&format!("Provisioned database {}", spec.database));
    if spec.backup.is_some() {
        output::header("Installed extensions");
        for extension in &spec.extensions {
            output::kv("extension", extension);
        }
    }
    Ok(())
}
