//! Build command
//!
//! Optionally rebuilds the target database, then composes every requested
//! extension with registration SQL and applies the combined bundle in one
//! transaction. After a restore, the extensions found in the restored
//! database replace the ones given on the command line.

use anyhow::{Context, Result};
use brokkr_core::types::BuildSpec;
use brokkr_database::ApplyOptions;
use camino::{Utf8Path, Utf8PathBuf};
use tracing::info;

use super::{
    adhoc_executor, compose_extension, composer, credentials, load_config, provisioner,
    psql_client, resolve_extension_root,
};
use crate::cli::BuildArgs;
use crate::output;

pub async fn run(args: BuildArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let creds = credentials(&config, &args.connection, args.database.as_deref());
    let scripts = psql_client(&config);

    let mut extensions: Vec<String> = args.extensions.iter().map(|p| p.to_string()).collect();

    if args.source.is_some() || args.backup.is_some() {
        let mut spec = BuildSpec {
            database: creds.database.clone(),
            source: args.source.as_deref().map(|p| config.resolve_path(p)),
            backup: args.backup.as_deref().map(|p| config.resolve_path(p)),
            extensions,
        };
        let pb = output::spinner(&format!("Provisioning database {}", spec.database));
        let result = provisioner(&config, scripts.clone())
            .provision(&mut spec, &creds)
            .await;
        pb.finish_and_clear();
        result.with_context(|| format!("Failed to provision database {}", spec.database))?;
        output::success(&format!("Provisioned database {}", spec.database));
        extensions = spec.extensions;
    }

    if extensions.is_empty() {
        output::info("No extensions to install");
        return Ok(());
    }

    let composer = composer(&config);
    let mut bundle = String::new();
    for extension in &extensions {
        let root = resolve_extension_root(&config, Utf8Path::new(extension));
        info!("Composing {}", root);
        let sql = compose_extension(&composer, &root, None, &args.extension_args, true).await?;
        bundle.push_str(&sql);
    }

    let pb = output::spinner(&format!(
        "Installing {} extension(s) into {}",
        extensions.len(),
        creds.database
    ));
    let result = adhoc_executor(&config, scripts)
        .apply(
            &bundle,
            &creds,
            ApplyOptions {
                keep_sql: args.keep_sql,
            },
        )
        .await;
    pb.finish_and_clear();
    let kept: Option<Utf8PathBuf> =
        result.with_context(|| format!("Failed to install extensions into {}", creds.database))?;

    output::success(&format!(
        "Installed {} extension(s) into {}",
        extensions.len(),
        creds.database
    ));
    if let Some(path) = kept {
        output::kv("sql", path.as_str());
    }
    Ok(())
}
