//! Apply command

use anyhow::{Context, Result};
use brokkr_database::ApplyOptions;
use camino::Utf8Path;

use super::{adhoc_executor, credentials, load_config, psql_client};
use crate::cli::ApplyArgs;
use crate::output;

pub async fn run(args: ApplyArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let creds = credentials(&config, &args.connection, args.database.as_deref());

    let sql = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file))?;

    let executor = adhoc_executor(&config, psql_client(&config));
    let kept = executor
        .apply(
            &sql,
            &creds,
            ApplyOptions {
                keep_sql: args.keep_sql,
            },
        )
        .await
        .with_context(|| format!("Failed to apply {} to {}", args.file, creds.database))?;

    output::success(&format!("Applied {} to {}", args.file, creds.database));
    if let Some(path) = kept {
        output::kv("sql", path.as_str());
    }
    Ok(())
}
