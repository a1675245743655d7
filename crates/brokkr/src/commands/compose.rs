//! Compose command

use anyhow::{Context, Result};
use camino::Utf8Path;

use super::{compose_extension, composer, load_config, resolve_extension_root};
use crate::cli::ComposeArgs;
use crate::output;

pub async fn run(args: ComposeArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let root = resolve_extension_root(&config, &args.extension);
    let composer = composer(&config);

    let sql = compose_extension(
        &composer,
        &root,
        args.manifest.as_deref(),
        &args.extension_args,
        args.register,
    )
    .await?;

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, &sql)
                .await
                .with_context(|| format!("Failed to write {}", path))?;
            output::success(&format!("Wrote {} bytes to {}", sql.len(), path));
        }
        None => print!("{}", sql),
    }
    Ok(())
}
