//! CLI command implementations

pub mod apply;
pub mod build;
pub mod compose;
pub mod provision;
pub mod unregister;

use anyhow::{Context, Result};
use brokkr_core::types::ConnectionCredentials;
use brokkr_core::BrokkrConfig;
use brokkr_database::{
    AdHocExecutor, DatabaseProvisioner, PgClient, ProvisionSettings, PsqlClient,
};
use brokkr_extensions::{
    ComposeOptions, ExtensionComposer, ManifestLayout, ManifestResolver, ResolveOptions,
    ScriptCompiler,
};
use camino::{Utf8Path, Utf8PathBuf};
use std::sync::Arc;

use crate::cli::{ConnectionArgs, ExtensionArgs};
use crate::output;

/// Directory names skipped when deriving a registration location
const LOCATION_SKIP: &[&str] = &["source", ".", ".."];

pub(crate) fn load_config(path: Option<&Utf8Path>) -> Result<BrokkrConfig> {
    BrokkrConfig::load(path).context("Failed to load configuration")
}

/// Connection credentials: config and environment, then CLI flags
pub(crate) fn credentials(
    config: &BrokkrConfig,
    args: &ConnectionArgs,
    database: Option<&str>,
) -> ConnectionCredentials {
    let mut creds = config.config.connection.clone();
    if let Some(username) = &args.username {
        creds.username = username.clone();
    }
    if let Some(hostname) = &args.hostname {
        creds.hostname = hostname.clone();
    }
    if let Some(port) = args.port {
        creds.port = port;
    }
    match database {
        Some(database) => creds.for_database(database),
        None => creds,
    }
}

pub(crate) fn composer(config: &BrokkrConfig) -> ExtensionComposer {
    ExtensionComposer::new(
        ManifestResolver::new(ManifestLayout::from(&config.config.layout)),
        ScriptCompiler::default().with_terminator_policy(config.config.compile.terminator_policy),
        config.wipe_views_script(),
    )
}

pub(crate) fn psql_client(config: &BrokkrConfig) -> Arc<PsqlClient> {
    let client = &config.config.client;
    for tool in [&client.psql, &client.pg_restore] {
        if which::which(tool).is_err() {
            output::warning(&format!("{} not found in PATH", tool));
        }
    }
    Arc::new(PsqlClient::from_config(client))
}

pub(crate) fn provisioner(config: &BrokkrConfig, scripts: Arc<PsqlClient>) -> DatabaseProvisioner {
    let pg = Arc::new(PgClient::new());
    DatabaseProvisioner::new(pg.clone(), scripts, pg)
        .with_settings(ProvisionSettings::from_config(&config.config))
}

pub(crate) fn adhoc_executor(config: &BrokkrConfig, scripts: Arc<PsqlClient>) -> AdHocExecutor {
    let executor = AdHocExecutor::new(scripts);
    match &config.config.client.temp_dir {
        Some(dir) => executor.with_temp_dir(config.resolve_path(dir)),
        None => executor,
    }
}

/// Extension root for a path given on the command line or read back from a database.
///
/// Existing paths are used as given; anything else is taken relative to the
/// working directory, with a leading `/` dropped.
pub(crate) fn resolve_extension_root(config: &BrokkrConfig, path: &Utf8Path) -> Utf8PathBuf {
    if path.exists() {
        return path.to_owned();
    }
    config
        .working_dir
        .join(path.as_str().trim_start_matches('/'))
}

/// Registration location derived from the directory an extension lives in,
/// e.g. `../private-extensions/source/inventory` gives `/private-extensions`
pub(crate) fn extension_location(root: &Utf8Path) -> String {
    let name = root
        .ancestors()
        .skip(1)
        .filter_map(|dir| dir.file_name())
        .find(|name| !LOCATION_SKIP.contains(name))
        .unwrap_or_default();
    format!("/{}", name)
}

/// Compose one extension's bundle
pub(crate) async fn compose_extension(
    composer: &ExtensionComposer,
    root: &Utf8Path,
    manifest: Option<&Utf8Path>,
    args: &ExtensionArgs,
    register: bool,
) -> Result<String> {
    let manifest_path = match manifest {
        Some(path) => path.to_owned(),
        None => composer.resolver().layout().manifest_path_for(root),
    };
    let resolve = ResolveOptions {
        extension_root: Some(root.to_owned()),
        use_foundation_scripts: args.foundation,
        use_frozen_scripts: args.frozen,
    };
    let options = ComposeOptions {
        register_extension: register,
        extension_location: args
            .location
            .clone()
            .unwrap_or_else(|| extension_location(root)),
        run_js_init: args.js_init,
        wipe_views: args.wipe_views,
    };

    composer
        .build_extension(&manifest_path, &resolve, &options)
        .await
        .with_context(|| format!("Failed to compose extension {}", root))
}
