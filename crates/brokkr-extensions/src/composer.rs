//! Extension SQL composition
//!
//! Drives resolution and compilation over an extension's manifest and joins
//! the fragments into one bundle. Optional preambles are stacked in front of
//! the bundle, giving this final order:
//!
//! 1. view wipe script (`wipe_views`)
//! 2. `xt.js_init()` call (`run_js_init`)
//! 3. registration SQL (`register_extension`)
//! 4. compiled scripts, in manifest order

use brokkr_core::types::ExtensionDescriptor;
use brokkr_core::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info};

use crate::compiler::ScriptCompiler;
use crate::registration::RegistrationSqlBuilder;
use crate::resolver::{ManifestResolver, ResolveOptions};

/// One-time initializer call. Omitted for the extension that defines it.
pub const JS_INIT_SQL: &str = "select xt.js_init();\n";

/// Preambles to add in front of an extension's scripts
#[derive(Debug, Clone, Default)]
pub struct ComposeOptions {
    /// Prepend registration SQL for the extension and its dependencies
    pub register_extension: bool,

    /// Location the extension is registered under
    pub extension_location: String,

    /// Prepend the `xt.js_init()` call
    pub run_js_init: bool,

    /// Prepend the view wipe script
    pub wipe_views: bool,
}

/// Builds the SQL bundle for an extension
#[derive(Clone)]
pub struct ExtensionComposer {
    resolver: ManifestResolver,
    compiler: ScriptCompiler,
    registration: RegistrationSqlBuilder,
    wipe_views_script: Utf8PathBuf,
}

impl ExtensionComposer {
    pub fn new(
        resolver: ManifestResolver,
        compiler: ScriptCompiler,
        wipe_views_script: impl Into<Utf8PathBuf>,
    ) -> Self {
        Self {
            resolver,
            compiler,
            registration: RegistrationSqlBuilder::new(),
            wipe_views_script: wipe_views_script.into(),
        }
    }

    pub fn resolver(&self) -> &ManifestResolver {
        &self.resolver
    }

    /// Resolve, compile and compose the extension described by `manifest_path`
    pub async fn build_extension(
        &self,
        manifest_path: &Utf8Path,
        resolve: &ResolveOptions,
        options: &ComposeOptions,
    ) -> Result<String> {
        info!("Composing extension SQL from {}", manifest_path);
        let resolved = self.resolver.resolve(manifest_path, resolve).await?;
        let fragments = self.compiler.compile_all(&resolved).await?;
        self.compose(&fragments, resolved.descriptor.as_ref(), options)
            .await
    }

    /// Join compiled fragments and stack the requested preambles in front
    pub async fn compose(
        &self,
        fragments: &[String],
        descriptor: Option<&ExtensionDescriptor>,
        options: &ComposeOptions,
    ) -> Result<String> {
        let mut sql = fragments.concat();

        if options.register_extension {
            let descriptor = descriptor
                .cloned()
                .ok_or_else(|| Error::UnnamedExtension {
                    location: options.extension_location.clone(),
                })?
                .with_location(&options.extension_location);
            debug!("Registering extension {}", descriptor.name);
            sql.insert_str(0, &self.registration.build(&descriptor));
        }

        if options.run_js_init {
            sql.insert_str(0, JS_INIT_SQL);
        }

        if options.wipe_views {
            let wipe_sql = tokio::fs::read_to_string(&self.wipe_views_script)
                .await
                .map_err(|source| Error::WipeScriptRead {
                    path: self.wipe_views_script.to_string(),
                    source,
                })?;
            sql.insert_str(0, &wipe_sql);
        }

        Ok(sql)
    }
}
