//! Script compilation
//!
//! Reads one script, runs it through the transform for its file extension and
//! checks that the result is a terminated statement block. Badly terminated
//! files make for unhelpful errors once hundreds of them are concatenated, so
//! they are caught here, per file.

use brokkr_core::config::TerminatorPolicy;
use brokkr_core::pipeline::map_series;
use brokkr_core::{Error, Result};
use camino::Utf8Path;
use tracing::{debug, error};

use crate::resolver::ResolvedManifest;
use crate::transform::TransformRegistry;

/// Notice raised by the database as each file starts to load
pub fn load_notice(path: &Utf8Path) -> String {
    format!(
        "do $$ BEGIN RAISE NOTICE 'Loading file {}'; END $$ language plpgsql;\n",
        path.file_name().unwrap_or(path.as_str())
    )
}

/// Compiles script files into SQL fragments
#[derive(Clone)]
pub struct ScriptCompiler {
    registry: TransformRegistry,
    terminator_policy: TerminatorPolicy,
}

impl Default for ScriptCompiler {
    fn default() -> Self {
        Self::new(TransformRegistry::with_defaults())
    }
}

impl ScriptCompiler {
    pub fn new(registry: TransformRegistry) -> Self {
        Self {
            registry,
            terminator_policy: TerminatorPolicy::default(),
        }
    }

    /// Set how a missing trailing `;` is treated
    pub fn with_terminator_policy(mut self, policy: TerminatorPolicy) -> Self {
        self.terminator_policy = policy;
        self
    }

    /// Compile one script into a fragment: a newline, the load notice, then the SQL
    pub async fn compile(&self, full_path: &Utf8Path, default_schema: Option<&str>) -> Result<String> {
        if !tokio::fs::try_exists(full_path).await.unwrap_or(false) {
            return Err(Error::script_not_found(full_path.as_str()));
        }

        let raw = tokio::fs::read_to_string(full_path)
            .await
            .map_err(|source| Error::ScriptRead {
                path: full_path.to_string(),
                source,
            })?;

        let compiled = self.registry.apply(&raw, full_path, default_schema)?;
        let compiled = compiled.trim();

        if !compiled.ends_with(';') {
            let err = Error::script_format(full_path.as_str());
            match self.terminator_policy {
                TerminatorPolicy::Enforce => return Err(err),
                TerminatorPolicy::WarnOnly => error!("{}", err),
            }
        }

        debug!("Compiled {} ({} bytes)", full_path, compiled.len());
        Ok(format!("\n{}{}", load_notice(full_path), compiled))
    }

    /// Compile every script of a resolved manifest, in order, stopping at the first failure
    pub async fn compile_all(&self, resolved: &ResolvedManifest) -> Result<Vec<String>> {
        let default_schema = resolved.default_schema.as_deref();
        map_series(resolved.full_paths(), |path| async move {
            self.compile(&path, default_schema).await
        })
        .await
    }
}
