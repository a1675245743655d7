//! Manifest resolution
//!
//! Turns an extension's manifest into one ordered list of script paths.
//! Two optional parent manifests can be included ahead of the extension's own
//! scripts:
//!
//! - **foundation**: the shared base manifest of the extension's source tree
//! - **frozen**: one-time setup scripts that are not idempotent. Callers only
//!   request these when registering an extension for the first time.
//!
//! Inclusion is bounded to these two manifests; parent manifests are never
//! resolved recursively.

use brokkr_core::config::LayoutConfig;
use brokkr_core::types::{ExtensionDescriptor, Manifest};
use brokkr_core::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info};

/// Directory and file naming conventions of an extension source tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestLayout {
    /// Manifest location relative to an extension root
    pub extension_manifest: Utf8PathBuf,

    /// Descriptor file name inside an extension root
    pub descriptor_file: String,

    /// Manifest file name inside a database source directory
    pub manifest_file: String,

    /// Frozen manifest file name
    pub frozen_manifest_file: String,

    /// Directory name marking a foundation source tree
    pub foundation_dir: String,

    /// Foundation directory relative to a database source directory
    pub foundation_relative: Utf8PathBuf,
}

impl Default for ManifestLayout {
    fn default() -> Self {
        Self::from(&LayoutConfig::default())
    }
}

impl From<&LayoutConfig> for ManifestLayout {
    fn from(config: &LayoutConfig) -> Self {
        Self {
            extension_manifest: config.manifest_path.clone(),
            descriptor_file: config.descriptor_file.clone(),
            manifest_file: config.manifest_file.clone(),
            frozen_manifest_file: config.frozen_manifest_file.clone(),
            foundation_dir: config.foundation_dir.clone(),
            foundation_relative: config.foundation_relative.clone(),
        }
    }
}

impl ManifestLayout {
    /// Manifest path for an extension root directory
    pub fn manifest_path_for(&self, extension_root: &Utf8Path) -> Utf8PathBuf {
        extension_root.join(&self.extension_manifest)
    }

    /// Whether a source directory already lives inside a foundation tree
    fn is_foundation_tree(&self, source_root: &Utf8Path) -> bool {
        source_root
            .components()
            .any(|c| c.as_str() == self.foundation_dir)
    }
}

/// Options for [`ManifestResolver::resolve`]
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Extension root holding the descriptor file
    pub extension_root: Option<Utf8PathBuf>,

    /// Prepend the foundation manifest's scripts
    pub use_foundation_scripts: bool,

    /// Prepend the frozen manifest's scripts
    pub use_frozen_scripts: bool,
}

/// Result of resolving a manifest
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedManifest {
    /// Directory script paths are relative to
    pub source_root: Utf8PathBuf,

    /// Script paths in application order, relative to `source_root`
    pub scripts: Vec<Utf8PathBuf>,

    /// Effective default schema
    pub default_schema: Option<String>,

    /// Descriptor from the descriptor file, else from the manifest itself
    pub descriptor: Option<ExtensionDescriptor>,
}

impl ResolvedManifest {
    /// Script paths joined onto the source root
    pub fn full_paths(&self) -> Vec<Utf8PathBuf> {
        self.scripts
            .iter()
            .map(|script| self.source_root.join(script))
            .collect()
    }
}

/// Resolves manifests into ordered script lists
#[derive(Debug, Clone, Default)]
pub struct ManifestResolver {
    layout: ManifestLayout,
}

impl ManifestResolver {
    pub fn new(layout: ManifestLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &ManifestLayout {
        &self.layout
    }

    /// Resolve `manifest_path` into an ordered script list and default schema
    pub async fn resolve(
        &self,
        manifest_path: &Utf8Path,
        options: &ResolveOptions,
    ) -> Result<ResolvedManifest> {
        let source_root = manifest_path
            .parent()
            .map(|p| p.to_owned())
            .unwrap_or_else(|| Utf8PathBuf::from("."));

        let descriptor = match &options.extension_root {
            Some(root) => self.load_descriptor(root).await?,
            None => None,
        };

        if !tokio::fs::try_exists(manifest_path).await? {
            return match descriptor {
                Some(descriptor) => {
                    info!(
                        "No manifest file {}. There is probably no db-side code in the extension.",
                        manifest_path
                    );
                    Ok(ResolvedManifest {
                        source_root,
                        scripts: Vec::new(),
                        default_schema: None,
                        descriptor: Some(descriptor),
                    })
                }
                None => Err(Error::manifest_not_found(manifest_path.as_str())),
            };
        }

        let manifest = load_manifest(manifest_path).await?;
        let mut default_schema = manifest.default_schema.clone();
        let mut scripts: Vec<Utf8PathBuf> = manifest
            .flattened_scripts()
            .into_iter()
            .map(Utf8PathBuf::from)
            .collect();

        let foundation_root = source_root.join(&self.layout.foundation_relative);
        let rewrite_frozen = !self.layout.is_foundation_tree(&source_root);

        if options.use_foundation_scripts {
            let path = foundation_root.join(&self.layout.manifest_file);
            let foundation = load_manifest(&path).await?;
            default_schema = default_schema.or(foundation.default_schema.clone());
            let mut included = self.rebase(&foundation, true);
            debug!("Including {} foundation scripts from {}", included.len(), path);
            included.append(&mut scripts);
            scripts = included;
        }

        if options.use_frozen_scripts {
            let path = if rewrite_frozen {
                foundation_root.join(&self.layout.frozen_manifest_file)
            } else {
                source_root.join(&self.layout.frozen_manifest_file)
            };
            let frozen = load_manifest(&path).await?;
            default_schema = default_schema.or(frozen.default_schema.clone());
            let mut included = self.rebase(&frozen, rewrite_frozen);
            debug!("Including {} frozen scripts from {}", included.len(), path);
            included.append(&mut scripts);
            scripts = included;
        }

        debug!(
            "Resolved {} scripts from {} (default schema: {})",
            scripts.len(),
            manifest_path,
            default_schema.as_deref().unwrap_or("none")
        );

        Ok(ResolvedManifest {
            source_root,
            scripts,
            default_schema,
            descriptor: descriptor.or_else(|| manifest.descriptor()),
        })
    }

    /// Flatten a parent manifest, optionally rewriting its paths to be
    /// relative to the foundation directory
    fn rebase(&self, manifest: &Manifest, relative_to_foundation: bool) -> Vec<Utf8PathBuf> {
        manifest
            .flattened_scripts()
            .into_iter()
            .map(|script| {
                if relative_to_foundation {
                    self.layout.foundation_relative.join(script)
                } else {
                    Utf8PathBuf::from(script)
                }
            })
            .collect()
    }

    async fn load_descriptor(&self, extension_root: &Utf8Path) -> Result<Option<ExtensionDescriptor>> {
        let path = extension_root.join(&self.layout.descriptor_file);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(None);
        }
        let content = tokio::fs::read_to_string(&path).await?;
        let descriptor = serde_json::from_str(&content)
            .map_err(|e| Error::manifest_parse(path.as_str(), e.to_string()))?;
        Ok(Some(descriptor))
    }
}

/// Read and parse one manifest file
pub async fn load_manifest(path: &Utf8Path) -> Result<Manifest> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::manifest_not_found(path.as_str())
        } else {
            Error::Io(e)
        }
    })?;
    serde_json::from_str(&content).map_err(|e| Error::manifest_parse(path.as_str(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Utf8Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn utf8(temp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap()
    }

    #[tokio::test]
    async fn test_plain_manifest() {
        let temp = TempDir::new().unwrap();
        let root = utf8(&temp);
        write(
            &root,
            "crm/database/source/manifest.js",
            r#"{"defaultSchema": "xt", "databaseScripts": ["a.sql", ["b.sql"]]}"#,
        );

        let resolver = ManifestResolver::default();
        let resolved = resolver
            .resolve(
                &root.join("crm/database/source/manifest.js"),
                &ResolveOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(resolved.scripts, vec![Utf8PathBuf::from("a.sql"), "b.sql".into()]);
        assert_eq!(resolved.default_schema.as_deref(), Some("xt"));
        assert_eq!(resolved.source_root, root.join("crm/database/source"));
        assert!(resolved.descriptor.is_none());
    }

    #[tokio::test]
    async fn test_missing_manifest_without_descriptor() {
        let temp = TempDir::new().unwrap();
        let root = utf8(&temp);

        let err = ManifestResolver::default()
            .resolve(
                &root.join("database/source/manifest.js"),
                &ResolveOptions {
                    extension_root: Some(root.clone()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ManifestNotFound { .. }));
    }

    #[tokio::test]
    async fn test_descriptor_only_extension() {
        let temp = TempDir::new().unwrap();
        let root = utf8(&temp);
        write(
            &root,
            "package.json",
            r#"{"name": "oauth2", "description": "OAuth", "dependencies": []}"#,
        );

        let resolved = ManifestResolver::default()
            .resolve(
                &root.join("database/source/manifest.js"),
                &ResolveOptions {
                    extension_root: Some(root.clone()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(resolved.scripts.is_empty());
        assert_eq!(resolved.descriptor.unwrap().name, "oauth2");
    }

    #[tokio::test]
    async fn test_invalid_manifest() {
        let temp = TempDir::new().unwrap();
        let root = utf8(&temp);
        write(&root, "source/manifest.js", "{ databaseScripts: [");

        let err = ManifestResolver::default()
            .resolve(&root.join("source/manifest.js"), &ResolveOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ManifestParse { .. }));
    }

    #[tokio::test]
    async fn test_frozen_inside_foundation_tree_is_not_rewritten() {
        let temp = TempDir::new().unwrap();
        let root = utf8(&temp);
        write(
            &root,
            "inventory/foundation-database/manifest.js",
            r#"{"databaseScripts": ["tables.sql"]}"#,
        );
        write(
            &root,
            "inventory/foundation-database/frozen_manifest.js",
            r#"{"defaultSchema": "xtmfg", "databaseScripts": ["seed.sql"]}"#,
        );

        let resolved = ManifestResolver::default()
            .resolve(
                &root.join("inventory/foundation-database/manifest.js"),
                &ResolveOptions {
                    use_frozen_scripts: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(
            resolved.scripts,
            vec![Utf8PathBuf::from("seed.sql"), "tables.sql".into()]
        );
        assert_eq!(resolved.default_schema.as_deref(), Some("xtmfg"));
    }

    #[test]
    fn test_manifest_path_for_extension() {
        let layout = ManifestLayout::default();
        assert_eq!(
            layout.manifest_path_for(Utf8Path::new("/src/crm")),
            Utf8PathBuf::from("/src/crm/database/source/manifest.js")
        );
    }
}
