//! Configuration file loading
//!
//! Precedence (low to high):
//! 1. Built-in defaults
//! 2. brokkr.yaml (given explicitly or found by walking up from the working directory)
//! 3. Environment variables (BROKKR_* prefix)
//! 4. CLI flags (handled by caller)

use crate::config::BrokkrConfigFile;
use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::env;
use std::fs;
use tracing::debug;

/// Configuration file names to search for
const CONFIG_FILE_NAMES: &[&str] = &["brokkr.yaml", "brokkr.yml"];

/// Loaded Brokkr configuration
#[derive(Debug, Clone)]
pub struct BrokkrConfig {
    /// The parsed configuration
    pub config: BrokkrConfigFile,

    /// Path to the configuration file, if one was found
    pub config_path: Option<Utf8PathBuf>,

    /// Directory relative paths in the configuration resolve against
    pub working_dir: Utf8PathBuf,
}

impl BrokkrConfig {
    /// Load configuration from the specified path, or search for it.
    ///
    /// Falls back to defaults rooted at the current directory when no file is found.
    pub fn load(path: Option<&Utf8Path>) -> Result<Self> {
        let found = match path {
            Some(p) => {
                let content = fs::read_to_string(p).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        Error::config_not_found(p.as_str())
                    } else {
                        Error::Io(e)
                    }
                })?;
                Some((p.to_owned(), content))
            }
            None => Self::find_config(&Self::current_dir()?)?,
        };

        let mut loaded = match found {
            Some((config_path, content)) => {
                debug!("Loading configuration from {}", config_path);
                let config: BrokkrConfigFile = serde_yaml_ng::from_str(&content)?;
                let working_dir = config_path
                    .parent()
                    .filter(|p| !p.as_str().is_empty())
                    .map(|p| p.to_owned())
                    .unwrap_or_else(|| Utf8PathBuf::from("."));
                Self {
                    config,
                    config_path: Some(config_path),
                    working_dir,
                }
            }
            None => {
                debug!("No brokkr.yaml found, using defaults");
                Self {
                    config: BrokkrConfigFile::default(),
                    config_path: None,
                    working_dir: Self::current_dir()?,
                }
            }
        };

        loaded.apply_env_overrides()?;
        Ok(loaded)
    }

    fn current_dir() -> Result<Utf8PathBuf> {
        let cwd = env::current_dir().map_err(Error::Io)?;
        Utf8PathBuf::try_from(cwd)
            .map_err(|_| Error::invalid_config("Current directory path is not valid UTF-8"))
    }

    /// Find a configuration file in `start` or its parent directories
    fn find_config(start: &Utf8Path) -> Result<Option<(Utf8PathBuf, String)>> {
        let mut current = Some(start);
        while let Some(dir) = current {
            for name in CONFIG_FILE_NAMES {
                let path = dir.join(name);
                if path.exists() {
                    let content = fs::read_to_string(&path)?;
                    return Ok(Some((path, content)));
                }
            }
            current = dir.parent();
        }
        Ok(None)
    }

    /// Apply BROKKR_DB_* environment variable overrides to the connection section
    fn apply_env_overrides(&mut self) -> Result<()> {
        let connection = &mut self.config.connection;

        if let Ok(user) = env::var("BROKKR_DB_USER") {
            connection.username = user;
        }
        if let Ok(host) = env::var("BROKKR_DB_HOST") {
            connection.hostname = host;
        }
        if let Ok(port) = env::var("BROKKR_DB_PORT") {
            connection.port = port
                .parse()
                .map_err(|_| Error::invalid_config(format!("BROKKR_DB_PORT is not a port: {}", port)))?;
        }
        if let Ok(name) = env::var("BROKKR_DB_NAME") {
            connection.database = name;
        }
        if let Ok(password) = env::var("BROKKR_DB_PASSWORD") {
            connection.password = Some(password);
        }

        Ok(())
    }

    /// Resolve a configured path against the working directory
    pub fn resolve_path(&self, path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() {
            path.to_owned()
        } else {
            self.working_dir.join(path)
        }
    }

    /// Absolute location of the view wipe script
    pub fn wipe_views_script(&self) -> Utf8PathBuf {
        self.resolve_path(&self.config.layout.wipe_views_script)
    }
}
