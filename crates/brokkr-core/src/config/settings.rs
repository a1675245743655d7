//! Configuration file sections and their defaults

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::types::ConnectionCredentials;

/// psql's default output buffer is 200 KiB; bundles of hundreds of scripts need far more
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 40000 * 1024;

/// Root of brokkr.yaml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokkrConfigFile {
    pub connection: ConnectionCredentials,
    pub layout: LayoutConfig,
    pub client: ClientConfig,
    pub compile: CompileConfig,
}

/// Source tree conventions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Manifest location relative to an extension root
    pub manifest_path: Utf8PathBuf,

    /// Descriptor file name inside an extension root
    pub descriptor_file: String,

    /// Manifest file name inside a database source directory
    pub manifest_file: String,

    /// Frozen manifest file name
    pub frozen_manifest_file: String,

    /// Directory name that marks a foundation source tree
    pub foundation_dir: String,

    /// Foundation directory relative to an extension's database source directory
    pub foundation_relative: Utf8PathBuf,

    /// View wipe script, relative to the working directory
    pub wipe_views_script: Utf8PathBuf,

    /// Schema file applied before a source file, looked up next to it
    pub schema_file: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            manifest_path: Utf8PathBuf::from("database/source/manifest.js"),
            descriptor_file: "package.json".to_string(),
            manifest_file: "manifest.js".to_string(),
            frozen_manifest_file: "frozen_manifest.js".to_string(),
            foundation_dir: "foundation-database".to_string(),
            foundation_relative: Utf8PathBuf::from("../../foundation-database"),
            wipe_views_script: Utf8PathBuf::from(
                "enyo-client/database/source/delete_system_orms.sql",
            ),
            schema_file: "440_schema.sql".to_string(),
        }
    }
}

/// What to do when a backup restore exits with an error
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestoreFailurePolicy {
    /// Log and continue to introspection
    #[default]
    Ignore,
    /// Abort the lifecycle
    Fail,
}

/// External client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub psql: String,
    pub pg_restore: String,

    /// Largest stdout/stderr a child may produce before it is killed
    pub max_output_bytes: usize,

    /// Parallel restore jobs; defaults to available processing units
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restore_jobs: Option<usize>,

    /// Directory for temporary SQL artifacts; defaults to the system temp dir
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<Utf8PathBuf>,

    /// Database drop/create statements run against
    pub maintenance_database: String,

    /// Template for newly created databases
    pub template_database: String,

    pub restore_failure: RestoreFailurePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            psql: "psql".to_string(),
            pg_restore: "pg_restore".to_string(),
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            restore_jobs: None,
            temp_dir: None,
            maintenance_database: "postgres".to_string(),
            template_database: "template1".to_string(),
            restore_failure: RestoreFailurePolicy::default(),
        }
    }
}

/// What to do with a compiled script that lacks a trailing `;`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerminatorPolicy {
    /// Fail the composition
    #[default]
    Enforce,
    /// Log the error and keep the fragment
    WarnOnly,
}

/// Script compilation settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    pub terminator_policy: TerminatorPolicy,
}
