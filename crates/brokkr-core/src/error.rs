//! Error types for Brokkr

use thiserror::Error;

/// Result type alias using brokkr-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for Brokkr
#[derive(Error, Debug)]
pub enum Error {
    /// Neither a manifest nor an extension descriptor could be found
    #[error("Cannot find manifest {path}")]
    ManifestNotFound { path: String },

    /// Manifest content is not valid structured data
    #[error("Manifest is not valid JSON {path}: {message}")]
    ManifestParse { path: String, message: String },

    /// Script referenced by a manifest is missing
    #[error("{path} does not exist")]
    ScriptNotFound { path: String },

    /// Script exists but could not be read
    #[error("Cannot read script {path}: {source}")]
    ScriptRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Compiled script does not end with a statement terminator
    #[error("Error: {path} contents do not end in a semicolon.")]
    ScriptFormat { path: String },

    /// The view-wipe script could not be read
    #[error("Cannot read view wipe script {path}: {source}")]
    WipeScriptRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// External process failed to start, exited non-zero or overflowed its output buffer
    #[error("{program} failed ({reason}){}", format_stderr(.stderr))]
    ProcessExecution {
        program: String,
        reason: String,
        stderr: String,
    },

    /// Temporary SQL artifact could not be written
    #[error("Cannot write query to file {path}: {source}")]
    TempArtifactWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Temporary SQL artifact could not be deleted
    #[error("Cannot delete written query file {path}: {source}")]
    TempArtifactDelete {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Registration requested but neither descriptor nor manifest names the extension
    #[error("Cannot register extension at {location}: no descriptor names it")]
    UnnamedExtension { location: String },

    /// No content transform registered for a script's file extension
    #[error("No transform registered for '.{extension}' files: {path}")]
    UnsupportedFormat { path: String, extension: String },

    /// A content transform rejected its input
    #[error("Cannot convert {path}: {message}")]
    TransformFailed { path: String, message: String },

    /// Build spec names both or neither of source and backup
    #[error("Invalid build spec for database {database}: {message}")]
    InvalidBuildSpec { database: String, message: String },

    /// Database name is not a plain SQL identifier
    #[error("Invalid database name: {name}")]
    InvalidDatabaseName { name: String },

    /// Query against the database failed
    #[error("Query against database {database} failed: {message}")]
    Query { database: String, message: String },

    /// One or more databases failed to unregister an extension
    #[error("Failed to unregister extension {extension} from: {}", .failures.join("; "))]
    UnregisterFailed {
        extension: String,
        failures: Vec<String>,
    },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}

impl Error {
    /// Create a manifest not found error
    pub fn manifest_not_found(path: impl Into<String>) -> Self {
        Self::ManifestNotFound { path: path.into() }
    }

    /// Create a manifest parse error
    pub fn manifest_parse(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ManifestParse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a script not found error
    pub fn script_not_found(path: impl Into<String>) -> Self {
        Self::ScriptNotFound { path: path.into() }
    }

    /// Create a script format error
    pub fn script_format(path: impl Into<String>) -> Self {
        Self::ScriptFormat { path: path.into() }
    }

    /// Create a process execution error
    pub fn process(
        program: impl Into<String>,
        reason: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::ProcessExecution {
            program: program.into(),
            reason: reason.into(),
            stderr: stderr.into(),
        }
    }

    /// Create an unsupported format error
    pub fn unsupported_format(path: impl Into<String>, extension: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            path: path.into(),
            extension: extension.into(),
        }
    }

    /// Create a transform failure error
    pub fn transform_failed(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransformFailed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid build spec error
    pub fn invalid_build_spec(database: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidBuildSpec {
            database: database.into(),
            message: message.into(),
        }
    }

    /// Create a query error
    pub fn query(database: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Query {
            database: database.into(),
            message: message.into(),
        }
    }

    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Whether this error came from an external process invocation
    pub fn is_process_failure(&self) -> bool {
        matches!(self, Self::ProcessExecution { .. })
    }
}
