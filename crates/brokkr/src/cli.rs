//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// Brokkr - build database extensions from manifests
#[derive(Parser, Debug)]
#[command(name = "brokkr")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to brokkr.yaml config file
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compose an extension's SQL bundle without touching a database
    Compose(ComposeArgs),

    /// Optionally rebuild databases, then install extensions into them
    Build(BuildArgs),

    /// Drop and recreate a database from source or backup
    Provision(ProvisionArgs),

    /// Apply a SQL file in a single transaction
    Apply(ApplyArgs),

    /// Remove an extension's registration from databases
    Unregister(UnregisterArgs),
}

/// Connection overrides on top of brokkr.yaml and BROKKR_DB_* variables
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Database user
    #[arg(short = 'U', long)]
    pub username: Option<String>,

    /// Database host
    #[arg(short = 'H', long)]
    pub hostname: Option<String>,

    /// Database port
    #[arg(short = 'p', long)]
    pub port: Option<u16>,
}

/// How an extension's scripts are gathered and wrapped
#[derive(Args, Debug, Clone, Default)]
pub struct ExtensionArgs {
    /// Prepend the foundation manifest's scripts
    #[arg(long)]
    pub foundation: bool,

    /// Prepend frozen scripts (first registration only)
    #[arg(short, long)]
    pub frozen: bool,

    /// Prepend the xt.js_init() call
    #[arg(long)]
    pub js_init: bool,

    /// Prepend the system view wipe script
    #[arg(long)]
    pub wipe_views: bool,

    /// Location the extension is registered under (default: derived from its path)
    #[arg(long)]
    pub location: Option<String>,
}

#[derive(Args, Debug)]
pub struct ComposeArgs {
    /// Extension root directory
    pub extension: Utf8PathBuf,

    /// Manifest path, if not at the configured location under the extension root
    #[arg(short, long)]
    pub manifest: Option<Utf8PathBuf>,

    /// Prepend registration SQL
    #[arg(short, long)]
    pub register: bool,

    #[command(flatten)]
    pub extension_args: ExtensionArgs,

    /// Write the bundle to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<Utf8PathBuf>,
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Target database (default: connection.database from config)
    #[arg(short, long)]
    pub database: Option<String>,

    /// Extension roots to install, in order
    #[arg(short, long = "extension")]
    pub extensions: Vec<Utf8PathBuf>,

    /// Rebuild the database from this schema and seed file first
    #[arg(short, long, conflicts_with = "backup")]
    pub source: Option<Utf8PathBuf>,

    /// Rebuild the database from this backup first
    #[arg(short, long)]
    pub backup: Option<Utf8PathBuf>,

    #[command(flatten)]
    pub extension_args: ExtensionArgs,

    /// Keep the temporary SQL file after applying it
    #[arg(short, long)]
    pub keep_sql: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Args, Debug)]
pub struct ProvisionArgs {
    /// Database to rebuild
    pub database: String,

    /// Schema and seed file
    #[arg(short, long, conflicts_with = "backup", required_unless_present = "backup")]
    pub source: Option<Utf8PathBuf>,

    /// Backup to restore
    #[arg(short, long)]
    pub backup: Option<Utf8PathBuf>,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// SQL file to apply
    pub file: Utf8PathBuf,

    /// Target database (default: connection.database from config)
    #[arg(short, long)]
    pub database: Option<String>,

    /// Keep the temporary SQL file after applying it
    #[arg(short, long)]
    pub keep_sql: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Args, Debug)]
pub struct UnregisterArgs {
    /// Extension path; its last segment is the extension name
    pub extension: String,

    /// Databases to remove the extension from
    #[arg(short, long = "database", required = true)]
    pub databases: Vec<String>,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}
