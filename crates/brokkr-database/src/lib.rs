//! Brokkr database operations
//!
//! This crate provides:
//! - Client abstractions for the external database tooling
//! - Process-backed (`psql`, `pg_restore`) and `tokio-postgres` clients
//! - Whole-database provisioning from source or backup
//! - Ad-hoc SQL application through a temporary file
//! - Extension removal across databases

pub mod adhoc;
pub mod client;
pub mod postgres;
pub mod process;
pub mod provisioner;
pub mod psql;
pub mod unregister;

pub use adhoc::{AdHocExecutor, ApplyOptions};
pub use client::{ExtensionInspector, QueryClient, ScriptClient};
pub use postgres::PgClient;
pub use provisioner::{DatabaseProvisioner, ProvisionSettings};
pub use psql::PsqlClient;
pub use unregister::{extension_name, ExtensionUnregisterer, UNREGISTER_STATEMENTS};
