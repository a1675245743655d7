//! Common test utilities for brokkr-database

#![allow(dead_code)]

pub mod mocks;

use brokkr_core::types::ConnectionCredentials;

pub use mocks::*;

/// Credentials for a database that tests never actually reach
pub fn test_creds(database: &str) -> ConnectionCredentials {
    ConnectionCredentials {
        username: "admin".to_string(),
        hostname: "localhost".to_string(),
        port: 5432,
        database: database.to_string(),
        password: None,
    }
}
