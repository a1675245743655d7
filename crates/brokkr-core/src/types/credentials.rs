//! Database connection credentials

use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection parameters for the target database server
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionCredentials {
    pub username: String,
    pub hostname: String,
    pub port: u16,
    pub database: String,

    /// Optional password, handed to clients via `PGPASSWORD`
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

impl Default for ConnectionCredentials {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            hostname: "localhost".to_string(),
            port: 5432,
            database: "postgres".to_string(),
            password: None,
        }
    }
}

impl ConnectionCredentials {
    /// Copy of these credentials pointed at another database.
    ///
    /// The receiver is left untouched.
    pub fn for_database(&self, database: impl Into<String>) -> Self {
        let mut creds = self.clone();
        creds.database = database.into();
        creds
    }

    /// libpq style key/value connection string
    pub fn connection_string(&self) -> String {
        let mut conn = format!(
            "host={} port={} dbname={} user={}",
            self.hostname, self.port, self.database, self.username
        );
        if let Some(password) = &self.password {
            conn.push_str(&format!(" password={}", password));
        }
        conn
    }
}

impl fmt::Debug for ConnectionCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionCredentials")
            .field("username", &self.username)
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}
