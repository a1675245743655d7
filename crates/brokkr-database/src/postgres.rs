//! `tokio-postgres` backed query client and extension inspector

use async_trait::async_trait;
use brokkr_core::types::ConnectionCredentials;
use brokkr_core::{Error, Result};
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error};

use crate::client::{ExtensionInspector, QueryClient};

const INSTALLED_EXTENSIONS_SQL: &str =
    "select ext_location, ext_name from xt.ext order by ext_load_order, ext_name";

/// Opens one connection per call
#[derive(Debug, Clone, Copy, Default)]
pub struct PgClient;

impl PgClient {
    pub fn new() -> Self {
        Self
    }

    async fn connect(&self, creds: &ConnectionCredentials) -> Result<Client> {
        debug!(
            "Connecting to {}@{}:{}/{}",
            creds.username, creds.hostname, creds.port, creds.database
        );
        let (client, connection) = tokio_postgres::connect(&creds.connection_string(), NoTls)
            .await
            .map_err(|e| Error::query(&creds.database, e.to_string()))?;

        let database = creds.database.clone();
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("Database connection error on {}: {}", database, e);
            }
        });

        Ok(client)
    }
}

#[async_trait]
impl QueryClient for PgClient {
    async fn execute(
        &self,
        sql: &str,
        params: &[String],
        creds: &ConnectionCredentials,
    ) -> Result<u64> {
        let client = self.connect(creds).await?;

        if params.is_empty() {
            client
                .batch_execute(sql)
                .await
                .map_err(|e| Error::query(&creds.database, e.to_string()))?;
            return Ok(0);
        }

        let bound: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        client
            .execute(sql, &bound)
            .await
            .map_err(|e| Error::query(&creds.database, e.to_string()))
    }
}

#[async_trait]
impl ExtensionInspector for PgClient {
    async fn installed_extensions(&self, creds: &ConnectionCredentials) -> Result<Vec<String>> {
        let client = self.connect(creds).await?;
        let rows = client
            .query(INSTALLED_EXTENSIONS_SQL, &[])
            .await
            .map_err(|e| Error::query(&creds.database, e.to_string()))?;

        Ok(rows
            .iter()
            .map(|row| {
                let location: Option<String> = row.get(0);
                let name: String = row.get(1);
                extension_path(location.as_deref(), &name)
            })
            .collect())
    }
}

fn extension_path(location: Option<&str>, name: &str) -> String {
    match location.map(|l| l.trim_end_matches('/')) {
        Some(location) if !location.is_empty() => format!("{}/{}", location, name),
        _ => name.to_string(),
    }
}
