//! Databricks SQL warehouse connector.
//!
//! Statements run through the SQL Statement Execution REST API
//! (`POST /api/2.0/sql/statements`) with inline `JSON_ARRAY` results and a
//! bearer access token. The warehouse id is the last segment of the
//! warehouse's HTTP path, e.g. `/sql/1.0/warehouses/1234abcd`.

use super::statement::{StatementResult, decode_statement};
use super::{WarehouseConnector, show_tables_sql};
use crate::error::{CopilotError, Result};
use crate::types::Table;
use reqwest::blocking::{Client, RequestBuilder};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

/// Longest server-side wait the API accepts before answering.
const WAIT_TIMEOUT: &str = "50s";

/// Connection settings for one SQL warehouse.
#[derive(Debug, Clone)]
pub struct DatabricksConfig {
    /// Workspace hostname, with or without `https://`.
    pub server_hostname: String,
    /// Warehouse HTTP path; its last segment is the warehouse id.
    pub http_path: String,
    /// Request timeout in seconds. `None` leaves timing to the service.
    pub timeout_secs: Option<u64>,
}

impl DatabricksConfig {
    pub fn new(server_hostname: impl Into<String>, http_path: impl Into<String>) -> Self {
        Self {
            server_hostname: server_hostname.into(),
            http_path: http_path.into(),
            timeout_secs: None,
        }
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    /// Warehouse id taken from the HTTP path.
    pub fn warehouse_id(&self) -> Option<&str> {
        self.http_path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|id| !id.is_empty())
    }

    /// `https://<host>` without trailing slash.
    pub fn base_url(&self) -> String {
        let host = self.server_hostname.trim().trim_end_matches('/');
        if host.starts_with("https://") || host.starts_with("http://") {
            host.to_string()
        } else {
            format!("https://{host}")
        }
    }
}

#[derive(Debug, Serialize)]
struct StatementRequest<'a> {
    statement: &'a str,
    warehouse_id: &'a str,
    format: &'static str,
    disposition: &'static str,
    wait_timeout: &'static str,
}

/// Blocking connector for a Databricks SQL warehouse.
pub struct DatabricksConnector {
    config: DatabricksConfig,
    warehouse_id: String,
    access_token: String,
    client: Client,
}

impl DatabricksConnector {
    /// Create a connector.
    ///
    /// # Errors
    ///
    /// Returns [`CopilotError::Connection`] if the hostname or warehouse id
    /// is missing, or if the HTTP client cannot be created.
    pub fn new(config: DatabricksConfig, access_token: impl Into<String>) -> Result<Self> {
        if config.server_hostname.trim().is_empty() {
            return Err(CopilotError::Connection(
                "server hostname is required".to_string(),
            ));
        }
        let warehouse_id = config
            .warehouse_id()
            .ok_or_else(|| {
                CopilotError::Connection(format!(
                    "no warehouse id in HTTP path '{}'",
                    config.http_path
                ))
            })?
            .to_string();

        let client = Client::builder()
            .timeout(config.timeout_secs.map(Duration::from_secs))
            .build()
            .map_err(|e| CopilotError::Connection(format!("cannot create HTTP client: {e}")))?;

        Ok(Self {
            config,
            warehouse_id,
            access_token: access_token.into(),
            client,
        })
    }

    /// Run `sql` and collect every result chunk.
    pub fn execute(&self, sql: &str) -> Result<StatementResult> {
        debug!("Executing on warehouse {}: {}", self.warehouse_id, sql);

        let body = StatementRequest {
            statement: sql,
            warehouse_id: &self.warehouse_id,
            format: "JSON_ARRAY",
            disposition: "INLINE",
            wait_timeout: WAIT_TIMEOUT,
        };
        let request = self
            .client
            .post(format!("{}/api/2.0/sql/statements", self.config.base_url()))
            .json(&body);

        let mut result = decode_statement(&self.send(request)?)?;

        while let Some(link) = result.next_chunk.take() {
            let request = self
                .client
                .get(format!("{}{}", self.config.base_url(), link));
            result.extend_from_chunk(&self.send(request)?)?;
        }

        Ok(result)
    }

    fn send(&self, request: RequestBuilder) -> Result<String> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .map_err(|e| CopilotError::Connection(format!("warehouse unreachable: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| CopilotError::Connection(format!("unreadable response: {e}")))?;

        if !status.is_success() {
            return Err(CopilotError::Connection(format!(
                "warehouse returned {status}: {}",
                body.trim()
            )));
        }
        Ok(body)
    }
}

impl WarehouseConnector for DatabricksConnector {
    fn list_tables(&self, schema: &str) -> Result<Vec<String>> {
        let tables = self.execute(&show_tables_sql(schema))?.column_values(1);
        info!("Found {} tables in schema '{}'", tables.len(), schema);
        Ok(tables)
    }

    fn query(&self, sql: &str, name: &str) -> Result<Table> {
        self.execute(sql)?.into_table(name)
    }

    fn name(&self) -> &str {
        "Databricks SQL"
    }
}
