use serde_json::{Map, Value};
use tracing::{debug, error};

use super::ServiceError;
use crate::config::DatabaseConfig;
use crate::error::FrameworkError;

/// One result row, column name → value.
pub type Row = Map<String, Value>;

/// Opens connections. Shared by all requests; called once per request.
pub trait DatabaseConnector: Send + Sync {
    fn connect(&self, config: Option<&DatabaseConfig>) -> Result<Box<dyn Connection>, ServiceError>;
}

/// A live connection owned by exactly one request.
pub trait Connection {
    fn fetch_one(&mut self, query: &str, params: &[Value]) -> Result<Option<Row>, ServiceError>;
    fn fetch_all(&mut self, query: &str, params: &[Value]) -> Result<Vec<Row>, ServiceError>;
    /// Returns the number of affected rows.
    fn execute(&mut self, query: &str, params: &[Value]) -> Result<u64, ServiceError>;
    /// Called exactly once when the owning handle is dropped.
    fn close(&mut self) {}
}

/// Per-request connection handle.
///
/// Query failures are logged and mapped to `None`, an empty `Vec` or `false`.
/// The connection is closed when the handle drops, whichever way the request
/// ends.
pub struct DatabaseHandle {
    conn: Box<dyn Connection>,
}

impl DatabaseHandle {
    /// Connect through `connector`.
    ///
    /// # Errors
    ///
    /// [`FrameworkError::ExternalService`] when the connection cannot be
    /// established. This is the one service failure that is not swallowed.
    pub fn acquire(
        connector: &dyn DatabaseConnector,
        config: Option<&DatabaseConfig>,
    ) -> Result<Self, FrameworkError> {
        match connector.connect(config) {
            Ok(conn) => {
                debug!("Database connection acquired");
                Ok(Self { conn })
            }
            Err(e) => {
                error!(error = %e, "Database connection failed");
                Err(FrameworkError::external(
                    "database",
                    format!("Could not establish database connection: {e}"),
                ))
            }
        }
    }

    pub fn fetch_one(&mut self, query: &str, params: &[Value]) -> Option<Row> {
        self.conn.fetch_one(query, params).unwrap_or_else(|e| {
            error!(error = %e, "Database fetch_one error");
            None
        })
    }

    pub fn fetch_all(&mut self, query: &str, params: &[Value]) -> Vec<Row> {
        self.conn.fetch_all(query, params).unwrap_or_else(|e| {
            error!(error = %e, "Database fetch_all error");
            Vec::new()
        })
    }

    pub fn execute(&mut self, query: &str, params: &[Value]) -> bool {
        match self.conn.execute(query, params) {
            Ok(_) => true,
            Err(e) => {
                error!(error = %e, "Database execute error");
                false
            }
        }
    }
}

impl Drop for DatabaseHandle {
    fn drop(&mut self) {
        self.conn.close();
        debug!("Database connection released");
    }
}
