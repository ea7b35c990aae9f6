//! Storage connections and the scoped default-connection switch.

mod capture;
mod memory;

pub use capture::CapturingConnection;
pub use memory::{MemoryConnection, MemoryConnectionResolver};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::error::{MigrateError, Result};

/// A single raw storage statement with optional bound parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// Raw statement text.
    pub sql: String,

    /// Bound parameters, in placeholder order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<Value>,
}

impl Statement {
    /// Create a statement with no bound parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            bindings: Vec::new(),
        }
    }

    /// Create a statement with bound parameters.
    pub fn with_bindings(sql: impl Into<String>, bindings: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            bindings,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Statement-execution capability of a connection.
///
/// Live connections transmit statements to the backing store; a
/// [`CapturingConnection`] implements the same capability but records
/// instead, so migration code cannot tell which one it was handed.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Execute a single statement against the backing store.
    async fn execute(&self, statement: &Statement) -> Result<()>;

    /// Release the underlying handle.
    async fn disconnect(&self) -> Result<()>;
}

/// Maps connection names to live connections and tracks the ambient default.
#[async_trait]
pub trait ConnectionResolver: Send + Sync {
    /// Resolve a connection by name; `None` resolves the ambient default.
    async fn connection(&self, name: Option<&str>) -> Result<Arc<dyn Connection>>;

    /// Name of the ambient default connection.
    fn default_connection(&self) -> String;

    /// Replace the ambient default connection name.
    fn set_default_connection(&self, name: &str);
}

/// Record of a default-connection switch awaiting restoration.
///
/// Produced by [`ConnectionSwitch::acquire`] and handed back to
/// [`ConnectionSwitch::release`] once the guarded operation has settled, on
/// success and error paths alike. The pair is the only place the crate
/// mutates the ambient default.
#[derive(Debug)]
pub(crate) struct ConnectionSwitch {
    switched: Option<Switched>,
}

#[derive(Debug)]
struct Switched {
    connection: String,
    previous: String,
}

impl ConnectionSwitch {
    /// Point the resolver's default at `name`, remembering the previous
    /// default. An empty or absent name performs no mutation.
    pub(crate) fn acquire(resolver: &dyn ConnectionResolver, name: Option<&str>) -> Self {
        let switched = match name {
            Some(name) if !name.is_empty() => {
                let previous = resolver.default_connection();
                resolver.set_default_connection(name);
                debug!(connection = name, previous = %previous, "switched default connection");
                Some(Switched {
                    connection: name.to_string(),
                    previous,
                })
            }
            _ => None,
        };

        Self { switched }
    }

    /// Disconnect the temporary connection and restore the previous default.
    ///
    /// The default name is restored even when the disconnect fails; the
    /// failure then surfaces as [`MigrateError::ConnectionRestore`].
    pub(crate) async fn release(self, resolver: &dyn ConnectionResolver) -> Result<()> {
        let Some(switched) = self.switched else {
            return Ok(());
        };

        let disconnected = match resolver.connection(Some(&switched.connection)).await {
            Ok(connection) => connection.disconnect().await,
            Err(err) => Err(err),
        };

        resolver.set_default_connection(&switched.previous);
        debug!(connection = %switched.previous, "restored default connection");

        disconnected.map_err(|source| MigrateError::ConnectionRestore {
            connection: switched.connection,
            source: Box::new(source),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_display_is_raw_sql() {
        let statement = Statement::new("SELECT * FROM foobar");
        assert_eq!(statement.to_string(), "SELECT * FROM foobar");
    }

    #[test]
    fn test_statement_serde_skips_empty_bindings() {
        let json = serde_json::to_string(&Statement::new("DROP TABLE t")).unwrap();
        assert_eq!(json, r#"{"sql":"DROP TABLE t"}"#);

        let bound = Statement::with_bindings("DELETE FROM t WHERE id = ?", vec![10.into()]);
        let json = serde_json::to_string(&bound).unwrap();
        assert_eq!(json, r#"{"sql":"DELETE FROM t WHERE id = ?","bindings":[10]}"#);
    }

    #[tokio::test]
    async fn test_switch_sets_and_release_restores_default() {
        let resolver = MemoryConnectionResolver::new("default");
        let tenant = resolver.add("tenant_a");

        let switch = ConnectionSwitch::acquire(&resolver, Some("tenant_a"));
        assert_eq!(resolver.default_connection(), "tenant_a");

        switch.release(&resolver).await.unwrap();
        assert_eq!(resolver.default_connection(), "default");
        assert_eq!(tenant.disconnects(), 1);
    }

    #[tokio::test]
    async fn test_absent_name_is_a_no_op() {
        let resolver = MemoryConnectionResolver::new("default");

        let switch = ConnectionSwitch::acquire(&resolver, None);
        assert_eq!(resolver.default_connection(), "default");
        switch.release(&resolver).await.unwrap();

        let switch = ConnectionSwitch::acquire(&resolver, Some(""));
        assert_eq!(resolver.default_connection(), "default");
        switch.release(&resolver).await.unwrap();
    }

    #[tokio::test]
    async fn test_default_is_restored_even_when_disconnect_fails() {
        let resolver = MemoryConnectionResolver::new("default");

        // Switching to an unregistered name makes the disconnect fail on
        // release; the default must come back regardless.
        let switch = ConnectionSwitch::acquire(&resolver, Some("missing"));
        assert_eq!(resolver.default_connection(), "missing");

        let err = switch.release(&resolver).await.unwrap_err();
        assert_eq!(resolver.default_connection(), "default");
        assert!(matches!(err, MigrateError::ConnectionRestore { .. }));
    }
}
