//! In-memory connections for tests and embedders without a real backend.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{Connection, ConnectionResolver, Statement};
use crate::error::{MigrateError, Result};

/// Connection that records executed statements instead of reaching storage.
pub struct MemoryConnection {
    name: String,
    executed: Mutex<Vec<Statement>>,
    disconnects: AtomicUsize,
}

impl MemoryConnection {
    /// Create a named in-memory connection.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            executed: Mutex::new(Vec::new()),
            disconnects: AtomicUsize::new(0),
        }
    }

    /// Connection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Statements executed so far, in order.
    pub fn executed(&self) -> Vec<Statement> {
        self.executed
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .clone()
    }

    /// Number of times the handle was released.
    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connection for MemoryConnection {
    async fn execute(&self, statement: &Statement) -> Result<()> {
        let mut executed = self.executed.lock().unwrap_or_else(|err| err.into_inner());
        executed.push(statement.clone());
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Name-to-connection resolver with a mutable ambient default.
pub struct MemoryConnectionResolver {
    connections: Mutex<HashMap<String, Arc<MemoryConnection>>>,
    default: Mutex<String>,
}

impl MemoryConnectionResolver {
    /// Create a resolver whose ambient default is `default`, with that
    /// connection already registered.
    pub fn new(default: impl Into<String>) -> Self {
        let default = default.into();
        let resolver = Self {
            connections: Mutex::new(HashMap::new()),
            default: Mutex::new(default.clone()),
        };
        resolver.add(default);
        resolver
    }

    /// Register a connection under `name`, returning the handle.
    pub fn add(&self, name: impl Into<String>) -> Arc<MemoryConnection> {
        let name = name.into();
        let connection = Arc::new(MemoryConnection::new(name.clone()));
        self.connections
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .insert(name, Arc::clone(&connection));
        connection
    }

    /// Handle for a registered connection.
    pub fn get(&self, name: &str) -> Option<Arc<MemoryConnection>> {
        self.connections
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .get(name)
            .cloned()
    }
}

#[async_trait]
impl ConnectionResolver for MemoryConnectionResolver {
    async fn connection(&self, name: Option<&str>) -> Result<Arc<dyn Connection>> {
        let name = match name {
            Some(name) => name.to_string(),
            None => self.default_connection(),
        };

        self.get(&name)
            .map(|connection| connection as Arc<dyn Connection>)
            .ok_or(MigrateError::UnknownConnection(name))
    }

    fn default_connection(&self) -> String {
        self.default
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .clone()
    }

    fn set_default_connection(&self, name: &str) {
        let mut default = self.default.lock().unwrap_or_else(|err| err.into_inner());
        *default = name.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_none_resolves_the_ambient_default() {
        let resolver = MemoryConnectionResolver::new("default");
        let connection = resolver.connection(None).await.unwrap();

        connection
            .execute(&Statement::new("SELECT 1"))
            .await
            .unwrap();
        assert_eq!(
            resolver.get("default").unwrap().executed(),
            vec![Statement::new("SELECT 1")]
        );
    }

    #[tokio::test]
    async fn test_unknown_name_errors() {
        let resolver = MemoryConnectionResolver::new("default");

        match resolver.connection(Some("missing")).await {
            Err(MigrateError::UnknownConnection(name)) => assert_eq!(name, "missing"),
            other => panic!("expected unknown connection, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_default_follows_set_default_connection() {
        let resolver = MemoryConnectionResolver::new("default");
        let tenant = resolver.add("tenant_a");

        resolver.set_default_connection("tenant_a");
        let connection = resolver.connection(None).await.unwrap();
        connection
            .execute(&Statement::new("SELECT 1"))
            .await
            .unwrap();

        assert_eq!(tenant.executed(), vec![Statement::new("SELECT 1")]);
        assert!(resolver.get("default").unwrap().executed().is_empty());
    }

    #[tokio::test]
    async fn test_disconnects_are_counted() {
        let connection = MemoryConnection::new("default");
        connection.disconnect().await.unwrap();
        connection.disconnect().await.unwrap();
        assert_eq!(connection.disconnects(), 2);
    }
}
