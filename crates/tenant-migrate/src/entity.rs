//! Tenant entities and keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique key identifying a tenant.
///
/// Keys are opaque comparable scalars; integer and text keys cover the
/// identifier shapes tenant models use in practice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TenantKey {
    Integer(i64),
    Text(String),
}

impl fmt::Display for TenantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TenantKey::Integer(key) => write!(f, "{}", key),
            TenantKey::Text(key) => f.write_str(key),
        }
    }
}

impl From<i64> for TenantKey {
    fn from(key: i64) -> Self {
        TenantKey::Integer(key)
    }
}

impl From<&str> for TenantKey {
    fn from(key: &str) -> Self {
        TenantKey::Text(key.to_owned())
    }
}

impl From<String> for TenantKey {
    fn from(key: String) -> Self {
        TenantKey::Text(key)
    }
}

/// The per-tenant subject a migration step is scoped to.
///
/// Supplied by the caller before a run; the executor holds it for the
/// duration of one run and never manages its lifecycle.
pub trait Tenant: Send + Sync {
    /// Unique key for this tenant.
    fn key(&self) -> TenantKey;

    /// Logical table name, used in progress output.
    fn table(&self) -> &str;

    /// Name of the connection this tenant's data lives on.
    ///
    /// `None` means the ambient default connection.
    fn connection(&self) -> Option<&str>;
}

/// Plain tenant entity for embedders without their own model type.
#[derive(Debug, Clone)]
pub struct TenantEntity {
    key: TenantKey,
    table: String,
    connection: Option<String>,
}

impl TenantEntity {
    /// Create an entity on the ambient default connection.
    pub fn new(key: impl Into<TenantKey>, table: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            table: table.into(),
            connection: None,
        }
    }

    /// Pin the entity's data to a named connection.
    pub fn with_connection(mut self, name: impl Into<String>) -> Self {
        self.connection = Some(name.into());
        self
    }
}

impl Tenant for TenantEntity {
    fn key(&self) -> TenantKey {
        self.key.clone()
    }

    fn table(&self) -> &str {
        &self.table
    }

    fn connection(&self) -> Option<&str> {
        self.connection.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display_renders_bare_scalar() {
        assert_eq!(TenantKey::from(10).to_string(), "10");
        assert_eq!(TenantKey::from("acme").to_string(), "acme");
    }

    #[test]
    fn test_entity_defaults_to_ambient_connection() {
        let entity = TenantEntity::new(10, "tenants");
        assert_eq!(entity.key(), TenantKey::Integer(10));
        assert_eq!(entity.table(), "tenants");
        assert_eq!(entity.connection(), None);
    }

    #[test]
    fn test_entity_with_connection() {
        let entity = TenantEntity::new("acme", "tenants").with_connection("tenant_acme");
        assert_eq!(entity.connection(), Some("tenant_acme"));
    }

    #[test]
    fn test_key_serde_is_untagged() {
        let json = serde_json::to_string(&TenantKey::Integer(10)).unwrap();
        assert_eq!(json, "10");
        let key: TenantKey = serde_json::from_str("\"acme\"").unwrap();
        assert_eq!(key, TenantKey::Text("acme".into()));
    }
}
