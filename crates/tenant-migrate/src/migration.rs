//! Migration step contract.

use async_trait::async_trait;

use crate::connection::Connection;
use crate::entity::{Tenant, TenantKey};
use crate::error::{MigrateError, Result};

/// Connection a migration step insists on running against.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionOverride {
    /// Use whatever connection is ambient when the step runs.
    #[default]
    Ambient,
    /// Always run on the named connection, regardless of the ambient default.
    Named(String),
}

/// Direction a step is invoked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// String form for log output.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

/// A named unit of schema change with forward and backward operations.
///
/// A step is instantiated once per run, used for exactly one invocation,
/// then discarded. It receives the connection it must run on explicitly,
/// together with the tenant key and entity; the operation issues zero or
/// more statements through that connection and returns nothing.
#[async_trait]
pub trait Migration: Send + Sync {
    /// Connection this step insists on.
    fn connection(&self) -> ConnectionOverride {
        ConnectionOverride::Ambient
    }

    /// Apply the step for one tenant.
    async fn up(&self, conn: &dyn Connection, key: &TenantKey, entity: &dyn Tenant) -> Result<()>;

    /// Revert the step for one tenant.
    async fn down(&self, conn: &dyn Connection, key: &TenantKey, entity: &dyn Tenant)
        -> Result<()>;
}

/// Derive the stable migration name from a file reference.
///
/// The final path component is the name; the extension stays, so
/// `tenants/foo_migration.php` and `foo_migration.php` both name
/// `foo_migration.php`. An empty reference is a configuration error.
pub fn migration_name(reference: &str) -> Result<String> {
    let name = reference
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(reference)
        .trim();

    if name.is_empty() {
        return Err(MigrateError::config(format!(
            "Invalid migration reference [{reference}]"
        )));
    }

    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_name_keeps_extension() {
        assert_eq!(
            migration_name("foo_migration.php").unwrap(),
            "foo_migration.php"
        );
    }

    #[test]
    fn test_migration_name_takes_final_path_component() {
        assert_eq!(
            migration_name("tenants/2024_01_create_users.php").unwrap(),
            "2024_01_create_users.php"
        );
        assert_eq!(
            migration_name("tenants\\2024_01_create_users.php").unwrap(),
            "2024_01_create_users.php"
        );
    }

    #[test]
    fn test_empty_reference_is_a_configuration_error() {
        assert!(matches!(migration_name(""), Err(MigrateError::Config(_))));
        assert!(matches!(
            migration_name("tenants/"),
            Err(MigrateError::Config(_))
        ));
    }

    #[test]
    fn test_override_defaults_to_ambient() {
        assert_eq!(ConnectionOverride::default(), ConnectionOverride::Ambient);
    }

    #[test]
    fn test_direction_as_str() {
        assert_eq!(Direction::Up.as_str(), "up");
        assert_eq!(Direction::Down.as_str(), "down");
    }
}
