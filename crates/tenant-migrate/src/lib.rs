//! # tenant-migrate
//!
//! Tenant-scoped schema migration executor for multi-tenant applications.
//!
//! Every tenant owns a data partition identified by a unique key and an
//! optional dedicated storage connection. This library runs
//! already-discovered migration steps scoped to exactly one tenant at a
//! time, with support for:
//!
//! - **Connection scoping**: the ambient default connection is switched to
//!   the tenant's (or the step's) connection for the duration of one step
//!   and always restored afterward
//! - **Dry runs** that capture the raw statements a step would issue
//!   without applying them
//! - **Ledger sequencing**: a forward step is recorded only after it
//!   applied cleanly, and its row removed only after a clean revert
//! - **Pluggable reporting** of human-readable progress lines
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tenant_migrate::{
//!     MemoryConnectionResolver, MemoryLedger, MigrationRegistry, Migrator, TenantEntity,
//! };
//!
//! #[tokio::main]
//! async fn main() -> tenant_migrate::Result<()> {
//!     let mut registry = MigrationRegistry::new();
//!     // registry.register("2024_01_create_users.php", || Arc::new(CreateUsers));
//!     let connections = Arc::new(MemoryConnectionResolver::new("default"));
//!     let ledger = Arc::new(MemoryLedger::new());
//!
//!     let mut migrator = Migrator::new(Arc::new(registry), connections, ledger);
//!     let tenant = Arc::new(TenantEntity::new(10, "tenants").with_connection("tenant_10"));
//!     migrator
//!         .set_entity(tenant)
//!         .run_up("2024_01_create_users.php", 1, false)
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod connection;
pub mod entity;
pub mod error;
pub mod ledger;
pub mod migration;
pub mod migrator;
pub mod notice;
pub mod resolver;

// Re-exports for convenient access
pub use connection::{
    CapturingConnection, Connection, ConnectionResolver, MemoryConnection,
    MemoryConnectionResolver, Statement,
};
pub use entity::{Tenant, TenantEntity, TenantKey};
pub use error::{MigrateError, Result};
pub use ledger::{Ledger, LedgerEntry, MemoryLedger};
pub use migration::{ConnectionOverride, Direction, Migration};
pub use migrator::Migrator;
pub use notice::{BufferNotice, LogNotice, Notice};
pub use resolver::{MigrationRegistry, MigrationResolver};
