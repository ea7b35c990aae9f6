//! Tenant-scoped migration executor.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::connection::{
    CapturingConnection, ConnectionResolver, ConnectionSwitch, Statement,
};
use crate::entity::Tenant;
use crate::error::{MigrateError, Result};
use crate::ledger::{Ledger, LedgerEntry};
use crate::migration::{migration_name, ConnectionOverride, Direction, Migration};
use crate::notice::Notice;
use crate::resolver::MigrationResolver;

/// Executes migration steps scoped to a single tenant.
///
/// A tenant entity must be bound with [`set_entity`](Migrator::set_entity)
/// before a run. Each step then executes against the step's override
/// connection, the entity's connection, or the ambient default, in that
/// order of precedence; when a non-default connection is used, the ambient
/// default is switched for the duration of the step and restored afterward
/// on every exit path, with the temporary connection disconnected.
///
/// Steps run one at a time: the run entry points take `&mut self`, so a
/// second step cannot start (and the default connection cannot be switched
/// again) while one is in flight. Migrating several tenants concurrently
/// requires one executor per tenant over an isolated resolver each.
pub struct Migrator {
    migrations: Arc<dyn MigrationResolver>,
    connections: Arc<dyn ConnectionResolver>,
    ledger: Arc<dyn Ledger>,
    entity: Option<Arc<dyn Tenant>>,
    notice: Option<Arc<dyn Notice>>,
}

impl Migrator {
    /// Create an executor over its collaborators.
    pub fn new(
        migrations: Arc<dyn MigrationResolver>,
        connections: Arc<dyn ConnectionResolver>,
        ledger: Arc<dyn Ledger>,
    ) -> Self {
        Self {
            migrations,
            connections,
            ledger,
            entity: None,
            notice: None,
        }
    }

    /// Bind the tenant subject for subsequent runs.
    pub fn set_entity(&mut self, entity: Arc<dyn Tenant>) -> &mut Self {
        self.entity = Some(entity);
        self
    }

    /// Attach a sink for progress lines.
    pub fn output_using(&mut self, notice: Arc<dyn Notice>) -> &mut Self {
        self.notice = Some(notice);
        self
    }

    /// Run a migration forward for the bound tenant.
    ///
    /// With `pretend` set, the statements the step would issue are captured
    /// and reported instead; nothing reaches storage and no ledger entry is
    /// written. Otherwise the step's `up` runs with the tenant's key and
    /// entity, the ledger records `(name, batch)`, and one progress line is
    /// emitted.
    pub async fn run_up(&mut self, reference: &str, batch: i64, pretend: bool) -> Result<()> {
        let entity = Arc::clone(self.entity()?);
        let name = migration_name(reference)?;
        let migration = self.migrations.resolve(&name)?;
        debug!(migration = %name, direction = "up", "resolved migration");

        let target = target_connection(migration.as_ref(), entity.as_ref());
        let switch = ConnectionSwitch::acquire(self.connections.as_ref(), target.as_deref());
        let outcome = self
            .apply_up(migration.as_ref(), &name, batch, pretend, entity.as_ref())
            .await;
        self.settle(switch, outcome).await
    }

    /// Run a migration backward for the bound tenant.
    ///
    /// The caller supplies the ledger row to remove; it is deleted only
    /// after the step's `down` returns cleanly. Pretend mode captures and
    /// reports statements, making no ledger change.
    pub async fn run_down(
        &mut self,
        reference: &str,
        entry: &LedgerEntry,
        pretend: bool,
    ) -> Result<()> {
        let entity = Arc::clone(self.entity()?);
        let name = migration_name(reference)?;
        let migration = self.migrations.resolve(&name)?;
        debug!(migration = %name, direction = "down", "resolved migration");

        let target = target_connection(migration.as_ref(), entity.as_ref());
        let switch = ConnectionSwitch::acquire(self.connections.as_ref(), target.as_deref());
        let outcome = self
            .apply_down(migration.as_ref(), &name, entry, pretend, entity.as_ref())
            .await;
        self.settle(switch, outcome).await
    }

    /// Capture the statements a step would issue, without applying them.
    ///
    /// Resolves the live connection the step would use, places it into
    /// capturing mode, and invokes the step's operation for `direction`;
    /// the step's logic executes while every statement is intercepted
    /// before transmission. Returns the statements in emission order,
    /// produced fresh per call.
    pub async fn capture_queries(
        &self,
        migration: &dyn Migration,
        direction: Direction,
        entity: &dyn Tenant,
    ) -> Result<Vec<Statement>> {
        let target = match migration.connection() {
            ConnectionOverride::Named(name) => Some(name),
            ConnectionOverride::Ambient => None,
        };
        let live = self.connections.connection(target.as_deref()).await?;
        let capture = CapturingConnection::wrap(live);

        let key = entity.key();
        match direction {
            Direction::Up => migration.up(&capture, &key, entity).await?,
            Direction::Down => migration.down(&capture, &key, entity).await?,
        }

        Ok(capture.into_captured())
    }

    async fn apply_up(
        &self,
        migration: &dyn Migration,
        name: &str,
        batch: i64,
        pretend: bool,
        entity: &dyn Tenant,
    ) -> Result<()> {
        if pretend {
            return self.pretend_to_run(migration, Direction::Up, name, entity).await;
        }

        let key = entity.key();
        let connection = self.connections.connection(None).await?;
        migration
            .up(connection.as_ref(), &key, entity)
            .await
            .map_err(|source| MigrateError::application(name, entity.table(), &key, source))?;

        // Log the step only after a clean apply, so later runs know it ran
        // and which batch groups it for bulk revert.
        self.ledger.log(name, batch).await?;

        self.note(&format!("Migrated [{}:{}]: {}", entity.table(), key, name));
        Ok(())
    }

    async fn apply_down(
        &self,
        migration: &dyn Migration,
        name: &str,
        entry: &LedgerEntry,
        pretend: bool,
        entity: &dyn Tenant,
    ) -> Result<()> {
        if pretend {
            return self
                .pretend_to_run(migration, Direction::Down, name, entity)
                .await;
        }

        let key = entity.key();
        let connection = self.connections.connection(None).await?;
        migration
            .down(connection.as_ref(), &key, entity)
            .await
            .map_err(|source| MigrateError::application(name, entity.table(), &key, source))?;

        // Remove the caller-supplied row only after a clean revert, so the
        // step reads as never run.
        self.ledger.delete(entry).await?;

        self.note(&format!(
            "Rolled back [{}:{}]: {}",
            entity.table(),
            key,
            name
        ));
        Ok(())
    }

    async fn pretend_to_run(
        &self,
        migration: &dyn Migration,
        direction: Direction,
        name: &str,
        entity: &dyn Tenant,
    ) -> Result<()> {
        let key = entity.key();
        let statements = self
            .capture_queries(migration, direction, entity)
            .await
            .map_err(|source| MigrateError::application(name, entity.table(), &key, source))?;

        for statement in statements {
            self.note(&format!(
                "{} [{}:{}]: {}",
                name,
                entity.table(),
                key,
                statement
            ));
        }
        Ok(())
    }

    /// Combine a guarded operation's outcome with connection restoration.
    ///
    /// An operation error always wins; the restore failure is then only
    /// logged. A restore failure after a successful operation surfaces as
    /// the result.
    async fn settle(&self, switch: ConnectionSwitch, outcome: Result<()>) -> Result<()> {
        let restored = switch.release(self.connections.as_ref()).await;
        match (outcome, restored) {
            (Ok(()), restored) => restored,
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(restore)) => {
                warn!(error = %restore, "failed to restore default connection");
                Err(err)
            }
        }
    }

    fn entity(&self) -> Result<&Arc<dyn Tenant>> {
        self.entity.as_ref().ok_or_else(|| {
            MigrateError::config("No tenant entity bound; call set_entity before running migrations")
        })
    }

    fn note(&self, line: &str) {
        if let Some(notice) = &self.notice {
            notice.write(line);
        }
    }
}

/// Connection a step must run on: the step's override wins, then the
/// entity's connection, then the ambient default.
fn target_connection(migration: &dyn Migration, entity: &dyn Tenant) -> Option<String> {
    match migration.connection() {
        ConnectionOverride::Named(name) => Some(name),
        ConnectionOverride::Ambient => entity.connection().map(str::to_owned),
    }
}
