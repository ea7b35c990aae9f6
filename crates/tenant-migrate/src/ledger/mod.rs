//! Migration ledger contract.

mod memory;

pub use memory::MemoryLedger;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Row recording that a migration ran in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Migration name.
    pub migration: String,

    /// Batch the migration ran in.
    pub batch: i64,
}

impl LedgerEntry {
    /// Create a ledger entry.
    pub fn new(migration: impl Into<String>, batch: i64) -> Self {
        Self {
            migration: migration.into(),
            batch,
        }
    }
}

/// External record of which migrations have been applied, in which batch.
///
/// The executor never touches ledger internals; it only decides when and
/// with what arguments these are called. `log` runs strictly after a clean
/// forward apply, `delete` strictly after a clean revert, and neither runs
/// in pretend mode or after an error.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Record a migration as run in `batch`.
    async fn log(&self, name: &str, batch: i64) -> Result<()>;

    /// Remove the row for a reverted migration.
    async fn delete(&self, entry: &LedgerEntry) -> Result<()>;
}
