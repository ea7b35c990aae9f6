//! In-memory ledger for tests and embedders without a ledger table.

use async_trait::async_trait;
use std::sync::Mutex;

use super::{Ledger, LedgerEntry};
use crate::error::Result;

/// Ledger that keeps entries in memory.
#[derive(Default)]
pub struct MemoryLedger {
    entries: Mutex<Vec<LedgerEntry>>,
}

impl MemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries recorded so far, in log order.
    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .clone()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn log(&self, name: &str, batch: i64) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());
        entries.push(LedgerEntry::new(name, batch));
        Ok(())
    }

    async fn delete(&self, entry: &LedgerEntry) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());
        entries.retain(|existing| existing.migration != entry.migration);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_appends_in_order() {
        let ledger = MemoryLedger::new();
        ledger.log("a.php", 1).await.unwrap();
        ledger.log("b.php", 1).await.unwrap();

        assert_eq!(
            ledger.entries(),
            vec![LedgerEntry::new("a.php", 1), LedgerEntry::new("b.php", 1)]
        );
    }

    #[tokio::test]
    async fn test_delete_removes_by_migration_name() {
        let ledger = MemoryLedger::new();
        ledger.log("a.php", 1).await.unwrap();
        ledger.log("b.php", 1).await.unwrap();

        ledger.delete(&LedgerEntry::new("a.php", 1)).await.unwrap();
        assert_eq!(ledger.entries(), vec![LedgerEntry::new("b.php", 1)]);
    }

    #[tokio::test]
    async fn test_delete_of_missing_entry_is_harmless() {
        let ledger = MemoryLedger::new();
        ledger
            .delete(&LedgerEntry::new("missing.php", 1))
            .await
            .unwrap();
        assert!(ledger.entries().is_empty());
    }
}
