//! Dry-run statement capture.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::{Connection, Statement};
use crate::error::Result;

/// A resolved connection placed into capturing mode.
///
/// Implements the same statement-execution capability as the live
/// connection it wraps, but records every statement instead of
/// transmitting it, so migration code cannot tell it is being captured.
/// Dropping the wrapper returns the live handle to normal use untouched;
/// capture never disconnects it.
pub struct CapturingConnection {
    target: Arc<dyn Connection>,
    captured: Mutex<Vec<Statement>>,
}

impl CapturingConnection {
    /// Place `target` into capturing mode.
    pub fn wrap(target: Arc<dyn Connection>) -> Self {
        Self {
            target,
            captured: Mutex::new(Vec::new()),
        }
    }

    /// The live connection the statements would have been issued against.
    pub fn target(&self) -> Arc<dyn Connection> {
        Arc::clone(&self.target)
    }

    /// Consume the capture, yielding statements in emission order.
    pub fn into_captured(self) -> Vec<Statement> {
        self.captured
            .into_inner()
            .unwrap_or_else(|err| err.into_inner())
    }
}

#[async_trait]
impl Connection for CapturingConnection {
    async fn execute(&self, statement: &Statement) -> Result<()> {
        let mut captured = self.captured.lock().unwrap_or_else(|err| err.into_inner());
        captured.push(statement.clone());
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        // The wrapped live handle stays connected; capture only owns the buffer.
        Ok(())
    }
}
