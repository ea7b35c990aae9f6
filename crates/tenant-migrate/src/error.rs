//! Error types for the tenant migration library.

use thiserror::Error;

/// Main error type for tenant migration operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Executor misconfiguration (no entity bound, empty migration reference)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The migration resolver cannot produce a step for a reference
    #[error("Cannot resolve migration [{reference}]")]
    Resolution { reference: String },

    /// A migration raised while executing against live storage
    #[error("Migration {name} failed for [{table}:{key}]")]
    Application {
        name: String,
        table: String,
        key: String,
        #[source]
        source: Box<MigrateError>,
    },

    /// No connection is registered under the given name
    #[error("Unknown connection [{0}]")]
    UnknownConnection(String),

    /// A live connection failed to execute a statement or disconnect
    #[error("Connection error: {0}")]
    Connection(String),

    /// Restoring the previous default connection failed after a switched
    /// operation completed
    #[error("Failed to restore default connection after using [{connection}]")]
    ConnectionRestore {
        connection: String,
        #[source]
        source: Box<MigrateError>,
    },

    /// Ledger collaborator failure
    #[error("Ledger error: {0}")]
    Ledger(String),
}

impl MigrateError {
    /// Create a Config error
    pub fn config(message: impl Into<String>) -> Self {
        MigrateError::Config(message.into())
    }

    /// Create a Resolution error for a migration reference
    pub fn resolution(reference: impl Into<String>) -> Self {
        MigrateError::Resolution {
            reference: reference.into(),
        }
    }

    /// Create a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        MigrateError::Connection(message.into())
    }

    /// Create an Application error carrying the tenant context a caller
    /// needs to render a meaningful message
    pub fn application(
        name: impl Into<String>,
        table: impl Into<String>,
        key: impl ToString,
        source: MigrateError,
    ) -> Self {
        MigrateError::Application {
            name: name.into(),
            table: table.into(),
            key: key.to_string(),
            source: Box::new(source),
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        // Add error chain for wrapped errors
        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for tenant migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
