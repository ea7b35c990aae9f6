//! Migration step resolution.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{MigrateError, Result};
use crate::migration::Migration;

/// Resolve migration steps from stable references.
///
/// Discovery and ordering of migration files happen outside this crate; a
/// resolver only turns an already-discovered reference into a step
/// instance. Resolution must be deterministic for a given reference.
pub trait MigrationResolver: Send + Sync {
    /// Instantiate the step registered under `name`.
    fn resolve(&self, name: &str) -> Result<Arc<dyn Migration>>;
}

type MigrationFactory = Box<dyn Fn() -> Arc<dyn Migration> + Send + Sync>;

/// In-memory resolver mapping names to step factories.
///
/// Each resolution invokes the factory, matching the one-invocation
/// lifecycle of a step.
#[derive(Default)]
pub struct MigrationRegistry {
    factories: HashMap<String, MigrationFactory>,
}

impl MigrationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a step factory under a stable name.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Arc<dyn Migration> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
        self
    }
}

impl MigrationResolver for MigrationRegistry {
    fn resolve(&self, name: &str) -> Result<Arc<dyn Migration>> {
        match self.factories.get(name) {
            Some(factory) => Ok(factory()),
            None => Err(MigrateError::resolution(name)),
        }
    }
}
