//! Choosing the usage store by name when the application starts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::repository::{RepositoryError, UsageRepository};

/// Which usage store to open and how to reach it.
///
/// `connection_string` means whatever the chosen backend says it means.
///
/// | backend    | connection_string examples                  |
/// |------------|---------------------------------------------|
/// | `sqlite`   | `usage.db`, `:memory:`, `sqlite:usage.db`   |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    pub backend: String,
    pub connection_string: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        }
    }
}

/// Opens one kind of usage store.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Lowercase name users select the backend by.
    fn backend_name(&self) -> &'static str;

    /// Open the store, creating and migrating it when needed.
    async fn open(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn UsageRepository>, RepositoryError>;
}

/// The backends a binary ships, in the order they were added.
///
/// ```rust,ignore
/// let registry = RepositoryRegistry::default().with_backend(SqliteRepositoryFactory);
/// let repo = registry.open(&DbConfig::default()).await?;
/// ```
#[derive(Default)]
pub struct RepositoryRegistry {
    backends: Vec<Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    /// Adds a backend. A backend with the same name is replaced.
    pub fn with_backend(
        mut self,
        factory: impl RepositoryFactory + 'static,
    ) -> Self {
        let name = factory.backend_name();
        self.backends.retain(|existing| existing.backend_name() != name);
        self.backends.push(Box::new(factory));
        self
    }

    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|f| f.backend_name()).collect()
    }

    fn find(
        &self,
        name: &str,
    ) -> Option<&dyn RepositoryFactory> {
        let name = name.trim();
        self.backends
            .iter()
            .find(|f| f.backend_name().eq_ignore_ascii_case(name))
            .map(|f| f.as_ref())
    }

    /// Opens `config.backend`, matched case-insensitively.
    ///
    /// # Errors
    /// * [`RepositoryError::Configuration`] naming the requested backend and
    ///   the ones available when nothing matches.
    /// * Whatever the backend returns while opening.
    pub async fn open(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn UsageRepository>, RepositoryError> {
        let Some(factory) = self.find(&config.backend) else {
            return Err(RepositoryError::Configuration(format!(
                "unknown backend '{}', expected one of: {}",
                config.backend.trim(),
                self.backend_names().join(", ")
            )));
        };

        debug!(backend = factory.backend_name(), "opening usage store");
        factory.open(config).await
    }
}
