use async_trait::async_trait;
use powerbill_core::db::{DbConfig, RepositoryError, RepositoryFactory, UsageRepository};
use tracing::debug;

use crate::repository::SqliteRepository;

/// Map a user-facing connection string onto a sqlx SQLite URL.
///
/// * `":memory:"` becomes `sqlite::memory:`.
/// * Values that already start with `sqlite:` are passed through.
/// * Anything else is treated as a file path.
pub fn connection_url(connection_string: &str) -> String {
    let trimmed = connection_string.trim();
    if trimmed == ":memory:" {
        "sqlite::memory:".to_string()
    } else if trimmed.starts_with("sqlite:") {
        trimmed.to_string()
    } else {
        format!("sqlite:{}", trimmed)
    }
}

/// Opens SQLite usage stores.
///
/// ```rust,no_run
/// use powerbill_core::db::RepositoryRegistry;
/// use powerbill_db_sqlite::SqliteRepositoryFactory;
///
/// let registry = RepositoryRegistry::default().with_backend(SqliteRepositoryFactory);
/// assert_eq!(registry.backend_names(), vec!["sqlite"]);
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string` and run
    /// the embedded migrations. The file is created if it does not exist.
    async fn open(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn UsageRepository>, RepositoryError> {
        let url = connection_url(&config.connection_string);
        debug!(%url, "opening sqlite repository");

        let repo = SqliteRepository::new(&url)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;
        Ok(Box::new(repo))
    }
}

#[cfg(test)]
mod tests {
    use powerbill_core::db::{DbConfig, RepositoryFactory};

    use super::{SqliteRepositoryFactory, connection_url};

    #[test]
    fn backend_name_is_sqlite() {
        assert_eq!(SqliteRepositoryFactory.backend_name(), "sqlite");
    }

    #[test]
    fn connection_url_maps_memory_and_paths() {
        assert_eq!(connection_url(":memory:"), "sqlite::memory:");
        assert_eq!(connection_url("usage.db"), "sqlite:usage.db");
        assert_eq!(connection_url("sqlite:data/usage.db"), "sqlite:data/usage.db");
    }

    #[tokio::test]
    async fn creates_in_memory_repository() {
        let config = DbConfig {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        };

        let repo = SqliteRepositoryFactory
            .open(&config)
            .await
            .expect("failed to create in-memory repository");

        let records = repo.list_records(None).await.expect("migrated table");
        assert!(records.is_empty());
    }
}
