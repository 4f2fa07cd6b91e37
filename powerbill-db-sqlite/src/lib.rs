//! SQLite storage backend for monthly usage records.

mod factory;
mod repository;

pub use factory::{SqliteRepositoryFactory, connection_url};
pub use repository::SqliteRepository;
