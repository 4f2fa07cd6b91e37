pub mod calculations;
pub mod db;
pub mod history;
pub mod models;

pub use db::repository::{RepositoryError, UsageRepository};
pub use history::{HistoryTotals, MonthlySummary};
pub use models::*;
