//! Import of historical monthly electricity usage from CSV.

mod loader;

pub use loader::{UsageHistoryLoader, UsageHistoryLoaderError, UsageHistoryRecord};
