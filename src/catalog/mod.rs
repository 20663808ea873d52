//! Durable candidate catalog: titles, enrichment records and failures.

pub mod failure_ledger;
pub mod pending_resolver;
pub mod record_store;
pub mod title_registry;

pub use failure_ledger::FailureLedger;
pub use pending_resolver::PendingResolver;
pub use record_store::RecordStore;
pub use title_registry::{normalize, RegisterSummary, TitleRegistry};

use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) fn now_unix_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as i64)
        .unwrap_or(0)
}
