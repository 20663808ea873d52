//! Batch reconciliation of pending candidates against the metadata sources.

pub mod reconciliation_orchestrator;

pub use reconciliation_orchestrator::{ReconciliationOrchestrator, DEFAULT_MAX_NEW};
