//! Incremental reconciliation of candidate book titles against book and film
//! metadata sources, building a dataset of literary works and their adaptations.

pub mod analysis;
pub mod catalog;
pub mod config;
pub mod credentials;
pub mod db_manager;
pub mod error;
pub mod reconciliation;
pub mod records;
pub mod sources;
