//! Scan history persistence.

mod json_store;

pub use json_store::ScanStore;
