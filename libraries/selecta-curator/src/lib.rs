//! Selecta Curator
//!
//! Keeps a directory of media files under a byte budget by rotating items in
//! from source pools and out of the selection.
//!
//! # Features
//!
//! - Reconciliation of the manifest with manual disk changes
//! - Round-based, part-ascending ingestion fair across categories
//! - Levelling eviction when the selection exceeds its budget
//! - Category-interleaved replay order with ordinal file names
//! - Atomic manifest persistence and an exclusive run lock
//!
//! # Architecture
//!
//! - `selection`: the selection directory and its listing
//! - `scanner`: source pool scanning
//! - `copy`: copying candidates into the selection
//! - `store`: manifest persistence
//! - `reconcile`, `ingest`, `reduce`, `sequence`: pipeline stages
//! - `controller`: orchestration of a rotation run

mod types;

// Core modules
pub mod controller;
pub mod copy;
pub mod ingest;
pub mod lock;
pub mod reconcile;
pub mod reduce;
pub mod scanner;
pub mod selection;
pub mod sequence;
pub mod store;

pub use controller::{AlwaysConfirm, ConfirmGate, NeverConfirm, RotationController};
pub use lock::{SelectionLock, LOCK_FILE_NAME};
pub use selection::SelectionDir;
pub use store::ManifestStore;
pub use types::*;
