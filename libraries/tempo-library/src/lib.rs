//! Tempo Library
//!
//! The local media library scanner and catalog-sync engine.
//!
//! # Architecture
//!
//! - `tree`: in-memory directory index of scanned paths
//! - `matcher`: pure same-track comparison and batch deduplication
//! - `scanner`: root enumeration and bounded-parallel extraction
//! - `sync`: catalog reconciliation, finalize pass, single-writer gate
//! - `resolver`: background canonical-identity resolution
//! - `status`: externally observable progress counters
//!
//! A scan flows: enumerate whitelisted roots, extract candidates
//! concurrently, deduplicate the batch, reconcile it against the
//! catalog behind the single-writer gate, then finalize. Cancellation is
//! cooperative via a `CancellationToken` checked at every unit-of-work
//! boundary.

mod error;

pub mod matcher;
pub mod options;
pub mod resolver;
pub mod scanner;
pub mod status;
pub mod sync;
pub mod tree;

pub use error::{LibraryError, Result};
pub use options::ScanOptions;
pub use resolver::{ArtistResolver, ResolveSummary};
pub use scanner::{ScanOutcome, Scanner};
pub use status::{ScanStatus, SyncPhase};
pub use sync::{LibrarySync, SyncGate, SyncSession, SyncSummary};
pub use tree::{DirNode, DirectoryTree};
