//! Observable scan/sync progress.
//!
//! The counters here are the only state read concurrently by observers.
//! Everything is atomic; values are monotonic within one operation and
//! reset at operation boundaries.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};

/// Phase of the current sync-family operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Scanning,
    Syncing,
    Finalizing,
    Cancelled,
}

impl SyncPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Scanning,
            2 => Self::Syncing,
            3 => Self::Finalizing,
            4 => Self::Cancelled,
            _ => Self::Idle,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Scanning => 1,
            Self::Syncing => 2,
            Self::Finalizing => 3,
            Self::Cancelled => 4,
        }
    }
}

/// Externally observable scan state.
#[derive(Debug, Default)]
pub struct ScanStatus {
    active: AtomicBool,
    show_loading: AtomicBool,
    finished: AtomicBool,
    discovered: AtomicU64,
    processed: AtomicU64,
    phase: AtomicU8,
}

impl ScanStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset counters and mark an operation as running.
    pub fn begin(&self) {
        self.discovered.store(0, Ordering::Relaxed);
        self.processed.store(0, Ordering::Relaxed);
        self.finished.store(false, Ordering::Relaxed);
        self.show_loading.store(true, Ordering::Relaxed);
        self.active.store(true, Ordering::Relaxed);
        self.phase
            .store(SyncPhase::Scanning.as_u8(), Ordering::Relaxed);
    }

    pub fn enter_phase(&self, phase: SyncPhase) {
        self.phase.store(phase.as_u8(), Ordering::Relaxed);
    }

    /// Mark the operation finished.
    pub fn complete(&self) {
        self.active.store(false, Ordering::Relaxed);
        self.show_loading.store(false, Ordering::Relaxed);
        self.finished.store(true, Ordering::Relaxed);
        self.phase.store(SyncPhase::Idle.as_u8(), Ordering::Relaxed);
    }

    /// Mark the operation cancelled.
    pub fn cancel(&self) {
        self.active.store(false, Ordering::Relaxed);
        self.show_loading.store(false, Ordering::Relaxed);
        self.finished.store(true, Ordering::Relaxed);
        self.phase
            .store(SyncPhase::Cancelled.as_u8(), Ordering::Relaxed);
    }

    pub fn add_discovered(&self, count: u64) {
        self.discovered.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_processed(&self, count: u64) {
        self.processed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    pub fn show_loading(&self) -> bool {
        self.show_loading.load(Ordering::Relaxed)
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Relaxed)
    }

    pub fn discovered(&self) -> u64 {
        self.discovered.load(Ordering::Relaxed)
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn phase(&self) -> SyncPhase {
        SyncPhase::from_u8(self.phase.load(Ordering::Relaxed))
    }
}
