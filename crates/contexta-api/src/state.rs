//! Shared handler state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use contexta_runtime::Orchestrator;

/// How a finished query ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Answered,
    Degraded,
    Failed,
}

/// Point-in-time view of the query counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueryStats {
    pub received: u64,
    pub answered: u64,
    pub degraded: u64,
    pub failed: u64,
}

#[derive(Default)]
struct Counters {
    received: AtomicU64,
    answered: AtomicU64,
    degraded: AtomicU64,
    failed: AtomicU64,
}

pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    started: Instant,
    counters: Counters,
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            orchestrator,
            started: Instant::now(),
            counters: Counters::default(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn record_received(&self) {
        self.counters.received.fetch_add(1, Ordering::Relaxed);
    }

    /// Degraded answers count as answered too.
    pub fn record_outcome(&self, outcome: Outcome) {
        let c = &self.counters;
        match outcome {
            Outcome::Answered => {
                c.answered.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::Degraded => {
                c.answered.fetch_add(1, Ordering::Relaxed);
                c.degraded.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::Failed => {
                c.failed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn stats(&self) -> QueryStats {
        let c = &self.counters;
        QueryStats {
            received: c.received.load(Ordering::Relaxed),
            answered: c.answered.load(Ordering::Relaxed),
            degraded: c.degraded.load(Ordering::Relaxed),
            failed: c.failed.load(Ordering::Relaxed),
        }
    }
}
