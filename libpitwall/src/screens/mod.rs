//! Screen state machines
//!
//! One state machine per screen. Each owns a single-writer
//! `tokio::sync::watch` channel: the screen is the only writer, any number
//! of display-layer readers observe the latest state without blocking it.
//!
//! Loads run as spawned tasks tagged with a generation number. `retry`
//! bumps the generation before publishing `Loading`, and every merge checks
//! the generation under the channel lock, so a superseded load can never
//! write into a newer one.

pub mod detail;
pub mod home;

pub use detail::{DetailScreen, DetailUiState};
pub use home::{HomeContent, HomeScreen, HomeUiState};

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

use crate::error::NetworkError;

/// Generation bookkeeping for a screen's load sequence
pub(crate) struct LoadGeneration {
    current: AtomicU64,
    finished: watch::Sender<u64>,
}

impl LoadGeneration {
    pub(crate) fn new() -> Self {
        let (finished, _) = watch::channel(0);
        Self {
            current: AtomicU64::new(0),
            finished,
        }
    }

    /// Start a new generation; every older one becomes stale
    pub(crate) fn begin(&self) -> u64 {
        self.current.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.current.load(Ordering::SeqCst) == generation
    }

    pub(crate) fn finish(&self, generation: u64) {
        self.finished.send_if_modified(|done| {
            if generation > *done {
                *done = generation;
                true
            } else {
                false
            }
        });
    }

    /// Resolve once the newest generation has finished loading
    pub(crate) async fn wait_current(&self) {
        let target = self.current.load(Ordering::SeqCst);
        let mut finished = self.finished.subscribe();
        let _ = finished.wait_for(|done| *done >= target).await;
    }
}

/// Message to surface for a failed load: explicit message, else the
/// classified error's message, else `fallback`
pub(crate) fn failure_message(cause: &NetworkError, message: Option<String>, fallback: &str) -> String {
    message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            let from_cause = cause.user_message();
            if from_cause.trim().is_empty() {
                fallback.to_string()
            } else {
                from_cause
            }
        })
}
