//! Process-wide stream counters.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Counters shared by every stream connection.
#[derive(Debug, Default)]
pub struct StreamMetrics {
    /// Streams ever opened
    pub streams_opened: AtomicU64,
    /// Streams currently running
    pub streams_active: AtomicU64,
    /// Poll ticks completed across all streams
    pub ticks: AtomicU64,
    /// `data:` frames written
    pub data_frames_sent: AtomicU64,
    /// `ping:` frames written
    pub ping_frames_sent: AtomicU64,
    /// Frames that could not be written
    pub write_failures: AtomicU64,
}

impl StreamMetrics {
    /// Create zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed tick
    pub fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a written data frame
    pub fn record_data_frame(&self) {
        self.data_frames_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a written ping frame
    pub fn record_ping_frame(&self) {
        self.ping_frames_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed write
    pub fn record_write_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of streams currently running.
    pub fn active(&self) -> u64 {
        self.streams_active.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> StreamMetricsSnapshot {
        StreamMetricsSnapshot {
            streams_opened: self.streams_opened.load(Ordering::Relaxed),
            streams_active: self.streams_active.load(Ordering::Relaxed),
            ticks: self.ticks.load(Ordering::Relaxed),
            data_frames_sent: self.data_frames_sent.load(Ordering::Relaxed),
            ping_frames_sent: self.ping_frames_sent.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamMetricsSnapshot {
    /// Streams ever opened
    pub streams_opened: u64,
    /// Streams currently running
    pub streams_active: u64,
    /// Poll ticks completed
    pub ticks: u64,
    /// `data:` frames written
    pub data_frames_sent: u64,
    /// `ping:` frames written
    pub ping_frames_sent: u64,
    /// Frames that could not be written
    pub write_failures: u64,
}

/// Slot in the active stream count, released on drop.
#[derive(Debug)]
pub struct ActiveStreamGuard {
    metrics: Arc<StreamMetrics>,
}

impl ActiveStreamGuard {
    /// Take a slot if fewer than `max` streams are running.
    pub fn try_acquire(metrics: &Arc<StreamMetrics>, max: usize) -> Option<Self> {
        let max = max as u64;
        metrics
            .streams_active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |active| {
                (active < max).then_some(active + 1)
            })
            .ok()?;
        metrics.streams_opened.fetch_add(1, Ordering::Relaxed);

        Some(Self {
            metrics: Arc::clone(metrics),
        })
    }
}

impl Drop for ActiveStreamGuard {
    fn drop(&mut self) {
        self.metrics.streams_active.fetch_sub(1, Ordering::AcqRel);
    }
}
