use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::info;

/// Snapshot of a pair-generation batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationMetrics {
    /// Groups handed to the engine
    pub groups_processed: u64,
    /// Groups that generated without error
    pub groups_succeeded: u64,
    /// Groups dropped because of an error
    pub groups_skipped: u64,
    /// Groups that succeeded but had no window fitting the sequence
    pub groups_without_windows: u64,
    /// Pair records emitted
    pub records_emitted: u64,
    /// Skipped group count per error kind
    pub skipped_by_reason: BTreeMap<String, u64>,
    /// Wall time since the collector was created
    pub elapsed: Duration,
}

impl GenerationMetrics {
    /// Fraction of processed groups that were skipped
    pub fn skip_ratio(&self) -> f64 {
        if self.groups_processed == 0 {
            0.0
        } else {
            self.groups_skipped as f64 / self.groups_processed as f64
        }
    }

    /// Emits the batch summary at info level.
    pub fn log_summary(&self) {
        info!(
            "Processed {} groups in {:?}: {} succeeded ({} without windows), {} skipped, {} pairs emitted",
            self.groups_processed,
            self.elapsed,
            self.groups_succeeded,
            self.groups_without_windows,
            self.groups_skipped,
            self.records_emitted
        );
        for (reason, count) in &self.skipped_by_reason {
            info!("  skipped {} groups: {}", count, reason);
        }
    }
}

/// Thread-safe metrics collector shared by parallel group workers
#[derive(Debug)]
pub struct MetricsCollector {
    groups_processed: AtomicU64,
    groups_succeeded: AtomicU64,
    groups_skipped: AtomicU64,
    groups_without_windows: AtomicU64,
    records_emitted: AtomicU64,
    skipped_by_reason: Mutex<BTreeMap<String, u64>>,
    start_time: Instant,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            groups_processed: AtomicU64::new(0),
            groups_succeeded: AtomicU64::new(0),
            groups_skipped: AtomicU64::new(0),
            groups_without_windows: AtomicU64::new(0),
            records_emitted: AtomicU64::new(0),
            skipped_by_reason: Mutex::new(BTreeMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Record a group that produced `records` pairs
    pub fn record_success(&self, records: u64) {
        self.groups_processed.fetch_add(1, Ordering::Relaxed);
        self.groups_succeeded.fetch_add(1, Ordering::Relaxed);
        self.records_emitted.fetch_add(records, Ordering::Relaxed);
        if records == 0 {
            self.groups_without_windows.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a group dropped for `reason`
    pub fn record_skip(&self, reason: &str) {
        self.groups_processed.fetch_add(1, Ordering::Relaxed);
        self.groups_skipped.fetch_add(1, Ordering::Relaxed);
        // poisoning is ignored, the map only holds counters
        let mut reasons = self.skipped_by_reason.lock().unwrap_or_else(|e| e.into_inner());
        *reasons.entry(reason.to_string()).or_insert(0) += 1;
    }

    /// Get current metrics
    pub fn get_metrics(&self) -> GenerationMetrics {
        let skipped_by_reason =
            self.skipped_by_reason.lock().unwrap_or_else(|e| e.into_inner()).clone();

        GenerationMetrics {
            groups_processed: self.groups_processed.load(Ordering::Relaxed),
            groups_succeeded: self.groups_succeeded.load(Ordering::Relaxed),
            groups_skipped: self.groups_skipped.load(Ordering::Relaxed),
            groups_without_windows: self.groups_without_windows.load(Ordering::Relaxed),
            records_emitted: self.records_emitted.load(Ordering::Relaxed),
            skipped_by_reason,
            elapsed: self.start_time.elapsed(),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
