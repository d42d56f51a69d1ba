//! Update counters for one engine

use serde::{Deserialize, Serialize};

/// Counters of the work an engine did, cumulative since creation or `reset`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStats {
    /// Calls to `advance_frame`
    pub frames: u64,
    /// Component initialisations (root, labels, title)
    pub inits: u64,
    /// Successful label rebuild passes
    pub label_rebuilds: u64,
    /// Label rebuild passes that failed and were left for retry
    pub failed_rebuilds: u64,
    /// Value refresh passes
    pub label_refreshes: u64,
    pub title_rebuilds: u64,
    /// Repaint requests sent to the chart, chart-wide or scoped
    pub repaint_requests: u64,
    /// Labels acquired over all rebuilds
    pub labels_created: u64,
}

impl UpdateStats {
    pub fn record_frame(&mut self) {
        self.frames += 1;
    }

    pub fn record_init(&mut self, serie: usize) {
        self.inits += 1;
        tracing::trace!(target: "serie_engine::stats", serie, inits = self.inits, "init recorded");
    }

    /// Record a successful rebuild that acquired `created` labels
    pub fn record_label_rebuild(&mut self, serie: usize, created: usize) {
        self.label_rebuilds += 1;
        self.labels_created += created as u64;
        tracing::trace!(
            target: "serie_engine::stats",
            serie,
            created,
            label_rebuilds = self.label_rebuilds,
            "label rebuild recorded"
        );
    }

    pub fn record_failed_rebuild(&mut self, serie: usize) {
        self.failed_rebuilds += 1;
        tracing::trace!(
            target: "serie_engine::stats",
            serie,
            failed_rebuilds = self.failed_rebuilds,
            "failed rebuild recorded"
        );
    }

    pub fn record_label_refresh(&mut self, serie: usize, shown: usize) {
        self.label_refreshes += 1;
        tracing::trace!(target: "serie_engine::stats", serie, shown, "label refresh recorded");
    }

    pub fn record_title_rebuild(&mut self) {
        self.title_rebuilds += 1;
    }

    pub fn record_repaint(&mut self) {
        self.repaint_requests += 1;
    }

    /// Add another engine's counters, used for registry totals
    pub fn merge(&mut self, other: &UpdateStats) {
        self.frames += other.frames;
        self.inits += other.inits;
        self.label_rebuilds += other.label_rebuilds;
        self.failed_rebuilds += other.failed_rebuilds;
        self.label_refreshes += other.label_refreshes;
        self.title_rebuilds += other.title_rebuilds;
        self.repaint_requests += other.repaint_requests;
        self.labels_created += other.labels_created;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
