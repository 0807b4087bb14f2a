// Latency aggregation across the data-processing, network and UI-commit stages
//
// The tracker owns three fixed-capacity ring buffers, one per stage.
// Producers only ever append; readers take the averages. Bounding the
// buffers keeps memory flat in long-running sessions, at the cost of the
// average covering the most recent `capacity` samples rather than the
// whole process lifetime.

use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const DEFAULT_SAMPLE_CAPACITY: usize = 1024;

/// Which stage a duration sample belongs to.
///
/// `UiUpdate` samples are supplied by the caller; the tracker does not
/// know what a "UI update" is, only that it was handed a duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyKind {
    DataProcessing,
    UiUpdate,
    EndToEnd,
}

#[derive(Debug)]
struct PerformanceLog {
    data_processing: VecDeque<f64>,
    ui_update: VecDeque<f64>,
    end_to_end: VecDeque<f64>,
    capacity: usize,
}

impl PerformanceLog {
    fn new(capacity: usize) -> Self {
        Self {
            data_processing: VecDeque::with_capacity(capacity),
            ui_update: VecDeque::with_capacity(capacity),
            end_to_end: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn samples(&self, kind: LatencyKind) -> &VecDeque<f64> {
        match kind {
            LatencyKind::DataProcessing => &self.data_processing,
            LatencyKind::UiUpdate => &self.ui_update,
            LatencyKind::EndToEnd => &self.end_to_end,
        }
    }

    fn samples_mut(&mut self, kind: LatencyKind) -> &mut VecDeque<f64> {
        match kind {
            LatencyKind::DataProcessing => &mut self.data_processing,
            LatencyKind::UiUpdate => &mut self.ui_update,
            LatencyKind::EndToEnd => &mut self.end_to_end,
        }
    }

    fn push(&mut self, kind: LatencyKind, sample_ms: f64) {
        let capacity = self.capacity;
        let buffer = self.samples_mut(kind);
        if buffer.len() == capacity {
            buffer.pop_front();
        }
        buffer.push_back(sample_ms);
    }

    fn average(&self, kind: LatencyKind) -> f64 {
        let buffer = self.samples(kind);
        if buffer.is_empty() {
            return 0.0;
        }
        buffer.iter().sum::<f64>() / buffer.len() as f64
    }
}

/// Running averages over all three stages, read under a single lock
/// acquisition so no reader observes a partially-appended sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencySnapshot {
    pub avg_data_processing_ms: f64,
    pub avg_ui_update_ms: f64,
    pub avg_end_to_end_ms: f64,
    pub data_processing_samples: usize,
    pub ui_update_samples: usize,
    pub end_to_end_samples: usize,
}

/// Shared handle to the sample log. Cheap to clone; the feed, the
/// orchestrator and the caller all record into the same buffers.
#[derive(Debug, Clone)]
pub struct LatencyTracker {
    inner: Arc<Mutex<PerformanceLog>>,
}

impl LatencyTracker {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PerformanceLog::new(capacity.max(1)))),
        }
    }

    pub fn record(&self, kind: LatencyKind, sample_ms: f64) {
        let mut log = self.inner.lock().unwrap();
        log.push(kind, sample_ms);
    }

    /// Arithmetic mean over retained samples; 0.0 when none recorded.
    pub fn average(&self, kind: LatencyKind) -> f64 {
        self.inner.lock().unwrap().average(kind)
    }

    pub fn snapshot(&self) -> LatencySnapshot {
        let log = self.inner.lock().unwrap();
        LatencySnapshot {
            avg_data_processing_ms: log.average(LatencyKind::DataProcessing),
            avg_ui_update_ms: log.average(LatencyKind::UiUpdate),
            avg_end_to_end_ms: log.average(LatencyKind::EndToEnd),
            data_processing_samples: log.samples(LatencyKind::DataProcessing).len(),
            ui_update_samples: log.samples(LatencyKind::UiUpdate).len(),
            end_to_end_samples: log.samples(LatencyKind::EndToEnd).len(),
        }
    }
}

impl Default for LatencyTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_of_empty_is_zero() {
        let tracker = LatencyTracker::new(16);
        assert_eq!(tracker.average(LatencyKind::DataProcessing), 0.0);
        assert_eq!(tracker.average(LatencyKind::UiUpdate), 0.0);
        assert_eq!(tracker.average(LatencyKind::EndToEnd), 0.0);
    }

    #[test]
    fn test_average_correctness() {
        let tracker = LatencyTracker::new(16);
        for sample in [10.0, 20.0, 30.0] {
            tracker.record(LatencyKind::EndToEnd, sample);
        }
        assert_eq!(tracker.average(LatencyKind::EndToEnd), 20.0);
    }

    #[test]
    fn test_kinds_are_independent() {
        let tracker = LatencyTracker::new(16);
        tracker.record(LatencyKind::DataProcessing, 5.0);
        tracker.record(LatencyKind::UiUpdate, 50.0);

        assert_eq!(tracker.average(LatencyKind::DataProcessing), 5.0);
        assert_eq!(tracker.average(LatencyKind::UiUpdate), 50.0);
        assert_eq!(tracker.average(LatencyKind::EndToEnd), 0.0);
    }

    #[test]
    fn test_ring_buffer_evicts_oldest() {
        let tracker = LatencyTracker::new(3);
        for sample in [100.0, 10.0, 20.0, 30.0] {
            tracker.record(LatencyKind::EndToEnd, sample);
        }
        // The 100.0 sample fell off the front
        assert_eq!(tracker.average(LatencyKind::EndToEnd), 20.0);
        assert_eq!(tracker.snapshot().end_to_end_samples, 3);
    }

    #[test]
    fn test_snapshot_reads_all_kinds() {
        let tracker = LatencyTracker::new(16);
        tracker.record(LatencyKind::DataProcessing, 2.0);
        tracker.record(LatencyKind::DataProcessing, 4.0);
        tracker.record(LatencyKind::UiUpdate, 8.0);
        tracker.record(LatencyKind::EndToEnd, 40.0);

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.avg_data_processing_ms, 3.0);
        assert_eq!(snapshot.avg_ui_update_ms, 8.0);
        assert_eq!(snapshot.avg_end_to_end_ms, 40.0);
        assert_eq!(snapshot.data_processing_samples, 2);
    }

    #[test]
    fn test_clones_share_the_log() {
        let tracker = LatencyTracker::new(16);
        let producer = tracker.clone();
        producer.record(LatencyKind::UiUpdate, 12.0);
        assert_eq!(tracker.average(LatencyKind::UiUpdate), 12.0);
    }
}
