//! Bounded per-kind event buffers.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::store::event::{MetricEvent, MetricKind, MetricPayload};

pub const DEFAULT_CAPACITY: usize = 1000;

/// Per-kind buffer lengths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricCounts {
    pub requests: usize,
    pub errors: usize,
    pub security_events: usize,
    pub performance: usize,
    pub user_activity: usize,
}

/// In-memory store holding one FIFO buffer per metric kind.
///
/// Every buffer is capped at `capacity` entries; appending to a full buffer
/// drops the oldest event. Appends never fail: a poisoned lock is recovered
/// since a half-finished push cannot leave a `VecDeque` inconsistent.
#[derive(Debug)]
pub struct MetricStore {
    buffers: [Mutex<VecDeque<MetricEvent>>; 5],
    capacity: usize,
}

impl MetricStore {
    /// Create a store. A zero capacity is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffers: std::array::from_fn(|_| Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append an event timestamped now.
    pub fn append(&self, payload: impl Into<MetricPayload>) {
        self.append_at(payload, Utc::now());
    }

    /// Append an event with an explicit timestamp.
    pub fn append_at(&self, payload: impl Into<MetricPayload>, timestamp: DateTime<Utc>) {
        let event = MetricEvent::new(payload.into(), timestamp);
        let mut buffer = self.lock(event.kind);
        buffer.push_back(event);
        while buffer.len() > self.capacity {
            buffer.pop_front();
        }
    }

    /// Events of `kind` strictly newer than `since`, oldest first.
    pub fn windowed(&self, kind: MetricKind, since: DateTime<Utc>) -> Vec<MetricEvent> {
        self.lock(kind)
            .iter()
            .filter(|e| e.timestamp > since)
            .cloned()
            .collect()
    }

    /// Full copy of one buffer, oldest first.
    pub fn snapshot(&self, kind: MetricKind) -> Vec<MetricEvent> {
        self.lock(kind).iter().cloned().collect()
    }

    pub fn len(&self, kind: MetricKind) -> usize {
        self.lock(kind).len()
    }

    pub fn is_empty(&self) -> bool {
        MetricKind::ALL.iter().all(|k| self.len(*k) == 0)
    }

    pub fn counts(&self) -> MetricCounts {
        MetricCounts {
            requests: self.len(MetricKind::Request),
            errors: self.len(MetricKind::Error),
            security_events: self.len(MetricKind::Security),
            performance: self.len(MetricKind::Performance),
            user_activity: self.len(MetricKind::Activity),
        }
    }

    fn lock(&self, kind: MetricKind) -> MutexGuard<'_, VecDeque<MetricEvent>> {
        self.buffers[kind.index()]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MetricStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::event::{ErrorMetric, PerformanceMetric, RequestMetric};
    use chrono::Duration;
    use std::sync::Arc;

    fn error(marker: usize) -> ErrorMetric {
        ErrorMetric {
            error_type: "Marker".into(),
            message: format!("marker-{}", marker),
            endpoint: None,
        }
    }

    fn message(event: &MetricEvent) -> &str {
        match &event.payload {
            MetricPayload::Error(e) => &e.message,
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_overflow_evicts_oldest() {
        let store = MetricStore::new(1000);
        for marker in 1..=1001 {
            store.append(error(marker));
        }

        let errors = store.snapshot(MetricKind::Error);
        assert_eq!(errors.len(), 1000);
        assert_eq!(message(&errors[0]), "marker-2");
        assert_eq!(message(&errors[999]), "marker-1001");
    }

    #[test]
    fn test_length_bounded_after_every_append() {
        let store = MetricStore::new(5);
        for marker in 1..=12 {
            store.append(error(marker));
            assert!(store.len(MetricKind::Error) <= 5);

            let kept: Vec<String> = store
                .snapshot(MetricKind::Error)
                .iter()
                .map(|e| message(e).to_string())
                .collect();
            let first = marker.saturating_sub(5) + 1;
            let expected: Vec<String> = (first..=marker).map(|m| format!("marker-{}", m)).collect();
            assert_eq!(kept, expected);
        }
    }

    #[test]
    fn test_buffers_are_independent() {
        let store = MetricStore::new(2);
        store.append(error(1));
        store.append(PerformanceMetric {
            name: "db_query".into(),
            value: 0.25,
        });

        let counts = store.counts();
        assert_eq!(counts.errors, 1);
        assert_eq!(counts.performance, 1);
        assert_eq!(counts.requests, 0);
        assert!(!store.is_empty());
    }

    #[test]
    fn test_windowed_excludes_boundary() {
        let store = MetricStore::default();
        let now = Utc::now();
        store.append_at(error(1), now - Duration::seconds(120));
        store.append_at(error(2), now - Duration::seconds(60));
        store.append_at(error(3), now);

        let recent = store.windowed(MetricKind::Error, now - Duration::seconds(60));
        assert_eq!(recent.len(), 1);
        assert_eq!(message(&recent[0]), "marker-3");
    }

    #[test]
    fn test_windowed_is_monotonic() {
        let store = MetricStore::default();
        let now = Utc::now();
        for i in 0..50 {
            store.append_at(error(i), now - Duration::seconds(i as i64 * 7));
        }

        let mut previous: Vec<MetricEvent> = Vec::new();
        for secs in [0, 10, 60, 120, 240, 400] {
            let current = store.windowed(MetricKind::Error, now - Duration::seconds(secs));
            for event in &previous {
                assert!(current.contains(event));
            }
            previous = current;
        }
    }

    #[test]
    fn test_concurrent_appends_stay_bounded() {
        let store = Arc::new(MetricStore::new(100));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..500 {
                        store.append(RequestMetric {
                            endpoint: format!("/t{}", t),
                            method: "GET".into(),
                            status_code: 200,
                            duration: i as f64 / 1000.0,
                        });
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(MetricKind::Request), 100);
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let store = MetricStore::new(0);
        store.append(error(1));
        store.append(error(2));
        assert_eq!(store.capacity(), 1);
        assert_eq!(message(&store.snapshot(MetricKind::Error)[0]), "marker-2");
    }
}
