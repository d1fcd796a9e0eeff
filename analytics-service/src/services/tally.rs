//! In-memory counts of consumed patient events.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use service_core::events::PATIENT_CREATED;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Label for events whose `event_type` is missing or not one we publish.
pub const UNKNOWN_EVENT_TYPE: &str = "UNKNOWN";

const KNOWN_EVENT_TYPES: [&str; 1] = [PATIENT_CREATED];

/// Bucket an incoming `event_type` so map keys and metric labels stay bounded.
pub fn known_event_type(event_type: &str) -> &'static str {
    KNOWN_EVENT_TYPES
        .iter()
        .find(|known| **known == event_type)
        .copied()
        .unwrap_or(UNKNOWN_EVENT_TYPE)
}

#[derive(Debug, Default)]
pub struct EventTally {
    by_type: DashMap<String, u64>,
    decode_failures: AtomicU64,
}

/// Snapshot served on `/analytics/summary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TallySummary {
    pub total_events: u64,
    pub events_by_type: BTreeMap<String, u64>,
    pub decode_failures: u64,
}

impl EventTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_event(&self, event_type: &str) {
        *self
            .by_type
            .entry(known_event_type(event_type).to_string())
            .or_insert(0) += 1;
    }

    pub fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn summary(&self) -> TallySummary {
        let events_by_type: BTreeMap<String, u64> = self
            .by_type
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();

        TallySummary {
            total_events: events_by_type.values().sum(),
            events_by_type,
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_groups_by_event_type() {
        let tally = EventTally::new();
        tally.record_event("PATIENT_CREATED");
        tally.record_event("PATIENT_CREATED");
        tally.record_event("");
        tally.record_decode_failure();

        let summary = tally.summary();
        assert_eq!(summary.total_events, 3);
        assert_eq!(summary.events_by_type["PATIENT_CREATED"], 2);
        assert_eq!(summary.events_by_type[UNKNOWN_EVENT_TYPE], 1);
        assert_eq!(summary.decode_failures, 1);
    }

    #[test]
    fn test_unrecognised_types_share_one_bucket() {
        let tally = EventTally::new();
        for i in 0..50 {
            tally.record_event(&format!("CUSTOM_{}", i));
        }

        let summary = tally.summary();
        assert_eq!(summary.events_by_type.len(), 1);
        assert_eq!(summary.events_by_type[UNKNOWN_EVENT_TYPE], 50);
        assert_eq!(known_event_type("PATIENT_CREATED"), "PATIENT_CREATED");
        assert_eq!(known_event_type("patient_created"), UNKNOWN_EVENT_TYPE);
    }
}
