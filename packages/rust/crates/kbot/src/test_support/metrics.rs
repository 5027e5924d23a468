use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::telemetry::CommandMetrics;

/// Metrics sink that records every increment in order.
#[derive(Clone, Default)]
pub struct RecordingMetrics {
    increments: Arc<Mutex<Vec<String>>>,
}

impl RecordingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Labels in increment order.
    pub fn increments(&self) -> Vec<String> {
        self.increments
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn counts(&self) -> HashMap<String, u64> {
        let mut counts = HashMap::new();
        for label in self.increments() {
            *counts.entry(label).or_insert(0) += 1;
        }
        counts
    }
}

impl CommandMetrics for RecordingMetrics {
    fn increment(&self, label: &str) {
        self.increments
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(label.to_string());
    }
}
