// Trailing-window statistics
// Streaming mean / sample standard deviation over the last N observations

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Mean and sample standard deviation (n − 1 denominator) of a full window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingStats {
    pub mean: f64,
    pub std_dev: f64,
}

/// Fixed-capacity window that yields statistics once it is full
#[derive(Debug, Clone)]
pub struct RollingWindow {
    values: VecDeque<f64>,
    capacity: usize,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push the newest value, evicting the oldest once full.
    ///
    /// Returns `None` until `capacity` values have been seen.
    pub fn push(&mut self, value: f64) -> Option<RollingStats> {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
        self.stats()
    }

    /// Statistics of the current window, if it is full
    pub fn stats(&self) -> Option<RollingStats> {
        // A one-element window has no sample variance
        if self.values.len() < self.capacity || self.capacity < 2 {
            return None;
        }

        let n = self.values.len() as f64;
        let mean = self.values.iter().sum::<f64>() / n;
        let variance = self
            .values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / (n - 1.0);

        Some(RollingStats {
            mean,
            std_dev: variance.sqrt(),
        })
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
