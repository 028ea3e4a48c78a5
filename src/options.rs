//! Options for the deduplication engine.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default overall-similarity threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.88;

/// Options controlling how eagerly names are merged.
///
/// All thresholds are inclusive lower bounds on a similarity ratio in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupOptions {
    /// Overall comparison-text similarity needed to merge.
    pub threshold: f64,

    /// Similarity treated as "the same string with formatting drift".
    pub near_exact_threshold: f64,

    /// Similarity between dish headlines needed to merge.
    pub headline_threshold: f64,

    /// Similarity between main-dish prefixes needed to merge.
    pub main_dish_threshold: f64,

    /// Headlines must be strictly longer than this (in characters)
    /// before headline rules may merge.
    pub min_headline_chars: usize,

    /// Whether to evaluate candidate pairs in parallel.
    pub parallel: bool,
}

impl Default for DedupOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            near_exact_threshold: 0.95,
            headline_threshold: 0.90,
            main_dish_threshold: 0.92,
            min_headline_chars: 5,
            parallel: true,
        }
    }
}

impl DedupOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that only merge on strong evidence.
    pub fn conservative() -> Self {
        Self {
            threshold: 0.93,
            near_exact_threshold: 0.97,
            headline_threshold: 0.95,
            main_dish_threshold: 0.96,
            min_headline_chars: 8,
            parallel: true,
        }
    }

    /// Options that merge more loosely worded variants.
    pub fn aggressive() -> Self {
        Self {
            threshold: 0.82,
            near_exact_threshold: 0.93,
            headline_threshold: 0.86,
            main_dish_threshold: 0.88,
            min_headline_chars: 4,
            parallel: true,
        }
    }

    /// Sets the overall similarity threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the headline similarity threshold.
    pub fn with_headline_threshold(mut self, threshold: f64) -> Self {
        self.headline_threshold = threshold;
        self
    }

    /// Sets the main-dish similarity threshold.
    pub fn with_main_dish_threshold(mut self, threshold: f64) -> Self {
        self.main_dish_threshold = threshold;
        self
    }

    /// Sets the headline length guard.
    pub fn with_min_headline_chars(mut self, chars: usize) -> Self {
        self.min_headline_chars = chars;
        self
    }

    /// Disables parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Checks that every threshold lies in `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        let thresholds = [
            ("threshold", self.threshold),
            ("near_exact_threshold", self.near_exact_threshold),
            ("headline_threshold", self.headline_threshold),
            ("main_dish_threshold", self.main_dish_threshold),
        ];

        for (name, value) in thresholds {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidOption {
                    name,
                    value,
                    reason: "must be between 0.0 and 1.0",
                });
            }
        }

        Ok(())
    }
}
