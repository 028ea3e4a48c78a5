//! # mealdedup
//!
//! Duplicate detection for dish names scraped from weekly cafeteria menus.
//!
//! The same dish shows up under many spellings: different allergen-code
//! suffixes, stray punctuation, with or without its sides, `ä` or `ae`.
//! This crate decides which strings denote the same dish and picks one of
//! them as the canonical name.
//!
//! ## Pipeline
//!
//! 1. [`normalize`]: strip allergen codes and punctuation, fold diacritics
//! 2. [`headline`]: the dish identity without its side dishes
//! 3. [`protein`]: coarse protein tag, used to veto merges
//! 4. [`similarity`]: sequence-matching ratio
//! 5. [`rules`]: ordered rule chain answering "same dish?"
//! 6. [`cluster`]: seed-driven grouping of a whole batch
//! 7. [`canonical`]: completeness scoring to pick the representative
//! 8. [`mapping`]: groups and the old -> canonical mapping
//!
//! ## Quick Start
//!
//! ```
//! use mealdedup::Deduplicator;
//!
//! let report = Deduplicator::new().run([
//!     "Schnitzel mit Pommes a,c",
//!     "Schnitzel mit Pommes",
//!     "Fischfilet mit Reis b",
//! ]);
//!
//! assert_eq!(report.groups.len(), 1);
//! assert_eq!(
//!     report.mapping.get("Schnitzel mit Pommes a,c"),
//!     Some("Schnitzel mit Pommes")
//! );
//! ```
//!
//! ## Features
//!
//! - `async`: Tokio wrappers that run the engine on the blocking pool
//! - `python`: PyO3 bindings

pub mod apply;
pub mod canonical;
pub mod cluster;
pub mod error;
pub mod headline;
pub mod mapping;
pub mod normalize;
pub mod options;
pub mod preview;
pub mod protein;
pub mod rules;
pub mod similarity;
pub mod stats;

#[cfg(feature = "async")]
pub mod async_api;

#[cfg(feature = "python")]
mod python;

// Re-exports
pub use apply::{apply_mapping, ApplyMode, ApplyOutcome, ApplyReport, MealId, MealStore, MemoryStore};
pub use canonical::choose_canonical;
pub use error::{Error, Result};
pub use headline::dish_headline;
pub use mapping::{CanonicalMapping, DedupReport, DuplicateGroup};
pub use normalize::{normalize, NormalizedForm};
pub use options::{DedupOptions, DEFAULT_THRESHOLD};
pub use preview::{render_preview, PreviewOptions};
pub use protein::{protein_tag, ProteinTag};
pub use rules::{are_duplicates, explain, Decision, RuleId};
pub use similarity::similarity;
pub use stats::BatchStats;

use std::collections::BTreeSet;
use std::path::Path;

/// Finds duplicate groups in a batch with default options.
///
/// # Example
///
/// ```
/// let report = mealdedup::deduplicate(["Gulasch mit Spätzle", "Gulasch mit Spaetzle a"]);
/// assert_eq!(report.merge_count(), 1);
/// ```
pub fn deduplicate<I, S>(names: I) -> DedupReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Deduplicator::new().run(names)
}

/// Finds duplicate groups with a custom overall-similarity threshold.
///
/// Fails if the threshold is outside `[0, 1]`.
pub fn deduplicate_with_threshold<I, S>(names: I, threshold: f64) -> Result<DedupReport>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Deduplicator::new().with_threshold(threshold).try_run(names)
}

/// Reads a batch of names from text.
///
/// A leading `[` means a JSON array of strings; anything else is one name
/// per line, with blank lines skipped.
pub fn parse_names(input: &str) -> Result<Vec<String>> {
    if input.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(input)?);
    }

    Ok(input
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect())
}

/// Reads a batch of names from a file. See [`parse_names`].
pub fn read_names(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    parse_names(&content)
}

/// Builder for deduplication runs.
///
/// # Example
///
/// ```
/// use mealdedup::Deduplicator;
///
/// let report = Deduplicator::new()
///     .with_threshold(0.9)
///     .sequential()
///     .try_run(["Wok Jakarta mit Reis", "Wok Jakarta Gemüsemischung"])?;
/// assert_eq!(report.groups.len(), 1);
/// # Ok::<(), mealdedup::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Deduplicator {
    options: DedupOptions,
}

impl Deduplicator {
    /// Creates a new deduplicator with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a deduplicator from existing options.
    pub fn with_options(options: DedupOptions) -> Self {
        Self { options }
    }

    /// Sets the overall similarity threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.options.threshold = threshold;
        self
    }

    /// Disables parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    pub fn options(&self) -> &DedupOptions {
        &self.options
    }

    /// Validates the options, then runs.
    pub fn try_run<I, S>(&self, names: I) -> Result<DedupReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.options.validate()?;
        Ok(self.run(names))
    }

    /// Groups the batch and picks canonical names.
    ///
    /// The batch is de-duplicated by exact string and sorted first, so the
    /// result does not depend on input order and re-running is idempotent.
    pub fn run<I, S>(&self, names: I) -> DedupReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let profiles = cluster::profile_batch(&names, &self.options);
        let index_groups = cluster::build_groups(&profiles, &self.options);

        let groups = index_groups
            .into_iter()
            .filter_map(|group| {
                let members: Vec<String> = group
                    .members
                    .iter()
                    .map(|&idx| names[idx].clone())
                    .collect();
                let canonical = choose_canonical(&members)?.to_string();
                Some(DuplicateGroup { members, canonical })
            })
            .collect();

        DedupReport::new(names.len(), groups)
    }

    /// Explains the decision for one pair under these options.
    pub fn explain(&self, name1: &str, name2: &str) -> Decision {
        rules::explain(name1, name2, &self.options)
    }
}
