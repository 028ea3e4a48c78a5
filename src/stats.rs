//! Descriptive statistics over a batch of names.
//!
//! Useful before a run to see how noisy the data is: how many names carry
//! allergen codes, which are not dishes at all, and how many collapse to the
//! same comparison text outright.

use crate::normalize::normalize;
use crate::protein::{protein_tag, ProteinTag};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Number of top words kept by [`BatchStats::collect`].
pub const DEFAULT_TOP_WORDS: usize = 20;

/// Substrings marking entries that are not dishes (closures, holidays).
/// Matched case-insensitively.
pub const NON_MEAL_MARKERS: &[&str] = &[
    "Feiertag",
    "geschlossen",
    "Mensa",
    "Kiosk",
    "Weihnachten",
    "Ferien",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// Name lengths in characters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LengthStats {
    pub min: usize,
    pub max: usize,
    pub mean: f64,
    /// Upper median for even counts.
    pub median: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchStats {
    pub total: usize,
    pub with_allergen_codes: usize,
    pub top_words: Vec<WordCount>,
    /// `None` for an empty batch.
    pub length: Option<LengthStats>,
    pub proteins: BTreeMap<ProteinTag, usize>,
    /// Hits per marker, in [`NON_MEAL_MARKERS`] order, zero counts omitted.
    pub non_meal_markers: Vec<WordCount>,
    /// Comparison texts shared by more than one name.
    pub collision_groups: usize,
    /// Names involved in those collisions.
    pub collided_names: usize,
}

impl BatchStats {
    pub fn collect<S: AsRef<str>>(names: &[S]) -> Self {
        Self::collect_with_top(names, DEFAULT_TOP_WORDS)
    }

    /// Collects statistics keeping the `top` most frequent words.
    pub fn collect_with_top<S: AsRef<str>>(names: &[S], top: usize) -> Self {
        let mut with_allergen_codes = 0;
        let mut words: HashMap<String, usize> = HashMap::new();
        let mut proteins = BTreeMap::new();
        let mut by_comparison: HashMap<String, usize> = HashMap::new();
        let mut lengths = Vec::with_capacity(names.len());

        for name in names {
            let name = name.as_ref();
            let form = normalize(name);

            if !form.allergen_codes.is_empty() {
                with_allergen_codes += 1;
            }
            for word in name.to_lowercase().split_whitespace() {
                *words.entry(word.to_string()).or_default() += 1;
            }
            *proteins.entry(protein_tag(name)).or_default() += 1;
            *by_comparison.entry(form.comparison).or_default() += 1;
            lengths.push(name.chars().count());
        }

        let (collision_groups, collided_names) = by_comparison
            .values()
            .filter(|&&count| count > 1)
            .fold((0, 0), |(groups, total), &count| (groups + 1, total + count));

        Self {
            total: names.len(),
            with_allergen_codes,
            top_words: top_words(words, top),
            length: length_stats(lengths),
            proteins,
            non_meal_markers: count_markers(names),
            collision_groups,
            collided_names,
        }
    }
}

/// Most frequent first; equal counts in alphabetical order.
fn top_words(words: HashMap<String, usize>, top: usize) -> Vec<WordCount> {
    let mut counts: Vec<WordCount> = words
        .into_iter()
        .map(|(word, count)| WordCount { word, count })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    counts.truncate(top);
    counts
}

fn length_stats(mut lengths: Vec<usize>) -> Option<LengthStats> {
    if lengths.is_empty() {
        return None;
    }
    lengths.sort_unstable();

    Some(LengthStats {
        min: lengths[0],
        max: lengths[lengths.len() - 1],
        mean: lengths.iter().sum::<usize>() as f64 / lengths.len() as f64,
        median: lengths[lengths.len() / 2],
    })
}

fn count_markers<S: AsRef<str>>(names: &[S]) -> Vec<WordCount> {
    let lowered: Vec<String> = names.iter().map(|n| n.as_ref().to_lowercase()).collect();

    NON_MEAL_MARKERS
        .iter()
        .filter_map(|marker| {
            let needle = marker.to_lowercase();
            let count = lowered.iter().filter(|name| name.contains(&needle)).count();
            (count > 0).then(|| WordCount {
                word: marker.to_string(),
                count,
            })
        })
        .collect()
}
