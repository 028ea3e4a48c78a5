//! Canonical-name selection.
//!
//! Every member of a duplicate group is scored on how complete and tidy its
//! clean text looks; the best-scoring raw name represents the group.

use crate::normalize::normalize;
use std::cmp::Ordering;

/// Points per word of clean text.
pub const WORD_POINTS: f64 = 2.0;

/// Bonus for "dazu", which marks a full meal description.
pub const DAZU_BONUS: f64 = 10.0;

/// Bonus for "mit".
pub const MIT_BONUS: f64 = 5.0;

/// Clean-text length that scores best.
pub const IDEAL_LENGTH: f64 = 70.0;

/// Penalty per character of distance from [`IDEAL_LENGTH`].
pub const LENGTH_PENALTY: f64 = 0.05;

/// Bonus for having no double-space artifact.
pub const NO_DOUBLE_SPACE_BONUS: f64 = 2.0;

/// Bonus for having at most [`MAX_DASHES`] dashes.
pub const FEW_DASHES_BONUS: f64 = 1.0;
pub const MAX_DASHES: usize = 2;

/// Side-dish nouns that indicate a detailed description. Case-sensitive.
pub const INGREDIENT_NOUNS: &[&str] = &["Gemüse", "Reis", "Kartoffeln", "Sauce"];
pub const INGREDIENT_BONUS: f64 = 3.0;

/// Completeness score of one clean text.
pub fn completeness_score(clean: &str) -> f64 {
    let lower = clean.to_lowercase();
    let length = clean.chars().count() as f64;

    let mut score = clean.split_whitespace().count() as f64 * WORD_POINTS;

    if lower.contains("dazu") {
        score += DAZU_BONUS;
    }
    if lower.contains("mit") {
        score += MIT_BONUS;
    }

    score -= (length - IDEAL_LENGTH).abs() * LENGTH_PENALTY;

    if !clean.contains("  ") {
        score += NO_DOUBLE_SPACE_BONUS;
    }
    if clean.matches('-').count() <= MAX_DASHES {
        score += FEW_DASHES_BONUS;
    }
    if INGREDIENT_NOUNS.iter().any(|noun| clean.contains(noun)) {
        score += INGREDIENT_BONUS;
    }

    score
}

/// A scored group member.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<'a> {
    pub raw: &'a str,
    pub clean: String,
    pub score: f64,
}

impl<'a> Candidate<'a> {
    pub fn new(raw: &'a str) -> Self {
        let clean = normalize(raw).clean;
        let score = completeness_score(&clean);
        Self { raw, clean, score }
    }

    fn clean_len(&self) -> usize {
        self.clean.chars().count()
    }
}

/// Ranks members best first: higher score, then longer clean text.
///
/// The sort is stable, so remaining ties keep group order.
pub fn rank<'a, S: AsRef<str>>(members: &'a [S]) -> Vec<Candidate<'a>> {
    let mut candidates: Vec<Candidate<'a>> = members
        .iter()
        .map(|member| Candidate::new(member.as_ref()))
        .collect();

    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.clean_len().cmp(&a.clean_len()))
    });

    candidates
}

/// Picks the canonical raw name of a group.
///
/// Returns `None` only for an empty group. The result is always one of the
/// given strings, never a synthesized one.
pub fn choose_canonical<S: AsRef<str>>(members: &[S]) -> Option<&str> {
    rank(members).first().map(|candidate| candidate.raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_score_components() {
        // 3 words (6) + mit (5) - |20 - 70| * 0.05 (2.5) + 2 + 1
        assert_close(completeness_score("Schnitzel mit Pommes"), 11.5);
        // 6 words (12) + dazu (10) + mit (5) - |30 - 70| * 0.05 (2) + 2 + 1 + Reis (3)
        assert_close(completeness_score("Gulasch mit Nudeln dazu Reis x"), 31.0);
    }

    #[test]
    fn test_penalties() {
        let tidy = completeness_score("Kartoffelsuppe mit Brot");
        let spaced = completeness_score("Kartoffelsuppe  mit Brot");
        // The extra space loses the tidiness bonus but sits 1 char closer to ideal
        assert_close(tidy - spaced, 2.0 - 0.05);

        let dashed = completeness_score("Kartoffelsuppe-mit-Brot-x");
        assert!(dashed < completeness_score("Kartoffelsuppe mit Brot x"));
    }

    #[test]
    fn test_ingredient_nouns_case_sensitive() {
        let upper = completeness_score("Gulasch Reis");
        let lower = completeness_score("Gulasch reis");
        assert_close(upper - lower, INGREDIENT_BONUS);
    }

    #[test]
    fn test_dazu_variant_wins() {
        let members = ["Putengeschnetzeltes mit Reis", "Putengeschnetzeltes dazu Reis"];
        assert_eq!(choose_canonical(&members), Some("Putengeschnetzeltes dazu Reis"));

        let reversed = ["Putengeschnetzeltes dazu Reis", "Putengeschnetzeltes mit Reis"];
        assert_eq!(choose_canonical(&reversed), Some("Putengeschnetzeltes dazu Reis"));
    }

    #[test]
    fn test_returns_raw_name() {
        let members = ["Gemüsecurry mit Reis a, c", "Gemüsecurry"];
        assert_eq!(choose_canonical(&members), Some("Gemüsecurry mit Reis a, c"));
    }

    #[test]
    fn test_ties_keep_group_order() {
        let members = ["Schnitzel mit Pommes", "Schnitzel mit Pommes a,c"];
        assert_eq!(choose_canonical(&members), Some("Schnitzel mit Pommes"));

        let swapped = ["Schnitzel mit Pommes a,c", "Schnitzel mit Pommes"];
        assert_eq!(choose_canonical(&swapped), Some("Schnitzel mit Pommes a,c"));
    }

    #[test]
    fn test_longer_wins_equal_score() {
        // 68 and 72 chars are equally far from ideal; the longer ranks first
        let short = "Kartoffeleintopf Bohneneintopf Linseneintopf Erbseneintopf Brotsuppe";
        let long = "Kartoffeleintopf Bohneneintopf Linseneintopf Erbseneintopf Brotsuppetopf";
        let names = [short, long];
        let ranked = rank(&names);
        assert_close(ranked[0].score, ranked[1].score);
        assert_eq!(ranked[0].raw, long);
    }

    #[test]
    fn test_empty_group() {
        assert!(choose_canonical::<&str>(&[]).is_none());
    }
}
