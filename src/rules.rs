//! The duplicate predicate.
//!
//! "Are these two names the same dish" is decided by an ordered chain of
//! rules. Each rule either vetoes, merges, or passes to the next one; the
//! first rule that does not pass decides. Cheap exact checks run first, then
//! each later rule relaxes matching along a different axis: character noise,
//! headline identity, overall similarity, main-dish identity.

use crate::headline::headline_of_clean;
use crate::normalize::{fold_german, normalize, NormalizedForm};
use crate::options::DedupOptions;
use crate::protein::{protein_tag, ProteinTag};
use crate::similarity::similarity;
use serde::Serialize;
use std::fmt;

/// Everything the rules need to know about one name, computed once.
#[derive(Debug, Clone, Serialize)]
pub struct DishProfile {
    /// The raw input string.
    pub raw: String,
    pub form: NormalizedForm,
    /// Headline, lower-cased and diacritic-folded.
    pub headline: String,
    pub protein: ProteinTag,
    /// Comparison text before the first separator.
    pub main_dish: String,
}

impl DishProfile {
    pub fn new(raw: &str) -> Self {
        let form = normalize(raw);
        let headline = fold_german(&headline_of_clean(&form.clean));
        let protein = protein_tag(&form.comparison);
        let main_dish = split_main_dish(&form.comparison).0.to_string();

        Self {
            raw: raw.to_string(),
            form,
            headline,
            protein,
            main_dish,
        }
    }

    fn headline_chars(&self) -> usize {
        self.headline.chars().count()
    }
}

/// Words and punctuation that start the side-dish part of a name.
pub const MAIN_DISH_SEPARATORS: &[&str] = &["dazu", "mit", "und", ",", "an", "in", "auf"];

/// Splits comparison text into `(main, sides)` at the earliest separator.
///
/// Each separator is located by its first occurrence as a plain substring;
/// an occurrence at position 0 does not count. The earliest remaining
/// position across all separators wins.
pub fn split_main_dish(text: &str) -> (&str, &str) {
    let split_at = MAIN_DISH_SEPARATORS
        .iter()
        .filter_map(|separator| text.find(separator))
        .filter(|&pos| pos > 0)
        .min()
        .unwrap_or(text.len());

    (text[..split_at].trim(), text[split_at..].trim())
}

// ============================================================================
// Rules
// ============================================================================

/// Identifies the rule that decided a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    EmptyName,
    ProteinVeto,
    ExactMatch,
    NearExact,
    HeadlineEqual,
    HeadlineSimilar,
    OverallSimilarity,
    MainDishSimilarity,
}

impl RuleId {
    pub fn description(self) -> &'static str {
        match self {
            RuleId::EmptyName => "one name is empty after normalization",
            RuleId::ProteinVeto => "declared proteins differ",
            RuleId::ExactMatch => "comparison texts are equal",
            RuleId::NearExact => "comparison texts differ only by formatting noise",
            RuleId::HeadlineEqual => "dish headlines are equal",
            RuleId::HeadlineSimilar => "dish headlines are nearly equal",
            RuleId::OverallSimilarity => "comparison texts are similar",
            RuleId::MainDishSimilarity => "main dishes are nearly equal",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// What a single rule concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Definitely different; stop.
    Veto,
    /// Definitely the same; stop.
    Merge,
    /// No opinion; ask the next rule.
    Pass,
}

type RuleFn = fn(&DishProfile, &DishProfile, &DedupOptions) -> Verdict;

/// One link of the chain.
pub struct Rule {
    pub id: RuleId,
    check: RuleFn,
}

impl Rule {
    pub fn check(&self, a: &DishProfile, b: &DishProfile, options: &DedupOptions) -> Verdict {
        (self.check)(a, b, options)
    }
}

/// The chain, in evaluation order.
pub const RULES: &[Rule] = &[
    Rule { id: RuleId::EmptyName, check: empty_name },
    Rule { id: RuleId::ProteinVeto, check: protein_veto },
    Rule { id: RuleId::ExactMatch, check: exact_match },
    Rule { id: RuleId::NearExact, check: near_exact },
    Rule { id: RuleId::HeadlineEqual, check: headline_equal },
    Rule { id: RuleId::HeadlineSimilar, check: headline_similar },
    Rule { id: RuleId::OverallSimilarity, check: overall_similarity },
    Rule { id: RuleId::MainDishSimilarity, check: main_dish_similarity },
];

fn merge_if(condition: bool) -> Verdict {
    if condition {
        Verdict::Merge
    } else {
        Verdict::Pass
    }
}

/// Code-only or blank names never join a group.
fn empty_name(a: &DishProfile, b: &DishProfile, _: &DedupOptions) -> Verdict {
    if a.form.is_empty() || b.form.is_empty() {
        Verdict::Veto
    } else {
        Verdict::Pass
    }
}

fn protein_veto(a: &DishProfile, b: &DishProfile, _: &DedupOptions) -> Verdict {
    if a.protein.conflicts_with(b.protein) {
        Verdict::Veto
    } else {
        Verdict::Pass
    }
}

fn exact_match(a: &DishProfile, b: &DishProfile, _: &DedupOptions) -> Verdict {
    merge_if(a.form.comparison == b.form.comparison)
}

fn near_exact(a: &DishProfile, b: &DishProfile, options: &DedupOptions) -> Verdict {
    merge_if(similarity(&a.form.comparison, &b.form.comparison) >= options.near_exact_threshold)
}

fn headline_equal(a: &DishProfile, b: &DishProfile, options: &DedupOptions) -> Verdict {
    merge_if(a.headline == b.headline && a.headline_chars() > options.min_headline_chars)
}

/// Only the first headline is length-checked. During clustering `a` is the
/// seed, so this rule is the one place where argument order matters.
fn headline_similar(a: &DishProfile, b: &DishProfile, options: &DedupOptions) -> Verdict {
    merge_if(
        a.headline_chars() > options.min_headline_chars
            && similarity(&a.headline, &b.headline) >= options.headline_threshold,
    )
}

fn overall_similarity(a: &DishProfile, b: &DishProfile, options: &DedupOptions) -> Verdict {
    merge_if(similarity(&a.form.comparison, &b.form.comparison) >= options.threshold)
}

fn main_dish_similarity(a: &DishProfile, b: &DishProfile, options: &DedupOptions) -> Verdict {
    merge_if(similarity(&a.main_dish, &b.main_dish) >= options.main_dish_threshold)
}

// ============================================================================
// Evaluation
// ============================================================================

/// Outcome of comparing two names, with the rule that settled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub duplicate: bool,
    /// `None` when every rule passed.
    pub rule: Option<RuleId>,
}

impl Decision {
    pub fn is_duplicate(&self) -> bool {
        self.duplicate
    }
}

/// Runs the rule chain over two precomputed profiles.
pub fn evaluate(a: &DishProfile, b: &DishProfile, options: &DedupOptions) -> Decision {
    for rule in RULES {
        match rule.check(a, b, options) {
            Verdict::Pass => continue,
            Verdict::Merge => {
                return Decision {
                    duplicate: true,
                    rule: Some(rule.id),
                }
            }
            Verdict::Veto => {
                return Decision {
                    duplicate: false,
                    rule: Some(rule.id),
                }
            }
        }
    }

    Decision {
        duplicate: false,
        rule: None,
    }
}

/// Compares two raw names and reports which rule decided.
pub fn explain(name1: &str, name2: &str, options: &DedupOptions) -> Decision {
    evaluate(&DishProfile::new(name1), &DishProfile::new(name2), options)
}

/// True if the two raw names denote the same dish.
///
/// # Example
///
/// ```
/// use mealdedup::{are_duplicates, DedupOptions};
///
/// let options = DedupOptions::default();
/// assert!(are_duplicates("Schnitzel mit Pommes a,c", "Schnitzel mit Pommes", &options));
/// assert!(!are_duplicates("Hähnchen Curry mit Reis", "Rind Curry mit Reis", &options));
/// ```
pub fn are_duplicates(name1: &str, name2: &str, options: &DedupOptions) -> bool {
    explain(name1, name2, options).is_duplicate()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decide(a: &str, b: &str) -> Decision {
        explain(a, b, &DedupOptions::default())
    }

    fn profile(raw: &str) -> DishProfile {
        DishProfile::new(raw)
    }

    #[test]
    fn test_rule_order() {
        let ids: Vec<RuleId> = RULES.iter().map(|rule| rule.id).collect();
        assert_eq!(
            ids,
            vec![
                RuleId::EmptyName,
                RuleId::ProteinVeto,
                RuleId::ExactMatch,
                RuleId::NearExact,
                RuleId::HeadlineEqual,
                RuleId::HeadlineSimilar,
                RuleId::OverallSimilarity,
                RuleId::MainDishSimilarity,
            ]
        );
    }

    #[test]
    fn test_protein_veto_beats_similarity() {
        let decision = decide("Hähnchen Curry mit Reis", "Rind Curry mit Reis");
        assert!(!decision.duplicate);
        assert_eq!(decision.rule, Some(RuleId::ProteinVeto));

        // Nearly identical text, opposite proteins
        let a = "Geschnetzeltes vom Rind in Rahmsauce mit Spätzle";
        let b = "Geschnetzeltes vom Huhn in Rahmsauce mit Spätzle";
        assert!(similarity(&comparison(a), &comparison(b)) >= 0.9);
        assert_eq!(decide(a, b).rule, Some(RuleId::ProteinVeto));
    }

    fn comparison(raw: &str) -> String {
        profile(raw).form.comparison
    }

    #[test]
    fn test_unspecified_protein_does_not_veto() {
        let decision = decide("Currywurst mit Pommes", "Currywurst vom Schwein mit Pommes");
        assert_ne!(decision.rule, Some(RuleId::ProteinVeto));
    }

    #[test]
    fn test_empty_names_never_merge() {
        assert_eq!(decide("a, c", "b1 3").rule, Some(RuleId::EmptyName));
        assert!(!decide("", "").duplicate);
        assert!(!decide("a", "Schnitzel").duplicate);
    }

    #[test]
    fn test_exact_after_normalization() {
        let decision = decide("Schnitzel mit Pommes a,c", "Schnitzel mit Pommes");
        assert!(decision.duplicate);
        assert_eq!(decision.rule, Some(RuleId::ExactMatch));

        assert_eq!(
            decide("Gulasch mit Spätzle", "Gulasch mit Spaetzle").rule,
            Some(RuleId::ExactMatch)
        );
    }

    #[test]
    fn test_near_exact() {
        let decision = decide(
            "Kartoffelgratin mit Blattsalat",
            "Kartoffelgratin mit Blattsalaat",
        );
        assert_eq!(decision.rule, Some(RuleId::NearExact));
    }

    #[test]
    fn test_headline_equal_needs_length() {
        // Same wok line, different sides
        let decision = decide(
            "Wok Jakarta Gemüsemischung mit Reis",
            "Wok Jakarta mit gebratenen Nudeln",
        );
        assert_eq!(decision.rule, Some(RuleId::HeadlineEqual));

        // A five-character headline is too short to merge on
        let short = evaluate(
            &profile("Pizza mit Salami und Oliven"),
            &profile("Pizza mit Thunfisch und Zwiebeln"),
            &DedupOptions::default(),
        );
        assert_ne!(short.rule, Some(RuleId::HeadlineEqual));
    }

    #[test]
    fn test_headline_similar() {
        let decision = decide(
            "Wok Bangkok mit Gemüse und Reis",
            "Wok Bankok dazu gebratene Nudeln scharf",
        );
        assert!(decision.duplicate);
        assert_eq!(decision.rule, Some(RuleId::HeadlineSimilar));
    }

    #[test]
    fn test_headline_similar_guards_first_headline_only() {
        // "Piizza" (6 chars) vs "Pizza" (5 chars), similarity 10/11
        let long = "Piizza mit Salami und Oliven Extra";
        let short = "Pizza mit Thunfisch und Zwiebeln Scharf";

        let decision = decide(long, short);
        assert!(decision.duplicate);
        assert_eq!(decision.rule, Some(RuleId::HeadlineSimilar));

        // With the short headline first the rule does not fire
        let reversed = decide(short, long);
        assert_ne!(reversed.rule, Some(RuleId::HeadlineSimilar));
        assert!(!reversed.duplicate);
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        let options = DedupOptions::default();

        let at = (format!("{}abc", "x".repeat(22)), format!("{}def", "x".repeat(22)));
        let decision = explain(&at.0, &at.1, &options);
        assert!(decision.duplicate);
        assert_eq!(decision.rule, Some(RuleId::OverallSimilarity));

        let below = (
            format!("{}abcdefghijklm", "x".repeat(87)),
            format!("{}nopqrstuvwxyz", "x".repeat(87)),
        );
        assert!(!are_duplicates(&below.0, &below.1, &options));
        assert!(are_duplicates(&below.0, &below.1, &options.clone().with_threshold(0.87)));
    }

    #[test]
    fn test_split_main_dish() {
        assert_eq!(
            split_main_dish("currywurst dazu pommes"),
            ("currywurst", "dazu pommes")
        );
        // Plain substring search: "in" inside "rinder" comes first
        assert_eq!(
            split_main_dish("rinderroulade mit rotkohl"),
            ("r", "inderroulade mit rotkohl")
        );
        assert_eq!(split_main_dish("gemuesepfanne"), ("gemuesepfanne", ""));
        // Position 0 is ignored
        assert_eq!(split_main_dish("und dann"), ("und d", "ann"));
    }

    #[test]
    fn test_main_dish_similarity() {
        // Headline "Pizza" is too short, but the main dishes agree
        let decision = decide("Pizza mit Salami und Oliven", "Pizza mit Thunfisch und Zwiebeln");
        assert!(decision.duplicate);
        assert_eq!(decision.rule, Some(RuleId::MainDishSimilarity));
    }

    #[test]
    fn test_distinct_dishes_stay_apart() {
        assert!(!decide("Fischfilet mit Reis b", "Currywurst dazu Pommes a").duplicate);
        assert!(!decide("Schnitzel mit Pommes", "Currywurst dazu Pommes").duplicate);
        assert_eq!(decide("Kartoffelsuppe", "Linseneintopf").rule, None);
    }
}
