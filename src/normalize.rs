//! # Name Normalization
//!
//! Turns a raw dish name scraped from a menu document into the forms used by
//! the rest of the engine.
//!
//! ## Pipeline Stages
//!
//! 1. **Stage 1: Unicode** - NFC normalization so decomposed umlauts behave like precomposed ones
//! 2. **Stage 2: Code Stripping** - allergen/additive codes (`a`, `b1`, `3`) are collected and removed
//! 3. **Stage 3: Punctuation** - parenthesized asides, commas, `&` and dashes become spaces
//! 4. **Stage 4: Folding** - lower-casing and German diacritic folding for the comparison form

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// The derived forms of one raw dish name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NormalizedForm {
    /// Lower-cased, diacritic-folded, code-free text. Only used for comparison.
    pub comparison: String,
    /// Display-safe text with original casing and diacritics, codes stripped.
    pub clean: String,
    /// Allergen/additive codes found in the raw name.
    pub allergen_codes: BTreeSet<String>,
}

impl NormalizedForm {
    /// True if nothing but codes and punctuation was left.
    pub fn is_empty(&self) -> bool {
        self.clean.is_empty()
    }

    /// Number of whitespace-separated words in the clean text.
    pub fn word_count(&self) -> usize {
        self.clean.split_whitespace().count()
    }
}

// ============================================================================
// Stage 1 + 2: Unicode and Code Stripping
// ============================================================================

static RE_SEPARATOR_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,\s]+").expect("valid separator regex"));

/// A single lower-case letter with an optional digit, or a bare digit.
static RE_ALLERGEN_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[a-z][0-9]?|[0-9])$").expect("valid code regex"));

/// Removes allergen codes bounded by commas, whitespace or the string edges.
///
/// Every removed code is replaced with a single space; the separators around
/// it are kept and collapsed later.
pub fn strip_allergen_codes(input: &str, codes: &mut BTreeSet<String>) -> String {
    let mut result = String::with_capacity(input.len());
    let mut token_start = 0;

    let mut push_token = |token: &str, result: &mut String| {
        if RE_ALLERGEN_CODE.is_match(token) {
            codes.insert(token.to_lowercase());
            result.push(' ');
        } else {
            result.push_str(token);
        }
    };

    for separator in RE_SEPARATOR_RUN.find_iter(input) {
        push_token(&input[token_start..separator.start()], &mut result);
        result.push_str(separator.as_str());
        token_start = separator.end();
    }
    push_token(&input[token_start..], &mut result);

    result
}

// ============================================================================
// Stage 3: Punctuation
// ============================================================================

static RE_PARENTHESIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("valid parentheses regex"));

static RE_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*,+\s*").expect("valid comma regex"));

static RE_AMPERSAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*&+\s*").expect("valid ampersand regex"));

static RE_DASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*-+\s*").expect("valid dash regex"));

static RE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

static RE_EDGE_NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\s,\-]+|[\s,\-]+$").expect("valid edge regex"));

/// Removes asides and separator punctuation, leaving single-spaced words.
pub fn strip_punctuation(input: &str) -> String {
    let text = RE_PARENTHESIZED.replace_all(input, " ");
    let text = RE_COMMA.replace_all(&text, " ");
    let text = RE_AMPERSAND.replace_all(&text, " ");
    let text = RE_DASH.replace_all(&text, " ");
    let text = collapse_whitespace(&text);
    RE_EDGE_NOISE.replace_all(&text, "").into_owned()
}

/// Collapses whitespace runs to one space and trims the ends.
pub fn collapse_whitespace(input: &str) -> String {
    RE_WHITESPACE.replace_all(input, " ").trim().to_string()
}

// ============================================================================
// Stage 4: Folding
// ============================================================================

/// German diacritics and their ASCII spellings.
pub const GERMAN_FOLDS: &[(char, &str)] = &[('ä', "ae"), ('ö', "oe"), ('ü', "ue"), ('ß', "ss")];

/// Lower-cases `input` and spells out German diacritics.
///
/// `"Spätzle"` and `"Spaetzle"` fold to the same string.
pub fn fold_german(input: &str) -> String {
    let mut result = String::with_capacity(input.len() + 8);

    for c in input.nfc().flat_map(char::to_lowercase) {
        match GERMAN_FOLDS.iter().find(|(umlaut, _)| *umlaut == c) {
            Some((_, spelled)) => result.push_str(spelled),
            None => result.push(c),
        }
    }

    result
}

// ============================================================================
// Main Pipeline
// ============================================================================

/// Normalizes a raw dish name.
///
/// Never fails: empty or code-only input yields an empty [`NormalizedForm`].
///
/// # Example
///
/// ```
/// use mealdedup::normalize::normalize;
///
/// let form = normalize("Currywurst a b1, 3");
/// assert_eq!(form.clean, "Currywurst");
/// assert_eq!(form.comparison, "currywurst");
/// assert_eq!(form.allergen_codes.len(), 3);
/// ```
pub fn normalize(raw: &str) -> NormalizedForm {
    if raw.trim().is_empty() {
        return NormalizedForm::default();
    }

    // Stage 1: Unicode
    let composed: String = raw.nfc().collect();

    // Stage 2: Code stripping
    let mut allergen_codes = BTreeSet::new();
    let without_codes = strip_allergen_codes(&composed, &mut allergen_codes);

    // Stage 3: Punctuation
    let clean = strip_punctuation(&without_codes);

    // Stage 4: Folding
    let comparison = collapse_whitespace(&fold_german(&clean));

    NormalizedForm {
        comparison,
        clean,
        allergen_codes,
    }
}

/// Shorthand for `normalize(raw).comparison`.
pub fn comparison_text(raw: &str) -> String {
    normalize(raw).comparison
}

/// Shorthand for `normalize(raw).clean`.
pub fn clean_text(raw: &str) -> String {
    normalize(raw).clean
}
