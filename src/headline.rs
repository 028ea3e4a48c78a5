//! Dish headline extraction.
//!
//! The headline is the part of a name that identifies the dish itself,
//! without the list of sides: `"Wok Jakarta Gemüsemischung mit Reis"` has
//! the headline `"Wok Jakarta"`, `"Gulasch vom Rind mit Nudeln"` has
//! `"Gulasch vom Rind"`. It only feeds similarity checks, so over- or
//! under-capturing a word is harmless.

use crate::normalize::normalize;

/// Branding word of the wok line.
pub const WOK_MARKER: &str = "wok";

/// Words that introduce side dishes.
pub const SIDE_CONNECTIVES: &[&str] = &["mit", "dazu", "in", "an"];

/// Names with at most this many words are their own headline.
pub const SHORT_NAME_WORDS: usize = 3;

/// Extracts the headline from a raw dish name.
///
/// # Example
///
/// ```
/// use mealdedup::headline::dish_headline;
///
/// assert_eq!(dish_headline("Wok Jakarta Gemüsemischung mit Reis"), "Wok Jakarta");
/// assert_eq!(dish_headline("Power & Sweet Wok mit Geflügel"), "Power Sweet Wok");
/// ```
pub fn dish_headline(raw: &str) -> String {
    headline_of_clean(&normalize(raw).clean)
}

/// Extracts the headline from text that is already normalized.
pub fn headline_of_clean(clean: &str) -> String {
    let words: Vec<&str> = clean.split_whitespace().collect();

    if clean.to_lowercase().contains(WOK_MARKER) {
        if let Some(headline) = wok_headline(&words) {
            return headline;
        }
    }

    if words.len() <= SHORT_NAME_WORDS {
        return words.join(" ");
    }

    // A connective in first position cannot end a headline
    let connective = words
        .iter()
        .skip(1)
        .position(|word| SIDE_CONNECTIVES.contains(&word.to_lowercase().as_str()));

    match connective {
        Some(pos) => words[..=pos].join(" "),
        None => words[..SHORT_NAME_WORDS].join(" "),
    }
}

/// Wok dishes are named `Wok <Style>` or `<Qualifier> Wok`.
///
/// Only the first standalone "Wok" counts. A lone leading "Wok" with nothing
/// after it yields `None` and the generic rules apply.
fn wok_headline(words: &[&str]) -> Option<String> {
    let wok_idx = words
        .iter()
        .position(|word| word.eq_ignore_ascii_case(WOK_MARKER))?;

    match wok_idx {
        0 if words.len() > 1 => Some(words[..2].join(" ")),
        0 => None,
        idx => Some(words[..=idx].join(" ")),
    }
}
