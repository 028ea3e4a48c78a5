//! Coarse protein classification.
//!
//! Two names that declare different proteins are never the same dish, no
//! matter how alike the rest of the text is. Matching is a loose substring
//! test: a false positive only blocks a merge.

use crate::normalize::fold_german;
use serde::Serialize;
use std::fmt;

/// Protein category declared by a dish name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProteinTag {
    Beef,
    Pork,
    Poultry,
    Lamb,
    Fish,
    /// Nothing declared. Never conflicts with any other tag.
    #[default]
    None,
}

impl ProteinTag {
    /// True if the two tags veto a merge.
    pub fn conflicts_with(self, other: ProteinTag) -> bool {
        self != ProteinTag::None && other != ProteinTag::None && self != other
    }

    pub fn is_none(self) -> bool {
        self == ProteinTag::None
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProteinTag::Beef => "beef",
            ProteinTag::Pork => "pork",
            ProteinTag::Poultry => "poultry",
            ProteinTag::Lamb => "lamb",
            ProteinTag::Fish => "fish",
            ProteinTag::None => "none",
        }
    }
}

impl fmt::Display for ProteinTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword groups in priority order; the first group with a hit wins.
pub const PROTEIN_KEYWORDS: &[(ProteinTag, &[&str])] = &[
    (ProteinTag::Beef, &["rind", "rindfleisch", "beef"]),
    (ProteinTag::Pork, &["schwein", "schweinefleisch", "pork"]),
    (
        ProteinTag::Poultry,
        &["hähnchen", "huhn", "hühnchen", "geflügel", "pute", "chicken", "poultry"],
    ),
    (ProteinTag::Lamb, &["lamm", "lammfleisch", "lamb"]),
    (ProteinTag::Fish, &["fisch", "fish", "lachs", "seelachs", "thunfisch"]),
];

/// Classifies `text` by the first keyword group it mentions.
///
/// Both text and keywords are lower-cased and diacritic-folded first, so raw
/// names and comparison text classify alike.
pub fn protein_tag(text: &str) -> ProteinTag {
    let folded = fold_german(text);

    PROTEIN_KEYWORDS
        .iter()
        .find(|(_, keywords)| {
            keywords
                .iter()
                .any(|keyword| folded.contains(&fold_german(keyword)))
        })
        .map(|(tag, _)| *tag)
        .unwrap_or(ProteinTag::None)
}
