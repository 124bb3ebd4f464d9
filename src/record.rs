//! Bibliographic record types.
//!
//! Every field is independently optional. The extractor and the registry both
//! produce a [`BibliographicRecord`]; the merger combines them into a
//! [`MergedRecord`].

use serde::{Deserialize, Serialize};

/// Bibliographic metadata from a single source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibliographicRecord {
    /// Work title.
    pub title: Option<String>,
    /// Author display names in byline order.
    #[serde(default)]
    pub authors: Vec<String>,
    /// Journal or container title.
    pub journal: Option<String>,
    /// Volume.
    pub volume: Option<String>,
    /// Issue.
    pub issue: Option<String>,
    /// Page range.
    pub pages: Option<String>,
    /// DOI as reported by the source (not validated).
    pub doi: Option<String>,
    /// Publication date, format not normalized.
    pub pub_date: Option<String>,
    /// Subject keywords.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Abstract text. Only the document extractor supplies this.
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
}

impl BibliographicRecord {
    /// Returns true when the record carries a non-empty abstract.
    #[must_use]
    pub fn has_abstract(&self) -> bool {
        self.abstract_text
            .as_deref()
            .is_some_and(|text| !text.trim().is_empty())
    }

    /// Returns true when no field carries a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Canonical record produced by the merger.
///
/// Every field except `abstract_en` comes from whichever source supplied a
/// non-empty value first (registry, then extractor). `abstract_en` always comes
/// from the extracted record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedRecord {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub journal: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub pages: Option<String>,
    pub doi: Option<String>,
    pub pub_date: Option<String>,
    pub keywords: Vec<String>,
    pub abstract_en: Option<String>,
}
