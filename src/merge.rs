//! Field-level merge of registry and extracted metadata.
//!
//! Registry values win whenever they are non-empty; the extracted record fills
//! the gaps. The abstract is the one exception and always comes from the
//! extracted record.

use crate::record::{BibliographicRecord, MergedRecord};

/// A metadata field value that can be empty.
///
/// Text is empty when absent or zero-length; sequences are empty when they
/// have no elements.
pub trait FieldValue: Clone + Default {
    /// Returns true if the value should be treated as absent.
    fn is_empty_value(&self) -> bool;
}

impl FieldValue for Option<String> {
    fn is_empty_value(&self) -> bool {
        self.as_deref().is_none_or(str::is_empty)
    }
}

impl FieldValue for Vec<String> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

/// Returns the first non-empty value among `sources`, in order.
///
/// When every source is empty the result is the type's default (`None` or an
/// empty sequence), never an empty-but-present value.
#[must_use]
pub fn first_non_empty<T: FieldValue>(sources: &[&T]) -> T {
    sources
        .iter()
        .find(|value| !value.is_empty_value())
        .map(|value| (*value).clone())
        .unwrap_or_default()
}

/// Merges a registry record with an extracted record.
///
/// Pure and deterministic: identical inputs always give identical output.
#[must_use]
pub fn merge(registry: &BibliographicRecord, extracted: &BibliographicRecord) -> MergedRecord {
    MergedRecord {
        title: first_non_empty(&[&registry.title, &extracted.title]),
        authors: first_non_empty(&[&registry.authors, &extracted.authors]),
        journal: first_non_empty(&[&registry.journal, &extracted.journal]),
        volume: first_non_empty(&[&registry.volume, &extracted.volume]),
        issue: first_non_empty(&[&registry.issue, &extracted.issue]),
        pages: first_non_empty(&[&registry.pages, &extracted.pages]),
        doi: first_non_empty(&[&registry.doi, &extracted.doi]),
        pub_date: first_non_empty(&[&registry.pub_date, &extracted.pub_date]),
        keywords: first_non_empty(&[&registry.keywords, &extracted.keywords]),
        // The registry never supplies a translatable abstract.
        abstract_en: extracted.abstract_text.clone(),
    }
}
