//! Presentation of the final record.
//!
//! [`render_readable`] produces the console report, [`render_json`] the
//! machine-readable form printed in debug mode.

use std::fmt::Write as _;

use crate::identifier::Doi;
use crate::pipeline::PaperDigest;

const RULE_WIDTH: usize = 60;
const MISSING: &str = "-";

/// Renders the digest as a sectioned, human-readable report.
#[must_use]
pub fn render_readable(digest: &PaperDigest) -> String {
    let record = &digest.record;
    let rule = "─".repeat(RULE_WIDTH);
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "○ Paper summary");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Title       : {}", record.title.as_deref().unwrap_or(MISSING));
    let _ = writeln!(out, "Authors     : {}", record.authors.join(", "));
    let _ = writeln!(out, "Journal     : {}", record.journal.as_deref().unwrap_or(MISSING));
    let _ = writeln!(out, "Published   : {}", publication_info(digest));

    if let Some(doi) = record.doi.as_deref().filter(|doi| !doi.is_empty()) {
        match Doi::parse(doi) {
            Ok(doi) => {
                let _ = writeln!(out, "DOI         : {}", doi.url());
            }
            Err(_) => {
                let _ = writeln!(out, "DOI         : {doi}");
            }
        }
    }
    if !record.keywords.is_empty() {
        let _ = writeln!(out, "Keywords    : {}", record.keywords.join(", "));
    }

    let _ = writeln!(out, "\n○ Abstract (translated)");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "{}", digest.abstract_translated.trim());

    let _ = writeln!(out, "\n○ Summary (one line)");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "{}", digest.summary.trim());
    out
}

/// Renders the digest as pretty-printed JSON.
///
/// # Errors
///
/// Returns the serializer error; not expected for well-formed digests.
pub fn render_json(digest: &PaperDigest) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(digest)
}

/// `date / Vol. v / No. i / pp. p`, skipping absent parts.
fn publication_info(digest: &PaperDigest) -> String {
    let record = &digest.record;
    let parts = [
        record.pub_date.clone(),
        record.volume.as_ref().map(|v| format!("Vol. {v}")),
        record.issue.as_ref().map(|i| format!("No. {i}")),
        record.pages.as_ref().map(|p| format!("pp. {p}")),
    ];
    parts
        .into_iter()
        .flatten()
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" / ")
}
