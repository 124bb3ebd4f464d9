//! TEI header parsing into a [`BibliographicRecord`].
//!
//! Matching is by local element name so any namespace prefix (or none) is
//! accepted. Only the `teiHeader` is read; the body and the reference list are
//! skipped.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;
use tracing::trace;

use crate::record::BibliographicRecord;

/// Errors raised while reading TEI XML.
#[derive(Debug, Clone, Error)]
pub enum TeiError {
    /// The XML is not well formed
    #[error("malformed TEI XML: {reason}")]
    Malformed {
        /// Parser failure
        reason: String,
    },

    /// Well-formed XML without a `TEI` root
    #[error("response is not a TEI document")]
    NotTei,
}

/// An open element and the text collected under it so far.
#[derive(Debug, Default)]
struct Frame {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
}

impl Frame {
    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Default)]
struct PersonName {
    forenames: Vec<String>,
    surname: Option<String>,
}

impl PersonName {
    /// "forenames surname", whichever part exists, else "Unknown".
    fn display(&self) -> String {
        let forenames = self.forenames.join(" ");
        match (forenames.is_empty(), &self.surname) {
            (false, Some(surname)) => format!("{forenames} {surname}"),
            (true, Some(surname)) => surname.clone(),
            (false, None) => forenames,
            (true, None) => "Unknown".to_string(),
        }
    }
}

/// Accumulates header fields while the document streams past.
#[derive(Debug, Default)]
struct HeaderState {
    record: BibliographicRecord,
    title_stmt_authors: Vec<String>,
    analytic_authors: Vec<String>,
    person: Option<PersonName>,
    abstract_paragraphs: Vec<String>,
}

/// Parses GROBID TEI output into a record.
///
/// # Errors
///
/// Returns [`TeiError`] if the XML is malformed or has no `TEI` element.
pub fn parse_tei(xml: &str) -> Result<BibliographicRecord, TeiError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Frame> = Vec::new();
    let mut state = HeaderState::default();
    let mut saw_tei = false;
    let mut in_header = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let frame = open_frame(e)?;
                saw_tei |= frame.name == "TEI";
                in_header |= frame.name == "teiHeader";
                if in_header && frame.name == "persName" {
                    state.person = Some(PersonName::default());
                }
                stack.push(frame);
            }
            Ok(Event::Empty(ref e)) => {
                let frame = open_frame(e)?;
                saw_tei |= frame.name == "TEI";
                if in_header {
                    if frame.name == "persName" {
                        state.person = Some(PersonName::default());
                    }
                    close_frame(&frame, &stack, &mut state);
                }
            }
            Ok(Event::Text(ref e)) => {
                if in_header && let Some(top) = stack.last_mut() {
                    let text = e.unescape().map_err(|err| TeiError::Malformed {
                        reason: err.to_string(),
                    })?;
                    top.text.push_str(&text);
                }
            }
            Ok(Event::CData(ref e)) => {
                if in_header && let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Ok(Event::End(_)) => {
                let Some(frame) = stack.pop() else {
                    return Err(TeiError::Malformed {
                        reason: "unbalanced end tag".to_string(),
                    });
                };
                if in_header {
                    close_frame(&frame, &stack, &mut state);
                    if frame.name == "teiHeader" {
                        in_header = false;
                    } else if let Some(parent) = stack.last_mut() {
                        parent.text.push_str(&frame.text);
                    }
                }
            }
            Ok(Event::Eof) => {
                if let Some(open) = stack.last() {
                    return Err(TeiError::Malformed {
                        reason: format!("document ended inside <{}>", open.name),
                    });
                }
                break;
            }
            Err(e) => {
                return Err(TeiError::Malformed {
                    reason: e.to_string(),
                });
            }
            Ok(_) => {}
        }
        buf.clear();
    }

    if !saw_tei {
        return Err(TeiError::NotTei);
    }

    let HeaderState {
        mut record,
        title_stmt_authors,
        analytic_authors,
        abstract_paragraphs,
        ..
    } = state;
    record.authors = if title_stmt_authors.is_empty() {
        analytic_authors
    } else {
        title_stmt_authors
    };
    if !abstract_paragraphs.is_empty() {
        record.abstract_text = Some(abstract_paragraphs.join("\n"));
    }
    Ok(record)
}

fn open_frame(start: &BytesStart<'_>) -> Result<Frame, TeiError> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| TeiError::Malformed {
            reason: e.to_string(),
        })?;
        let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| TeiError::Malformed {
                reason: e.to_string(),
            })?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(Frame {
        name,
        attributes,
        text: String::new(),
    })
}

/// Applies a closed element to the header state. `ancestors` excludes `frame`.
fn close_frame(frame: &Frame, ancestors: &[Frame], state: &mut HeaderState) {
    let parent = ancestors.last().map(|f| f.name.as_str());
    let within = |name: &str| ancestors.iter().any(|f| f.name == name);
    let record = &mut state.record;

    match (frame.name.as_str(), parent) {
        ("title", Some("titleStmt")) if within("fileDesc") => {
            set_first(&mut record.title, &frame.text);
        }
        ("title", Some("monogr")) => set_first(&mut record.journal, &frame.text),
        ("forename", Some("persName")) => {
            if let (Some(person), Some(name)) = (state.person.as_mut(), collapse(&frame.text)) {
                person.forenames.push(name);
            }
        }
        ("surname", Some("persName")) => {
            if let Some(person) = state.person.as_mut()
                && person.surname.is_none()
            {
                person.surname = collapse(&frame.text);
            }
        }
        ("persName", Some("author")) => {
            if let Some(person) = state.person.take() {
                if within("titleStmt") {
                    state.title_stmt_authors.push(person.display());
                } else if within("analytic") {
                    state.analytic_authors.push(person.display());
                }
            }
        }
        ("biblScope", Some("monogr" | "imprint")) if within("monogr") => match frame.attribute("unit") {
            Some("volume") => set_first(&mut record.volume, &frame.text),
            Some("issue") => set_first(&mut record.issue, &frame.text),
            Some("page") => {
                if record.pages.is_none() {
                    record.pages = collapse(&frame.text).or_else(|| page_range(frame));
                }
            }
            _ => {}
        },
        ("idno", _) if within("fileDesc") => {
            if frame
                .attribute("type")
                .is_some_and(|t| t.eq_ignore_ascii_case("DOI"))
            {
                set_first(&mut record.doi, &frame.text);
            }
        }
        ("date", Some("imprint"))
            if ancestors.iter().rev().nth(1).is_some_and(|f| f.name == "monogr") =>
        {
            if record.pub_date.is_none() {
                record.pub_date = collapse(&frame.text)
                    .or_else(|| frame.attribute("when").and_then(collapse));
            }
        }
        ("term", Some("keywords")) => {
            if let Some(term) = collapse(&frame.text) {
                record.keywords.push(term);
            }
        }
        ("p", _) if within("abstract") => {
            if let Some(paragraph) = collapse(&frame.text) {
                trace!(len = paragraph.len(), "abstract paragraph");
                state.abstract_paragraphs.push(paragraph);
            }
        }
        _ => {}
    }
}

/// `from-to`, or `from` alone.
fn page_range(frame: &Frame) -> Option<String> {
    let from = frame.attribute("from").and_then(collapse)?;
    match frame.attribute("to").and_then(collapse) {
        Some(to) if to != from => Some(format!("{from}-{to}")),
        _ => Some(from),
    }
}

fn set_first(slot: &mut Option<String>, text: &str) {
    if slot.is_none() {
        *slot = collapse(text);
    }
}

/// Collapses internal whitespace; empty input becomes `None`.
fn collapse(text: &str) -> Option<String> {
    let joined = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!joined.is_empty()).then_some(joined)
}
