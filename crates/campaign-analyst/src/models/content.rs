//! Parsed response content: citations, cards and blocks.

use serde::{Deserialize, Serialize};

/// A source the model consulted, as carried in the `[SOURCES:...]` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationRecord {
    /// Link target.
    #[serde(default)]
    pub uri: String,

    /// Page title; may be blank.
    #[serde(default)]
    pub title: String,
}

impl CitationRecord {
    /// Create a citation record.
    #[must_use]
    pub fn new(uri: impl Into<String>, title: impl Into<String>) -> Self {
        Self { uri: uri.into(), title: title.into() }
    }

    /// Text to show for the link: the title, or the uri when the title is blank.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.title.trim().is_empty() { &self.uri } else { &self.title }
    }

    /// Whether the record has a usable reference.
    #[must_use]
    pub fn has_uri(&self) -> bool {
        !self.uri.trim().is_empty()
    }
}

/// One element of the sources array. Only web chunks carry citations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroundingChunk {
    /// Web reference, if this chunk is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<CitationRecord>,
}

/// Whether a card holds regular content or the extracted sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "citations", rename_all = "camelCase")]
pub enum CardKind {
    /// Body lines from the model response.
    Regular,
    /// The synthetic sources card.
    Citations(Vec<CitationRecord>),
}

/// One titled section of the analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentCard {
    /// Card title (text after `## `).
    pub title: String,

    /// Raw body lines, verbatim. Always empty for citation cards.
    pub body_lines: Vec<String>,

    /// Regular or citation card.
    pub kind: CardKind,
}

impl ContentCard {
    /// Title of the synthetic citation card.
    pub const SOURCES_TITLE: &'static str = "Sources";

    /// Create an empty regular card.
    #[must_use]
    pub fn regular(title: impl Into<String>) -> Self {
        Self { title: title.into(), body_lines: Vec::new(), kind: CardKind::Regular }
    }

    /// Create the sources card.
    #[must_use]
    pub fn citations(citations: Vec<CitationRecord>) -> Self {
        Self {
            title: Self::SOURCES_TITLE.to_string(),
            body_lines: Vec::new(),
            kind: CardKind::Citations(citations),
        }
    }

    /// Returns true for the sources card.
    #[must_use]
    pub const fn is_citation_card(&self) -> bool {
        matches!(self.kind, CardKind::Citations(_))
    }

    /// Citations carried by this card (empty for regular cards).
    #[must_use]
    pub fn citation_records(&self) -> &[CitationRecord] {
        match &self.kind {
            CardKind::Citations(c) => c,
            CardKind::Regular => &[],
        }
    }

    /// The body lines joined back into one text.
    #[must_use]
    pub fn body_text(&self) -> String {
        self.body_lines.join("\n")
    }
}

/// Which kind of list is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    /// `1. item`
    Ordered,
    /// `* item` or `- item`
    Unordered,
}

/// One renderable unit inside a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "camelCase")]
pub enum ContentBlock {
    /// `### ` sub-heading.
    Heading(String),
    /// Any unrecognised non-blank line.
    Paragraph(String),
    /// Consecutive numbered items.
    OrderedList(Vec<String>),
    /// Consecutive bulleted items.
    UnorderedList(Vec<String>),
}

impl ContentBlock {
    /// Build a list block of the given kind.
    #[must_use]
    pub fn list(kind: ListKind, items: Vec<String>) -> Self {
        match kind {
            ListKind::Ordered => Self::OrderedList(items),
            ListKind::Unordered => Self::UnorderedList(items),
        }
    }
}
