//! Card rendering.
//!
//! [`View`] is the renderer-neutral projection of parsed cards. It is turned
//! into HTML for the browser, SVG for raster capture, or Markdown for the
//! terminal.

mod html;
mod markdown;
mod svg;

pub use html::render_html;
pub use markdown::render_markdown;
pub use svg::{SVG_WIDTH, SvgDocument, render_svg};

use serde::Serialize;

use crate::models::{CardKind, CitationRecord, ContentBlock, ContentCard};
use crate::parser::card_blocks;

/// Notice shown when the response had no cards and no citations.
pub const NO_DATA_MESSAGE: &str =
    "No analysis data to display. The AI might not have provided a response in the expected format.";

/// What a card displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "items", rename_all = "camelCase")]
pub enum CardBody {
    /// Parsed content blocks of a regular card.
    Blocks(Vec<ContentBlock>),
    /// Outbound links of the sources card.
    Links(Vec<CitationRecord>),
}

/// One card ready to draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    /// Card title.
    pub title: String,
    /// Card content.
    pub body: CardBody,
}

/// The rendered analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "cards", rename_all = "camelCase")]
pub enum View {
    /// Nothing renderable came back.
    NoData,
    /// Cards in order, sources card last.
    Cards(Vec<CardView>),
}

impl View {
    /// Project parsed cards into a view.
    #[must_use]
    pub fn from_cards(cards: &[ContentCard]) -> Self {
        if cards.is_empty() {
            return Self::NoData;
        }
        Self::Cards(
            cards
                .iter()
                .map(|card| CardView {
                    title: card.title.clone(),
                    body: match &card.kind {
                        CardKind::Regular => CardBody::Blocks(card_blocks(card)),
                        CardKind::Citations(records) => CardBody::Links(records.clone()),
                    },
                })
                .collect(),
        )
    }

    /// Returns true for the no-data notice.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::NoData)
    }
}

/// Escape text for HTML and SVG content and attribute values.
///
/// Characters XML 1.0 does not allow (C0 controls other than tab, newline
/// and carriage return, and the U+FFFE/U+FFFF non-characters) are dropped.
#[must_use]
pub fn escape_markup(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\t' | '\n' | '\r' => out.push(c),
            '\u{0}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}' => {}
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
