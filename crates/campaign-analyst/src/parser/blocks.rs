//! Card splitting and block building for the model's markdown-ish output.
//!
//! The model output is loose, inconsistently formatted markdown. Nothing here
//! fails: unrecognised syntax degrades to a paragraph.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{ContentBlock, ContentCard, ListKind};

/// Marker that starts a new card.
pub const CARD_MARKER: &str = "## ";

/// Marker for a sub-heading inside a card.
pub const HEADING_MARKER: &str = "### ";

static ORDERED_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s").expect("valid ordered-list regex"));

/// Split cleaned text into cards on `## ` lines.
///
/// Lines before the first card marker are dropped. Body lines are kept
/// verbatim, including blank lines and leading whitespace.
#[must_use]
pub fn parse_cards(text: &str) -> Vec<ContentCard> {
    let mut cards = Vec::new();
    let mut current: Option<ContentCard> = None;

    for line in text.split('\n') {
        if let Some(title) = line.strip_prefix(CARD_MARKER) {
            cards.extend(current.take());
            current = Some(ContentCard::regular(title.trim()));
        } else if let Some(card) = current.as_mut() {
            card.body_lines.push(line.to_string());
        }
    }
    cards.extend(current);

    cards
}

/// Open-list state threaded through the line scan.
#[derive(Debug, Default)]
struct ListState {
    kind: Option<ListKind>,
    items: Vec<String>,
}

impl ListState {
    /// Close the open list, if any, and emit it.
    fn flush(&mut self, blocks: &mut Vec<ContentBlock>) {
        if let Some(kind) = self.kind.take() {
            if !self.items.is_empty() {
                blocks.push(ContentBlock::list(kind, std::mem::take(&mut self.items)));
            }
        }
        self.items.clear();
    }

    /// Add an item, flushing first if a list of the other kind is open.
    fn push_item(&mut self, kind: ListKind, item: &str, blocks: &mut Vec<ContentBlock>) {
        if self.kind.is_some_and(|open| open != kind) {
            self.flush(blocks);
        }
        self.kind = Some(kind);
        self.items.push(item.to_string());
    }

    /// Append a continuation line to the last item. Returns false when no
    /// list is open.
    fn continue_item(&mut self, line: &str) -> bool {
        if self.kind.is_none() {
            return false;
        }
        match self.items.last_mut() {
            Some(last) => {
                last.push('\n');
                last.push_str(line.trim_start());
                true
            }
            None => false,
        }
    }
}

/// One classified line of card body text.
enum Line<'a> {
    Heading(&'a str),
    Item(ListKind, &'a str),
    Blank,
    Indented(&'a str),
    Text(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    if let Some(rest) = line.strip_prefix(HEADING_MARKER) {
        return Line::Heading(rest);
    }
    if let Some(rest) = line.strip_prefix("* ").or_else(|| line.strip_prefix("- ")) {
        return Line::Item(ListKind::Unordered, rest);
    }
    if let Some(marker) = ORDERED_MARKER.find(line) {
        return Line::Item(ListKind::Ordered, &line[marker.end()..]);
    }
    if line.trim().is_empty() {
        return Line::Blank;
    }
    if line.starts_with("  ") || line.starts_with('\t') {
        return Line::Indented(line);
    }
    Line::Text(line)
}

/// Build the content blocks of one card body.
#[must_use]
pub fn parse_blocks(body: &str) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();
    let mut list = ListState::default();

    for line in body.split('\n') {
        match classify(line) {
            Line::Heading(text) => {
                list.flush(&mut blocks);
                blocks.push(ContentBlock::Heading(text.to_string()));
            }
            Line::Item(kind, text) => list.push_item(kind, text, &mut blocks),
            // Blank lines neither separate blocks nor close a list.
            Line::Blank => {}
            Line::Indented(text) => {
                if !list.continue_item(text) {
                    blocks.push(ContentBlock::Paragraph(text.to_string()));
                }
            }
            Line::Text(text) => {
                list.flush(&mut blocks);
                blocks.push(ContentBlock::Paragraph(text.to_string()));
            }
        }
    }
    list.flush(&mut blocks);

    blocks
}

/// Blocks of a regular card. Citation cards have no body blocks.
#[must_use]
pub fn card_blocks(card: &ContentCard) -> Vec<ContentBlock> {
    if card.is_citation_card() {
        return Vec::new();
    }
    parse_blocks(&card.body_text())
}
