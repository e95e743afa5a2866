//! Response parsing pipeline.
//!
//! raw text → [`extract_citations`] → [`parse_cards`] → [`parse_blocks`] per card.

mod blocks;
mod citations;

pub use blocks::{CARD_MARKER, HEADING_MARKER, card_blocks, parse_blocks, parse_cards};
pub use citations::{Extraction, SOURCES_MARKER, extract_citations};

use crate::models::ContentCard;

/// Parse a raw model response into cards, appending the sources card when
/// any citations were found.
#[must_use]
pub fn parse_analysis(raw: &str) -> Vec<ContentCard> {
    let Extraction { text, citations } = extract_citations(raw);
    let mut cards = parse_cards(&text);

    tracing::debug!(cards = cards.len(), citations = citations.len(), "Parsed analysis response");

    if !citations.is_empty() {
        cards.push(ContentCard::citations(citations));
    }
    cards
}
