//! SVG output used as the capture surface for PDF export.
//!
//! Text is laid out with a fixed average glyph width; the result only needs
//! to be stable and legible, not typographically exact.

use std::fmt::Write as _;

use super::{CardBody, CardView, NO_DATA_MESSAGE, View, escape_markup};
use crate::config::branding;
use crate::models::ContentBlock;
use crate::theme::Theme;

/// Width of the rendered view in CSS pixels.
pub const SVG_WIDTH: u32 = 800;

const FONT_FAMILY: &str = "Helvetica, Arial, sans-serif";
/// Average glyph advance as a fraction of font size.
const GLYPH_RATIO: f64 = 0.52;
const LINE_HEIGHT: f64 = 1.5;
const CARD_GAP: f64 = 24.0;
const CARD_PADDING: f64 = 24.0;
const LIST_INDENT: f64 = 24.0;

const TITLE_SIZE: f64 = 22.0;
const HEADING_SIZE: f64 = 18.0;
const BODY_SIZE: f64 = 15.0;
const LINK_SIZE: f64 = 14.0;

/// A rendered SVG document with its pixel size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgDocument {
    /// Serialized SVG.
    pub markup: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Colours for one theme.
struct Palette {
    page: &'static str,
    card: &'static str,
    border: &'static str,
    title: &'static str,
    heading: &'static str,
    text: &'static str,
    link: &'static str,
    notice_fill: &'static str,
    notice_text: &'static str,
}

impl Palette {
    const fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                page: "#ffffff",
                card: "#ffffff",
                border: "#e5e7eb",
                title: branding::SECONDARY_COLOR,
                heading: branding::SECONDARY_COLOR,
                text: "#374151",
                link: "#2563eb",
                notice_fill: "#fef9c3",
                notice_text: "#854d0e",
            },
            Theme::Dark => Self {
                page: "#0f172a",
                card: "#1e293b",
                border: "#334155",
                title: branding::PRIMARY_COLOR,
                heading: branding::PRIMARY_COLOR,
                text: "#d1d5db",
                link: "#60a5fa",
                notice_fill: "#422006",
                notice_text: "#fde68a",
            },
        }
    }
}

/// Render the view as SVG at [`SVG_WIDTH`] pixels wide.
#[must_use]
pub fn render_svg(view: &View, theme: Theme) -> SvgDocument {
    let palette = Palette::for_theme(theme);
    let mut canvas = Canvas::new(&palette);

    match view {
        View::NoData => canvas.notice(NO_DATA_MESSAGE),
        View::Cards(cards) => {
            for card in cards {
                canvas.card(card);
            }
        }
    }

    canvas.finish()
}

/// Accumulates elements top to bottom.
struct Canvas<'a> {
    palette: &'a Palette,
    elements: String,
    y: f64,
}

impl<'a> Canvas<'a> {
    fn new(palette: &'a Palette) -> Self {
        Self { palette, elements: String::new(), y: CARD_GAP }
    }

    fn finish(self) -> SvgDocument {
        let height = (self.y.ceil() as u32).max(1);
        let width = SVG_WIDTH;
        let mut markup = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}" font-family="{FONT_FAMILY}">"#
        );
        let _ = write!(markup, r#"<rect width="100%" height="100%" fill="{}"/>"#, self.palette.page);
        markup.push_str(&self.elements);
        markup.push_str("</svg>");

        SvgDocument { markup, width, height }
    }

    fn notice(&mut self, message: &str) {
        let x = CARD_GAP;
        let width = f64::from(SVG_WIDTH) - 2.0 * CARD_GAP;
        let lines = wrap(message, chars_for(width - 2.0 * CARD_PADDING, BODY_SIZE));
        let height = 2.0 * CARD_PADDING + lines.len() as f64 * BODY_SIZE * LINE_HEIGHT;

        let _ = write!(
            self.elements,
            r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" rx="8" fill="{fill}"/>"#,
            y = self.y,
            fill = self.palette.notice_fill,
        );
        let mut top = self.y + CARD_PADDING;
        for line in &lines {
            self.elements.push_str(&text_element(
                x + CARD_PADDING,
                top,
                BODY_SIZE,
                self.palette.notice_text,
                false,
                line,
            ));
            top += BODY_SIZE * LINE_HEIGHT;
        }
        self.y += height + CARD_GAP;
    }

    fn card(&mut self, card: &CardView) {
        let card_x = CARD_GAP;
        let card_width = f64::from(SVG_WIDTH) - 2.0 * CARD_GAP;
        let left = card_x + CARD_PADDING;
        let inner = card_width - 2.0 * CARD_PADDING;
        let palette = self.palette;

        let mut body = String::new();
        let mut top = self.y + CARD_PADDING;

        for line in wrap(&card.title, chars_for(inner, TITLE_SIZE)) {
            body.push_str(&text_element(left, top, TITLE_SIZE, palette.title, true, &line));
            top += TITLE_SIZE * LINE_HEIGHT;
        }
        let _ = write!(
            body,
            r#"<rect x="{left}" y="{top}" width="{inner}" height="2" fill="{}"/>"#,
            branding::PRIMARY_COLOR
        );
        top += 16.0;

        match &card.body {
            CardBody::Blocks(blocks) => {
                for block in blocks {
                    top = draw_block(&mut body, palette, block, left, inner, top);
                }
            }
            CardBody::Links(records) => {
                for record in records {
                    for line in wrap(record.label(), chars_for(inner - LIST_INDENT, LINK_SIZE)) {
                        body.push_str(&text_element(
                            left + LIST_INDENT,
                            top,
                            LINK_SIZE,
                            palette.link,
                            false,
                            &line,
                        ));
                        top += LINK_SIZE * LINE_HEIGHT;
                    }
                    top += 4.0;
                }
            }
        }

        let height = top + CARD_PADDING - self.y;
        let _ = write!(
            self.elements,
            r#"<rect x="{card_x}" y="{y}" width="{card_width}" height="{height}" rx="12" fill="{fill}" stroke="{stroke}"/>"#,
            y = self.y,
            fill = palette.card,
            stroke = palette.border,
        );
        self.elements.push_str(&body);
        self.y += height + CARD_GAP;
    }
}

/// Draw one block and return the next free y.
fn draw_block(out: &mut String, palette: &Palette, block: &ContentBlock, left: f64, inner: f64, mut top: f64) -> f64 {
    match block {
        ContentBlock::Heading(text) => {
            top += 4.0;
            for line in wrap(text, chars_for(inner, HEADING_SIZE)) {
                out.push_str(&text_element(left, top, HEADING_SIZE, palette.heading, true, &line));
                top += HEADING_SIZE * LINE_HEIGHT;
            }
        }
        ContentBlock::Paragraph(text) => {
            for line in wrap(text, chars_for(inner, BODY_SIZE)) {
                out.push_str(&text_element(left, top, BODY_SIZE, palette.text, false, &line));
                top += BODY_SIZE * LINE_HEIGHT;
            }
        }
        ContentBlock::OrderedList(items) | ContentBlock::UnorderedList(items) => {
            let ordered = matches!(block, ContentBlock::OrderedList(_));
            let width = chars_for(inner - LIST_INDENT, BODY_SIZE);
            for (i, item) in items.iter().enumerate() {
                let marker = if ordered { format!("{}.", i + 1) } else { "\u{2022}".to_string() };
                out.push_str(&text_element(left + 4.0, top, BODY_SIZE, palette.text, false, &marker));
                for segment in item.split('\n') {
                    for line in wrap(segment, width) {
                        out.push_str(&text_element(
                            left + LIST_INDENT,
                            top,
                            BODY_SIZE,
                            palette.text,
                            false,
                            &line,
                        ));
                        top += BODY_SIZE * LINE_HEIGHT;
                    }
                }
            }
        }
    }
    top + 6.0
}

fn text_element(x: f64, top: f64, size: f64, fill: &str, bold: bool, text: &str) -> String {
    let baseline = top + size * 1.1;
    let weight = if bold { r#" font-weight="bold""# } else { "" };
    format!(
        r#"<text x="{x}" y="{baseline:.1}" font-size="{size}" fill="{fill}"{weight} xml:space="preserve">{}</text>"#,
        escape_markup(text)
    )
}

/// Characters that fit in `width` pixels at `size`.
fn chars_for(width: f64, size: f64) -> usize {
    ((width / (size * GLYPH_RATIO)).floor() as usize).max(1)
}

/// Greedy word wrap. Words longer than a line are split.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for piece in chars.chunks(max_chars) {
            let piece_len = piece.len();
            if current_len > 0 && current_len + 1 + piece_len > max_chars {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(piece);
            current_len += piece_len;
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_analysis;

    #[test]
    fn test_wrap_respects_width() {
        let lines = wrap("the quick brown fox jumps over the lazy dog", 10);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
        assert_eq!(lines.join(" "), "the quick brown fox jumps over the lazy dog");
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let lines = wrap("https://example.com/a/very/long/path", 10);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
    }

    #[test]
    fn test_wrap_empty_text_yields_one_line() {
        assert_eq!(wrap("", 10), vec![String::new()]);
    }

    #[test]
    fn test_document_size() {
        let view = View::from_cards(&parse_analysis("## A\nbody text"));
        let doc = render_svg(&view, Theme::Light);
        assert_eq!(doc.width, SVG_WIDTH);
        assert!(doc.height > 100);
        assert!(doc.markup.starts_with("<svg"));
        assert!(doc.markup.ends_with("</svg>"));
    }

    #[test]
    fn test_more_content_is_taller() {
        let short = render_svg(&View::from_cards(&parse_analysis("## A\none")), Theme::Light);
        let long = render_svg(
            &View::from_cards(&parse_analysis("## A\none\n## B\n* x\n* y\n* z\n### Sub\nmore")),
            Theme::Light,
        );
        assert!(long.height > short.height);
    }

    #[test]
    fn test_theme_changes_palette() {
        let view = View::from_cards(&parse_analysis("## A\nbody"));
        let light = render_svg(&view, Theme::Light);
        let dark = render_svg(&view, Theme::Dark);
        assert!(light.markup.contains("#ffffff"));
        assert!(dark.markup.contains("#1e293b"));
        assert_eq!(light.height, dark.height);
    }

    #[test]
    fn test_text_is_escaped() {
        let view = View::from_cards(&parse_analysis("## R&D <2025>"));
        let doc = render_svg(&view, Theme::Light);
        assert!(doc.markup.contains("R&amp;D &lt;2025&gt;"));
    }

    #[test]
    fn test_no_data_notice() {
        let doc = render_svg(&View::NoData, Theme::Dark);
        assert!(doc.markup.contains("No analysis data to display."));
    }
}
