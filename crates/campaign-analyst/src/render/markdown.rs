//! Markdown output formatting.

use super::{CardBody, CardView, NO_DATA_MESSAGE, View};
use crate::models::ContentBlock;

/// Format the view as normalized Markdown.
#[must_use]
pub fn render_markdown(view: &View) -> String {
    let View::Cards(cards) = view else {
        return format!("{NO_DATA_MESSAGE}\n");
    };

    let mut output = String::new();
    for card in cards {
        output.push_str(&format_card_markdown(card));
        output.push('\n');
    }
    output
}

fn format_card_markdown(card: &CardView) -> String {
    let mut output = format!("## {}\n\n", card.title);

    match &card.body {
        CardBody::Blocks(blocks) => {
            for block in blocks {
                match block {
                    ContentBlock::Heading(text) => output.push_str(&format!("### {text}\n\n")),
                    ContentBlock::Paragraph(text) => output.push_str(&format!("{text}\n\n")),
                    ContentBlock::OrderedList(items) => {
                        for (i, item) in items.iter().enumerate() {
                            output.push_str(&format!("{}. {}\n", i + 1, indent_continuations(item, 3)));
                        }
                        output.push('\n');
                    }
                    ContentBlock::UnorderedList(items) => {
                        for item in items {
                            output.push_str(&format!("- {}\n", indent_continuations(item, 2)));
                        }
                        output.push('\n');
                    }
                }
            }
        }
        CardBody::Links(records) => {
            for record in records {
                output.push_str(&format!("- [{}]({})\n", record.label(), record.uri));
            }
            output.push('\n');
        }
    }

    output
}

fn indent_continuations(item: &str, width: usize) -> String {
    item.replace('\n', &format!("\n{}", " ".repeat(width)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_analysis;

    #[test]
    fn test_no_data() {
        assert_eq!(render_markdown(&View::NoData), format!("{NO_DATA_MESSAGE}\n"));
    }

    #[test]
    fn test_lists_are_normalized() {
        let view = View::from_cards(&parse_analysis("## Plan\n* one\n  more\n- two\n7. first"));
        let md = render_markdown(&view);
        assert!(md.starts_with("## Plan\n\n"));
        assert!(md.contains("- one\n  more\n- two\n"));
        assert!(md.contains("1. first\n"));
    }

    #[test]
    fn test_sources_as_links() {
        let view = View::from_cards(&parse_analysis(
            r#"[SOURCES:[{"web":{"uri":"https://a","title":"A"}},{"web":{"uri":"https://b"}}]]"#,
        ));
        let md = render_markdown(&view);
        assert!(md.contains("## Sources\n\n- [A](https://a)\n- [https://b](https://b)\n"));
    }
}
