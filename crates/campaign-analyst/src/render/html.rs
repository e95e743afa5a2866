//! HTML output for the browser surface.

use super::{CardBody, CardView, NO_DATA_MESSAGE, View, escape_markup};
use crate::config::branding;
use crate::models::{CitationRecord, ContentBlock};

/// Render the view as an HTML fragment.
#[must_use]
pub fn render_html(view: &View) -> String {
    match view {
        View::NoData => format!("<div class=\"notice no-data\">{}</div>\n", escape_markup(NO_DATA_MESSAGE)),
        View::Cards(cards) => {
            let mut output = String::from("<div class=\"analysis\" id=\"analysis\">\n");
            for card in cards {
                output.push_str(&render_card(card));
            }
            output.push_str("</div>\n");
            output
        }
    }
}

fn render_card(card: &CardView) -> String {
    let mut output = String::from("<section class=\"card\">\n");
    output.push_str(&format!(
        "<h2 class=\"card-title\" style=\"border-color: {}\">{}</h2>\n",
        branding::PRIMARY_COLOR,
        escape_markup(&card.title)
    ));

    match &card.body {
        CardBody::Blocks(blocks) => {
            output.push_str("<div class=\"prose\">\n");
            for block in blocks {
                output.push_str(&render_block(block));
            }
            output.push_str("</div>\n");
        }
        CardBody::Links(records) => output.push_str(&render_links(records)),
    }

    output.push_str("</section>\n");
    output
}

fn render_block(block: &ContentBlock) -> String {
    match block {
        ContentBlock::Heading(text) => format!("<h3>{}</h3>\n", escape_markup(text)),
        ContentBlock::Paragraph(text) => format!("<p>{}</p>\n", escape_markup(text)),
        ContentBlock::OrderedList(items) => render_list("ol", items),
        ContentBlock::UnorderedList(items) => render_list("ul", items),
    }
}

fn render_list(tag: &str, items: &[String]) -> String {
    let mut output = format!("<{tag}>\n");
    for item in items {
        // Continuation lines keep their line break.
        let lines: Vec<String> = item.split('\n').map(escape_markup).collect();
        output.push_str(&format!("<li>{}</li>\n", lines.join("<br>")));
    }
    output.push_str(&format!("</{tag}>\n"));
    output
}

fn render_links(records: &[CitationRecord]) -> String {
    let mut output = String::from("<ul class=\"sources\">\n");
    for record in records {
        output.push_str(&format!(
            "<li><a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a></li>\n",
            escape_markup(&record.uri),
            escape_markup(record.label())
        ));
    }
    output.push_str("</ul>\n");
    output
}
