#![no_main]

use libfuzzer_sys::fuzz_target;
use campaign_analyst::parser::parse_analysis;
use campaign_analyst::render::{View, render_html, render_markdown, render_svg};
use campaign_analyst::theme::Theme;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let view = View::from_cards(&parse_analysis(&text));
    let _ = render_html(&view);
    let _ = render_markdown(&view);
    let _ = render_svg(&view, Theme::Dark);
});
