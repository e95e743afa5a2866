//! Single-page HTML front end.

use crate::config::branding;
use crate::models::AnalysisType;
use crate::render::escape_markup;
use crate::theme::Theme;

/// What the page shows.
#[derive(Debug, Default)]
pub struct PageContent<'a> {
    /// Live theme.
    pub theme: Theme,
    /// Type preselected in the form.
    pub selected: AnalysisType,
    /// Context to prefill the textarea with.
    pub context: &'a str,
    /// Rendered result fragment.
    pub result_html: Option<&'a str>,
    /// Whether a held result with content can be exported.
    pub exportable: bool,
    /// Error shown above the form.
    pub error: Option<&'a str>,
}

/// Render the full page.
///
/// All caller-supplied text except `result_html` is escaped here;
/// `result_html` comes from the renderer, which escapes its own input.
#[must_use]
pub fn render_page(content: &PageContent<'_>) -> String {
    let options: String = AnalysisType::options()
        .iter()
        .map(|opt| {
            let selected = if opt.value == content.selected { " selected" } else { "" };
            format!(r#"<option value="{}"{selected}>{}</option>"#, opt.value.as_str(), escape_markup(opt.label))
        })
        .collect();

    let error_html = content
        .error
        .map(|msg| format!(r#"<div class="error" role="alert">{}</div>"#, escape_markup(msg)))
        .unwrap_or_default();

    let export_html = if content.exportable {
        r#"<form method="POST" action="/export" class="export">
<button type="submit">Download PDF</button>
</form>"#
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en" class="{theme_class}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<title>{short_name} Campaign Analyst</title>
<style>
body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; background: #f3f4f6; color: #374151; margin: 0; }}
.dark body {{ background: #0f172a; color: #d1d5db; }}
header {{ background: {secondary}; color: #fff; padding: 16px 24px; display: flex; justify-content: space-between; align-items: center; }}
header h1 {{ margin: 0; font-size: 20px; color: {primary}; }}
main {{ max-width: 800px; margin: 24px auto; padding: 0 16px; }}
form.analyze label {{ display: block; font-weight: 600; margin: 12px 0 6px; }}
select, textarea {{ width: 100%; box-sizing: border-box; padding: 8px; border: 1px solid #d1d5db; border-radius: 6px; font: inherit; }}
textarea {{ min-height: 160px; }}
button {{ background: {primary}; color: {secondary}; border: none; border-radius: 6px; padding: 10px 18px; font-weight: 600; cursor: pointer; margin-top: 12px; }}
.error {{ background: #fee2e2; border: 1px solid #dc2626; color: #991b1b; padding: 10px; border-radius: 6px; margin-bottom: 16px; }}
.notice {{ background: #fef9c3; color: #854d0e; padding: 24px; border-radius: 8px; text-align: center; margin-top: 24px; }}
.card {{ background: #fff; border-radius: 12px; box-shadow: 0 4px 12px rgba(0,0,0,0.08); padding: 24px; margin-top: 24px; }}
.dark .card {{ background: #1e293b; }}
.card-title {{ margin: 0 0 16px; padding-bottom: 8px; border-bottom: 2px solid; color: {secondary}; }}
.dark .card-title, .dark h3 {{ color: {primary}; }}
h3 {{ color: {secondary}; }}
.sources {{ list-style: none; padding: 0; }}
.sources a {{ color: #2563eb; }}
footer {{ text-align: center; font-size: 12px; color: #6b7280; padding: 24px; }}
</style>
</head>
<body>
<header>
<h1>{short_name}</h1>
<span>{slogan}</span>
</header>
<main>
{error_html}
<form method="POST" action="/analyze" class="analyze">
<label for="analysisType">Analysis type</label>
<select id="analysisType" name="analysisType">{options}</select>
<label for="context">Campaign context</label>
<textarea id="context" name="context" placeholder="Describe your campaign, channels, budget and recent results">{context}</textarea>
<button type="submit">Analyze</button>
</form>
{result}
{export_html}
</main>
<footer><a href="{website}">{long_name}</a></footer>
</body>
</html>"#,
        theme_class = content.theme.css_class(),
        short_name = escape_markup(branding::SHORT_NAME),
        long_name = escape_markup(branding::LONG_NAME),
        slogan = escape_markup(branding::SLOGAN),
        website = branding::WEBSITE,
        primary = branding::PRIMARY_COLOR,
        secondary = branding::SECONDARY_COLOR,
        context = escape_markup(content.context),
        result = content.result_html.unwrap_or_default(),
    )
}
