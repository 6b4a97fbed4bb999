use pulldown_cmark::{html, Event, Options, Parser};

/// Renders model-produced Markdown as HTML.
///
/// Raw HTML in the source is emitted as escaped text, so a completion can never inject markup
/// into the page. Output depends only on the input.
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut rendered = String::with_capacity(markdown.len().saturating_mul(3) / 2);
    html::push_html(&mut rendered, parser);
    rendered
}

/// Markdown shown in place of an artifact that could not be produced.
pub fn unavailable(label: &str) -> String {
    render_markdown(&format!("*No {label} available.*"))
}
