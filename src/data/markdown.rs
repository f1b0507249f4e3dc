use pulldown_cmark::{html::push_html, Options, Parser};

/// Render a post body to HTML.
///
/// Tables, strikethrough, task lists and footnotes are enabled. Raw HTML in
/// the markdown passes through unchanged.
pub fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES;
    let parser = Parser::new_ext(markdown, options);

    let mut html = String::with_capacity(markdown.len() * 2);
    push_html(&mut html, parser);
    html
}
