//! Readme rendering.
//!
//! Readmes are third-party markdown, so the rendered HTML is always passed
//! through an allow-list sanitizer before it reaches a consumer.

use std::collections::{HashMap, HashSet};

use pulldown_cmark::{html, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

/// Conservative baseline of tags kept by the sanitizer.
const BASELINE_TAGS: &[&str] = &[
    "h3",
    "h4",
    "h5",
    "h6",
    "blockquote",
    "p",
    "a",
    "ul",
    "ol",
    "li",
    "b",
    "i",
    "strong",
    "em",
    "strike",
    "del",
    "code",
    "hr",
    "br",
    "div",
    "table",
    "thead",
    "caption",
    "tbody",
    "tr",
    "th",
    "td",
    "pre",
];

/// Tags readmes need on top of the baseline.
const EXTRA_TAGS: &[&str] = &["h1", "h2", "img"];

/// Render readme markdown to sanitized HTML.
pub fn render_readme(markdown: &str) -> String {
    sanitize_html(&markdown_to_html(markdown))
}

/// Convert markdown to HTML.
///
/// Strikethrough and tables are enabled, headings get no generated ids, and
/// every heading is demoted one level so a readme's `#` title renders as
/// `<h2>` beneath the page's own heading.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Start(Tag::Heading { level, id, classes, attrs }) => {
            Event::Start(Tag::Heading { level: demote(level), id, classes, attrs })
        }
        Event::End(TagEnd::Heading(level)) => Event::End(TagEnd::Heading(demote(level))),
        other => other,
    });

    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}

/// Strip everything outside the readme allow-list from `html`.
///
/// Script and style elements are removed together with their content;
/// disallowed URL schemes such as `javascript:` are dropped from links.
pub fn sanitize_html(html: &str) -> String {
    let tags: HashSet<&str> = BASELINE_TAGS.iter().chain(EXTRA_TAGS).copied().collect();

    let mut tag_attributes: HashMap<&str, HashSet<&str>> = HashMap::new();
    tag_attributes.insert("a", ["href", "name", "target"].into_iter().collect());
    tag_attributes.insert("img", ["src", "alt", "title"].into_iter().collect());

    ammonia::Builder::default()
        .tags(tags)
        .tag_attributes(tag_attributes)
        .generic_attributes(HashSet::new())
        .clean(html)
        .to_string()
}

fn demote(level: HeadingLevel) -> HeadingLevel {
    match level {
        HeadingLevel::H1 => HeadingLevel::H2,
        HeadingLevel::H2 => HeadingLevel::H3,
        HeadingLevel::H3 => HeadingLevel::H4,
        HeadingLevel::H4 => HeadingLevel::H5,
        HeadingLevel::H5 | HeadingLevel::H6 => HeadingLevel::H6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_is_stripped_and_image_kept() {
        let markdown = "Intro text.\n\n<script>alert('pwned')</script>\n\n![logo](https://example.com/logo.png)\n";
        let html = render_readme(markdown);

        assert!(!html.contains("<script"), "{html}");
        assert!(!html.contains("alert"), "{html}");
        assert!(html.contains("<img"), "{html}");
        assert!(html.contains(r#"src="https://example.com/logo.png""#), "{html}");
        assert!(html.contains("Intro text."), "{html}");
    }

    #[test]
    fn test_headings_are_demoted_without_ids() {
        let html = render_readme("# Title\n\n## Section\n\n###### Deep\n");
        assert!(html.contains("<h2>Title</h2>"), "{html}");
        assert!(html.contains("<h3>Section</h3>"), "{html}");
        assert!(html.contains("<h6>Deep</h6>"), "{html}");
        assert!(!html.contains("id="), "{html}");
    }

    #[test]
    fn test_strikethrough_is_rendered() {
        let html = render_readme("~~old~~ new");
        assert!(html.contains("<del>old</del>"), "{html}");
    }

    #[test]
    fn test_javascript_links_are_neutralized() {
        let html = render_readme("[click](javascript:alert(1))");
        assert!(!html.contains("javascript:"), "{html}");
        assert!(html.contains("click"), "{html}");
    }

    #[test]
    fn test_event_handler_attributes_are_dropped() {
        let html = sanitize_html(r#"<img src="a.png" onerror="alert(1)"><p style="color:red">x</p>"#);
        assert!(html.contains(r#"<img src="a.png">"#), "{html}");
        assert!(!html.contains("onerror"), "{html}");
        assert!(!html.contains("style"), "{html}");
    }

    #[test]
    fn test_iframe_is_removed() {
        let html = sanitize_html(r#"<iframe src="https://evil.example"></iframe><p>ok</p>"#);
        assert!(!html.contains("iframe"), "{html}");
        assert!(html.contains("<p>ok</p>"), "{html}");
    }
}
