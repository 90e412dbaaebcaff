//! Markdown → HTML for blog bodies and chat bubbles.
//!
//! Raw HTML in the source is dropped and link/image destinations are limited
//! to http, https, mailto and relative URLs: post bodies may come from
//! arbitrary remote URLs and chat text comes from the model.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

const ALLOWED_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options).filter_map(|event| match event {
        Event::Html(_) | Event::InlineHtml(_) => None,
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Some(Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        })),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Some(Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        })),
        other => Some(other),
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Keeps relative URLs and allowed schemes; anything else becomes `#`.
fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    // Browsers ignore embedded whitespace and control characters in schemes.
    let cleaned: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .collect();

    let scheme_end = cleaned.find(|c| matches!(c, ':' | '/' | '?' | '#'));
    match scheme_end {
        Some(i) if cleaned[i..].starts_with(':') => {
            let scheme = cleaned[..i].to_ascii_lowercase();
            if ALLOWED_SCHEMES.contains(&scheme.as_str()) {
                url
            } else {
                CowStr::Borrowed("#")
            }
        }
        _ => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_and_emphasis() {
        let out = render_markdown("# Title\n\nSome **bold** text");
        assert!(out.contains("<h1>Title</h1>"));
        assert!(out.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_raw_html_is_dropped() {
        let out = render_markdown("before <script>alert(1)</script> after");
        assert!(!out.contains("<script>"));
        assert!(out.contains("before"));
    }

    #[test]
    fn test_code_fence_is_escaped() {
        let out = render_markdown("```\n<b>x</b>\n```");
        assert!(out.contains("&lt;b&gt;"));
    }

    #[test]
    fn test_javascript_link_is_neutralized() {
        let out = render_markdown("[click](javascript:alert(document.cookie))");
        assert!(!out.contains("javascript:"));
        assert!(out.contains("<a href=\"#\">click</a>"));

        let out = render_markdown("[x](JavaScript:alert(1)) [y](java%0ascript:x) ![i](data:image/svg+xml,abc)");
        assert!(!out.to_ascii_lowercase().contains("javascript:"));
        assert!(!out.contains("data:"));
    }

    #[test]
    fn test_allowed_links_are_kept() {
        let out = render_markdown(
            "[a](https://example.com/x?y=1) [b](mailto:me@example.com) [c](/blog/1) [d](#top) ![e](/assets/p.png)",
        );
        assert!(out.contains("href=\"https://example.com/x?y=1\""));
        assert!(out.contains("href=\"mailto:me@example.com\""));
        assert!(out.contains("href=\"/blog/1\""));
        assert!(out.contains("href=\"#top\""));
        assert!(out.contains("src=\"/assets/p.png\""));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(render_markdown(""), "");
    }
}
