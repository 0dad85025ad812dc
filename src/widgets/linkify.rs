//! Read-only text with clickable links
//!
//! URLs are picked out of plain answers so reviewers can open or copy them.
//! Bare hosts (`github.com/ada`) count as links when their top-level domain is
//! a common one; an `@` directly before a host marks an email address, which
//! is left as text.

use super::WidgetProps;
use once_cell::sync::Lazy;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use regex::Regex;

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:https?://|www\.)[^\s<>]+|[a-z0-9][a-z0-9-]*(?:\.[a-z0-9-]+)*\.([a-z]{2,})(?:/[^\s<>]*)?",
    )
    .unwrap()
});

const BARE_TLDS: &[&str] = &[
    "com", "org", "net", "edu", "gov", "io", "dev", "me", "co", "ai", "app", "us", "uk", "ca",
    "xyz", "tech", "info", "so", "gg", "ly",
];

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '\'', '"'];

/// Drop sentence punctuation after a link. A closing paren stays when it
/// balances one inside the link, e.g. `wiki/Rust_(programming_language)`.
fn trim_link_end(raw: &str) -> &str {
    let mut end = raw;
    loop {
        if let Some(stripped) = end.strip_suffix(TRAILING_PUNCTUATION) {
            end = stripped;
        } else if let Some(stripped) = end.strip_suffix(')') {
            if end.matches('(').count() >= end.matches(')').count() {
                return end;
            }
            end = stripped;
        } else {
            return end;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Text as written by the applicant
    pub text: String,
    /// Target with a scheme, ready to open
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Link(Link),
}

/// Prefix `http://` unless the link already carries a scheme
pub fn normalize_href(text: &str) -> String {
    if text.contains("://") {
        text.to_string()
    } else {
        format!("http://{text}")
    }
}

/// Treat every comma as a separator so comma-joined lists split into links
pub fn commas_to_spaces(text: &str) -> String {
    text.replace(',', " ")
}

/// Split text into plain and link segments, in order
pub fn linkify(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in URL_RE.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        if text[..m.start()].ends_with('@') {
            continue;
        }
        if let Some(tld) = caps.get(1) {
            let tld = tld.as_str().to_ascii_lowercase();
            if !BARE_TLDS.contains(&tld.as_str()) {
                continue;
            }
        }

        let raw = trim_link_end(m.as_str());
        if raw.is_empty() {
            continue;
        }
        let end = m.start() + raw.len();

        if m.start() > last {
            segments.push(Segment::Text(text[last..m.start()].to_string()));
        }
        segments.push(Segment::Link(Link {
            text: raw.to_string(),
            href: normalize_href(raw),
        }));
        last = end;
    }

    if last < text.len() {
        segments.push(Segment::Text(text[last..].to_string()));
    }
    segments
}

/// Only the links found in `text`
pub fn links(text: &str) -> Vec<Link> {
    linkify(text)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Link(link) => Some(link),
            Segment::Text(_) => None,
        })
        .collect()
}

/// Render the answer with links highlighted; the link under the cursor is
/// reversed while the field has focus.
pub fn render(props: &WidgetProps<'_>, commas: bool) -> Vec<Line<'static>> {
    let text = if commas {
        commas_to_spaces(props.text())
    } else {
        props.text().to_string()
    };

    if text.trim().is_empty() {
        return vec![Line::from(Span::styled(
            "(empty)",
            Style::default().fg(Color::DarkGray),
        ))];
    }

    let link_style = Style::default()
        .fg(Color::Blue)
        .add_modifier(Modifier::UNDERLINED);
    let mut index = 0;

    text.split('\n')
        .map(|row| {
            let spans: Vec<Span<'static>> = linkify(row)
                .into_iter()
                .map(|segment| match segment {
                    Segment::Text(t) => Span::raw(t),
                    Segment::Link(link) => {
                        let style = if props.focused && index == props.cursor {
                            link_style.add_modifier(Modifier::REVERSED)
                        } else {
                            link_style
                        };
                        index += 1;
                        Span::styled(link.text, style)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}
