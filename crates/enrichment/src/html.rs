//! Minimal HTML extraction for title pages.
//!
//! Pages are scanned with a tag regex rather than parsed into a tree.
//! Elements are located by tag name and attribute, and their inner HTML is
//! cut out with a nesting-aware scan for the matching close tag.

use crate::types::{Field, MovieDetails, RatingInfo};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Any opening or closing tag: (slash, name, attributes)
static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/?)([a-zA-Z][a-zA-Z0-9-]*)([^>]*)>").expect("valid tag regex")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)\s*=\s*"([^"]*)""#).expect("valid attribute regex")
});

static RATING_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s*IMDb RATING\s*<").expect("valid rating label regex"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

const PRINCIPAL_CREDIT: &str = "title-pc-principal-credit";
const RUNTIME_SPEC: &str = "title-techspec_runtime";
const BOX_OFFICE_SECTION: &str = "title-boxoffice-section";
const BOX_OFFICE_PREFIX: &str = "title-boxoffice";
const RATING_TEXT_LEN: usize = 6;

/// One element found in a document
#[derive(Debug, Clone, Copy)]
pub(crate) struct Element<'a> {
    attrs: &'a str,
    inner: &'a str,
}

impl<'a> Element<'a> {
    pub(crate) fn attr(&self, name: &str) -> Option<&'a str> {
        attr_value(self.attrs, name)
    }

    pub(crate) fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    pub(crate) fn inner(&self) -> &'a str {
        self.inner
    }

    pub(crate) fn text(&self) -> String {
        strip_tags(self.inner)
    }
}

fn attr_value<'a>(attrs: &'a str, name: &str) -> Option<&'a str> {
    ATTRIBUTE
        .captures_iter(attrs)
        .find(|caps| caps[1].eq_ignore_ascii_case(name))
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str())
}

/// Inner HTML of the element whose opening tag ends at `open_end`
fn inner_html<'a>(html: &'a str, open_end: usize, tag: &str) -> &'a str {
    let rest = &html[open_end..];
    let mut depth = 1usize;
    for caps in TAG.captures_iter(rest) {
        if !caps[2].eq_ignore_ascii_case(tag) {
            continue;
        }
        let Some(whole) = caps.get(0) else { continue };
        if caps[1].is_empty() {
            if !caps[3].trim_end().ends_with('/') {
                depth += 1;
            }
        } else {
            depth -= 1;
            if depth == 0 {
                return &rest[..whole.start()];
            }
        }
    }
    rest
}

/// Every `tag` element (in document order) whose attributes satisfy `wanted`
pub(crate) fn find_elements<'a>(
    html: &'a str,
    tag: &str,
    wanted: impl Fn(&Element<'a>) -> bool,
) -> Vec<Element<'a>> {
    let mut found = Vec::new();
    for caps in TAG.captures_iter(html) {
        if !caps[1].is_empty() || !caps[2].eq_ignore_ascii_case(tag) {
            continue;
        }
        let (Some(whole), Some(attrs)) = (caps.get(0), caps.get(3)) else {
            continue;
        };
        let self_closing = attrs.as_str().trim_end().ends_with('/');
        let element = Element {
            attrs: attrs.as_str(),
            inner: if self_closing {
                ""
            } else {
                inner_html(html, whole.end(), tag)
            },
        };
        if wanted(&element) {
            found.push(element);
        }
    }
    found
}

fn first_element<'a>(
    html: &'a str,
    tag: &str,
    wanted: impl Fn(&Element<'a>) -> bool,
) -> Option<Element<'a>> {
    find_elements(html, tag, wanted).into_iter().next()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Text content of an HTML fragment with whitespace collapsed
pub(crate) fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    let decoded = decode_entities(&out);
    WHITESPACE.replace_all(decoded.trim(), " ").into_owned()
}

fn test_id_is(value: &'static str) -> impl Fn(&Element<'_>) -> bool {
    move |e| e.attr("data-testid") == Some(value)
}

/// Scrape the detail fields of a title page; anything missing keeps its
/// sentinel
pub fn parse_details(html: &str) -> MovieDetails {
    let mut details = MovieDetails::default();

    if let Some(h1) = first_element(html, "h1", |_| true) {
        let title = h1.text();
        if !title.is_empty() {
            details.set(Field::Title, title);
        }
    }

    let director = first_element(html, "li", test_id_is(PRINCIPAL_CREDIT))
        .and_then(|credit| first_element(credit.inner(), "a", |_| true))
        .map(|link| link.text())
        .filter(|name| !name.is_empty());
    if let Some(director) = director {
        details.set(Field::Director, director);
    }

    if let Some(runtime) = first_element(html, "li", test_id_is(RUNTIME_SPEC)) {
        let text = runtime.text().replace("Runtime", "");
        details.set(Field::Runtime, text.trim());
    }

    let mut box_office = find_elements(html, "li", test_id_is(BOX_OFFICE_SECTION));
    if box_office.is_empty() {
        box_office = find_elements(html, "li", |e| {
            e.attr("data-testid")
                .is_some_and(|id| id.starts_with(BOX_OFFICE_PREFIX))
        });
    }
    for item in box_office {
        let spans = find_elements(item.inner(), "span", |_| true);
        let label = spans.iter().map(Element::text).find(|t| !t.is_empty());
        let value = spans.last().map(Element::text);
        if let (Some(label), Some(value)) = (label, value) {
            if !details.set_by_label(&label, value) {
                debug!("Ignoring box office item '{}'", label);
            }
        }
    }

    details
}

/// Scrape the page title and the rating text of a title page
pub fn parse_rating(imdb_id: &str, html: &str) -> RatingInfo {
    let title = first_element(html, "title", |_| true)
        .map(|t| {
            let full = t.text().replace(" - IMDb", "");
            full.split('(').next().unwrap_or_default().trim().to_string()
        })
        .unwrap_or_else(|| RatingInfo::UNKNOWN_TITLE.to_string());

    RatingInfo {
        imdb_id: imdb_id.to_string(),
        title,
        rating: rating_text(html),
    }
}

/// Text of the first element that follows the "IMDb RATING" label
fn rating_text(html: &str) -> Option<String> {
    let label = RATING_LABEL.find(html)?;
    // Position of the '<' that closes the label's text node
    let after = label.end() - 1;
    let rest = &html[after..];
    let caps = TAG.captures_iter(rest).find(|caps| caps[1].is_empty())?;
    let whole = caps.get(0)?;
    let inner = inner_html(rest, whole.end(), &caps[2]);
    Some(strip_tags(inner).chars().take(RATING_TEXT_LEN).collect())
}
