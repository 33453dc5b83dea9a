// Each field walks its <meta> candidates in order; first non-blank content wins.

use scraper::{Html, Selector};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

const TITLE_CANDIDATES: &[(&str, &str)] = &[("property", "og:title"), ("name", "twitter:title")];

const DESCRIPTION_CANDIDATES: &[(&str, &str)] = &[
    ("name", "description"),
    ("property", "og:description"),
    ("name", "twitter:description"),
];

const IMAGE_CANDIDATES: &[(&str, &str)] = &[
    ("property", "og:image"),
    ("property", "og:image:url"),
    ("name", "twitter:image"),
];

/// `"text/html; charset=utf-8"` and friends, case-insensitive.
pub fn is_html(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("text/html")
}

pub fn extract_metadata(html: &str) -> PageMetadata {
    let document = Html::parse_document(html);

    let title = pick_meta(&document, TITLE_CANDIDATES).or_else(|| document_title(&document));

    PageMetadata {
        title,
        description: pick_meta(&document, DESCRIPTION_CANDIDATES),
        image: pick_meta(&document, IMAGE_CANDIDATES),
    }
}

fn pick_meta(document: &Html, candidates: &[(&str, &str)]) -> Option<String> {
    candidates
        .iter()
        .find_map(|(attr, value)| meta_content(document, attr, value))
}

// Only the first matching <meta> per candidate is looked at
fn meta_content(document: &Html, attr: &str, value: &str) -> Option<String> {
    let selector = Selector::parse(&format!(r#"meta[{attr}="{value}"]"#)).ok()?;
    let element = document.select(&selector).next()?;
    non_blank(element.value().attr("content")?)
}

fn document_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    let element = document.select(&selector).next()?;
    non_blank(&element.text().collect::<String>())
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
