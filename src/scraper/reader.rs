//! Chapter pages: reading container to `<h2>title</h2><hr><br>body`.

use crate::model::ChapterBody;
use crate::scraper::{element_text, parse_selector, ScraperError};
use scraper::{ElementRef, Html};

const READING_SELECTOR: &str = ".reading-content";
const ENTRY_SELECTOR: &str = ".entry-content";
const HEADING_SELECTOR: &str = "h1, h2, h3, h4";

/// Title and body of a chapter page, or None when the page has no reading container.
///
/// The first heading inside the container is the title; it is detached from the tree
/// before the container is serialized so the body does not repeat it.
pub fn extract_chapter_body(html: &str) -> Result<Option<ChapterBody>, ScraperError> {
    let mut doc = Html::parse_document(html);
    let reading_sel = parse_selector(READING_SELECTOR)?;
    let entry_sel = parse_selector(ENTRY_SELECTOR)?;
    let heading_sel = parse_selector(HEADING_SELECTOR)?;

    let Some(container) = doc
        .select(&reading_sel)
        .next()
        .or_else(|| doc.select(&entry_sel).next())
    else {
        return Ok(None);
    };
    let container_id = container.id();
    let heading = container.select(&heading_sel).next();
    let title_text = heading.map(element_text).unwrap_or_default();
    let heading_id = heading.map(|h| h.id());

    if let Some(id) = heading_id {
        if let Some(mut node) = doc.tree.get_mut(id) {
            node.detach();
        }
    }
    let body_html = doc
        .tree
        .get(container_id)
        .and_then(ElementRef::wrap)
        .map(|c| c.inner_html())
        .unwrap_or_default();

    Ok(Some(ChapterBody {
        title_text,
        body_html,
    }))
}

/// Rendered chapter fragment; the raw page unchanged when no reading container exists.
pub fn clean_chapter_html(html: &str) -> Result<String, ScraperError> {
    match extract_chapter_body(html)? {
        Some(body) => Ok(body.render()),
        None => {
            tracing::debug!("no reading container, returning page as-is");
            Ok(html.to_string())
        }
    }
}
