//! Chapter index retrieval.
//!
//! Primary: the theme's AJAX endpoint (`manga_get_chapters`, full view, first page) keyed
//! by the post id on `#manga-chapters-holder`. Fallback: the "latest releases" widget on
//! the detail page already in hand. Both list newest first; the result is oldest first.

use crate::model::Chapter;
use crate::scraper::dates::release_millis;
use crate::scraper::{
    absolute_url, element_text, fetch_html, parse_selector, EmptyReason, HttpClient,
    ScraperError, SiteConfig, Step,
};
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

const HOLDER_SELECTOR: &str = "#manga-chapters-holder";
const AJAX_ITEM_SELECTOR: &str = "li.wp-manga-chapter";
const AJAX_DATE_SELECTOR: &str = "span.chapter-release-date";
const LATEST_ITEM_SELECTOR: &str = "div#latest-manga-releases li";
const LATEST_DATE_SELECTOR: &str = "span";

/// AJAX chapter-list URL for a post id.
pub fn chapter_list_url(site: &SiteConfig, post_id: &str) -> String {
    format!(
        "{}/wp-admin/admin-ajax.php?action=manga_get_chapters&view=full&manga={}&paged=1",
        site.base(),
        urlencoding::encode(post_id)
    )
}

/// Chapters of a parsed detail page, oldest first. Empty when neither source has any.
pub fn retrieve_chapters(
    client: &mut dyn HttpClient,
    site: &SiteConfig,
    doc: &Html,
) -> Result<Vec<Chapter>, ScraperError> {
    let mut chapters = match ajax_step(client, site, doc)? {
        Step::Found(chapters) => chapters,
        Step::Empty(reason) => {
            match &reason {
                EmptyReason::Transport(e) => {
                    tracing::warn!(error = %e, "chapter list request failed, using latest releases")
                }
                _ => tracing::debug!(?reason, "no chapters from AJAX, using latest releases"),
            }
            parse_chapter_items(doc, site.base_url(), LATEST_ITEM_SELECTOR, LATEST_DATE_SELECTOR)?
        }
    };
    chapters.reverse();
    Ok(chapters)
}

/// Post id from the chapter holder's `data-id`.
pub fn post_id(doc: &Html) -> Result<Option<String>, ScraperError> {
    let sel = parse_selector(HOLDER_SELECTOR)?;
    Ok(doc
        .select(&sel)
        .next()
        .and_then(|holder| holder.value().attr("data-id"))
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty()))
}

/// The AJAX path. Request failures become `Empty`; only selector errors are `Err`.
fn ajax_step(
    client: &mut dyn HttpClient,
    site: &SiteConfig,
    doc: &Html,
) -> Result<Step<Vec<Chapter>>, ScraperError> {
    let Some(id) = post_id(doc)? else {
        return Ok(Step::Empty(EmptyReason::MissingPostId));
    };
    let url = chapter_list_url(site, &id);
    let html = match fetch_html(client, &url, "chapter list") {
        Ok(html) => html,
        Err(e) => return Ok(Step::Empty(EmptyReason::Transport(e))),
    };
    let chapters = parse_chapter_items(
        &Html::parse_document(&html),
        site.base_url(),
        AJAX_ITEM_SELECTOR,
        AJAX_DATE_SELECTOR,
    )?;
    if chapters.is_empty() {
        return Ok(Step::Empty(EmptyReason::NoMatches));
    }
    Ok(Step::Found(chapters))
}

/// Chapters in source order from list items with an anchor and an optional date span.
fn parse_chapter_items(
    doc: &Html,
    base: &Url,
    item_selector: &str,
    date_selector: &str,
) -> Result<Vec<Chapter>, ScraperError> {
    let item_sel = parse_selector(item_selector)?;
    let anchor_sel = parse_selector("a")?;
    let date_sel = parse_selector(date_selector)?;
    let date_anchor_sel = parse_selector("a[title]")?;

    let mut chapters = Vec::new();
    for item in doc.select(&item_sel) {
        let Some(anchor) = item.select(&anchor_sel).next() else {
            continue;
        };
        let Some(url) = anchor
            .value()
            .attr("href")
            .and_then(|href| absolute_url(href, base))
        else {
            continue;
        };
        let date = item
            .select(&date_sel)
            .next()
            .and_then(|span| release_date_text(span, &date_anchor_sel));
        chapters.push(Chapter {
            title: element_text(anchor),
            url,
            published_at_millis: date.as_deref().map(|d| release_millis(Some(d))),
            scanlator: None,
        });
    }
    Ok(chapters)
}

/// Date text of a release span. Fresh chapters show a "new" badge instead of text, with
/// the relative date in the badge link's `title`.
fn release_date_text(span: ElementRef<'_>, date_anchor_sel: &Selector) -> Option<String> {
    let text = element_text(span);
    if !text.is_empty() {
        return Some(text);
    }
    span.select(date_anchor_sel)
        .next()
        .and_then(|a| a.value().attr("title"))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}
