//! Catalog and search-result pages.
//!
//! Each novel sits in a `div.page-item-detail` (archive layout) or
//! `div.c-tabs-item__content` (search layout) with a thumbnail anchor carrying the title
//! and link. Entries without a usable link are dropped. Entries without an image are
//! kept with an empty cover URL.

use crate::model::{ListingEntry, ListingPage};
use crate::scraper::{absolute_url, element_text, image_url, parse_selector, ScraperError};
use reqwest::Url;
use scraper::Html;
use std::collections::HashSet;

const ITEM_SELECTOR: &str = "div.page-item-detail, div.c-tabs-item__content";
const THUMB_ANCHOR_SELECTOR: &str = ".item-thumb > a, .tab-thumb > a";
const OLDER_PAGE_SELECTOR: &str = "div.nav-links > div.nav-previous";

/// Parse a listing page from raw HTML.
pub fn parse_listing(html: &str, base: &Url) -> Result<ListingPage, ScraperError> {
    extract_listing(&Html::parse_document(html), base)
}

/// Extract entries in document order, deduplicated by detail link (first occurrence kept).
pub fn extract_listing(doc: &Html, base: &Url) -> Result<ListingPage, ScraperError> {
    let item_sel = parse_selector(ITEM_SELECTOR)?;
    let anchor_sel = parse_selector(THUMB_ANCHOR_SELECTOR)?;
    let img_sel = parse_selector("img")?;
    let older_sel = parse_selector(OLDER_PAGE_SELECTOR)?;

    let mut seen = HashSet::new();
    let mut entries = Vec::new();
    for item in doc.select(&item_sel) {
        let Some(anchor) = item.select(&anchor_sel).next() else {
            continue;
        };
        let Some(detail_link) = anchor
            .value()
            .attr("href")
            .and_then(|href| absolute_url(href, base))
        else {
            continue;
        };
        let title = anchor
            .value()
            .attr("title")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| element_text(anchor));
        if title.is_empty() {
            continue;
        }
        if !seen.insert(detail_link.clone()) {
            continue;
        }
        let cover_image_url = item
            .select(&img_sel)
            .next()
            .and_then(|img| image_url(img, base))
            .unwrap_or_default();
        entries.push(ListingEntry {
            title,
            cover_image_url,
            detail_link,
        });
    }

    let has_more = doc.select(&older_sel).next().is_some();
    Ok(ListingPage { entries, has_more })
}
