//! Search with fallbacks.
//!
//! 1. `?s=` restricted to novel posts (`post_type=wp-manga`).
//! 2. The same query without the post-type filter.
//! 3. Page 1 only, when both came back empty: guess detail-page slugs from the query and
//!    probe `/novel/{slug}/` directly. The site's search index misses many short or exact
//!    titles that do exist under their slug. This is best effort; a guessed slug may
//!    simply not exist, and failed probes are skipped.

use crate::model::{ListingEntry, ListingPage};
use crate::scraper::detail::{page_cover, page_title};
use crate::scraper::listing::parse_listing;
use crate::scraper::{fetch_html, EmptyReason, HttpClient, ScraperError, SiteConfig, Step};
use reqwest::Url;
use scraper::Html;

const NOVEL_POST_TYPE: &str = "wp-manga";

/// Search URL for one page; `typed` adds the novel post-type filter.
pub fn search_url(site: &SiteConfig, query: &str, page: u32, typed: bool) -> String {
    let encoded = urlencoding::encode(query);
    let mut url = if page > 1 {
        format!("{}/page/{}/?s={}", site.base(), page, encoded)
    } else {
        format!("{}/?s={}", site.base(), encoded)
    };
    if typed {
        url.push_str("&post_type=");
        url.push_str(NOVEL_POST_TYPE);
    }
    url
}

/// URL of a guessed detail page.
pub fn slug_url(site: &SiteConfig, slug: &str) -> String {
    format!("{}/novel/{}/", site.base(), slug)
}

/// Slug guesses for a query: the kebab-case title, then its acronym.
/// Empty and duplicate candidates are dropped.
pub fn slug_candidates(query: &str) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::with_capacity(2);
    for candidate in [kebab_slug(query), acronym_slug(query)] {
        if !candidate.is_empty() && !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates
}

/// Lowercase ASCII alphanumerics; every other run becomes a single `-`, none at the ends.
fn kebab_slug(query: &str) -> String {
    let mut slug = String::with_capacity(query.len());
    let mut pending_dash = false;
    for c in query.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// First character of each whitespace-separated word, lowercased.
/// Words starting with anything but an ASCII alphanumeric contribute nothing.
fn acronym_slug(query: &str) -> String {
    query
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Run the search protocol for `query` on 1-based `page`.
///
/// Only a failed unfiltered fetch on pages after the first is an error; every other
/// failure falls through to the next strategy.
pub fn resolve_search(
    client: &mut dyn HttpClient,
    site: &SiteConfig,
    query: &str,
    page: u32,
) -> Result<ListingPage, ScraperError> {
    let typed_url = search_url(site, query, page, true);
    match listing_step(client, &typed_url, site.base_url()) {
        Step::Found(listing) => return Ok(listing),
        Step::Empty(reason) => log_empty("filtered search", &typed_url, &reason),
    }

    let untyped_url = search_url(site, query, page, false);
    if page != 1 {
        let html = fetch_html(client, &untyped_url, "search")?;
        return parse_listing(&html, site.base_url());
    }
    match listing_step(client, &untyped_url, site.base_url()) {
        Step::Found(listing) => return Ok(listing),
        Step::Empty(reason) => log_empty("unfiltered search", &untyped_url, &reason),
    }

    let mut entries = Vec::new();
    for slug in slug_candidates(query) {
        match probe_slug(client, site, &slug) {
            Step::Found(entry) => entries.push(entry),
            Step::Empty(reason) => log_empty("slug probe", &slug_url(site, &slug), &reason),
        }
    }
    tracing::debug!(query, found = entries.len(), "slug probing finished");
    Ok(ListingPage {
        entries,
        has_more: false,
    })
}

fn log_empty(step: &str, url: &str, reason: &EmptyReason) {
    match reason {
        EmptyReason::Transport(e) if reason.is_transport() => {
            tracing::warn!(step, url, error = %e, "request failed, falling back");
        }
        EmptyReason::Markup(e) => {
            tracing::warn!(step, url, error = %e, "unreadable page, falling back");
        }
        _ => tracing::debug!(step, url, ?reason, "no results, falling back"),
    }
}

/// One listing fetch whose failure or emptiness hands over to the next strategy.
fn listing_step(client: &mut dyn HttpClient, url: &str, base: &Url) -> Step<ListingPage> {
    let html = match fetch_html(client, url, "search") {
        Ok(html) => html,
        Err(e) => return Step::Empty(EmptyReason::Transport(e)),
    };
    match parse_listing(&html, base) {
        Ok(listing) if !listing.is_empty() => Step::Found(listing),
        Ok(_) => Step::Empty(EmptyReason::NoMatches),
        Err(e) => Step::Empty(EmptyReason::Markup(e)),
    }
}

/// Fetch a guessed detail page and build a listing entry from whatever it shows.
fn probe_slug(client: &mut dyn HttpClient, site: &SiteConfig, slug: &str) -> Step<ListingEntry> {
    let url = slug_url(site, slug);
    let html = match fetch_html(client, &url, "slug probe") {
        Ok(html) => html,
        Err(e) => return Step::Empty(EmptyReason::Transport(e)),
    };
    let doc = Html::parse_document(&html);
    match synthesize_entry(&doc, site, slug, url) {
        Ok(entry) => Step::Found(entry),
        Err(e) => Step::Empty(EmptyReason::Markup(e)),
    }
}

/// Title: heading, then og:title, then the slug. Cover: page image, then og:image,
/// then the site placeholder icon.
fn synthesize_entry(
    doc: &Html,
    site: &SiteConfig,
    slug: &str,
    detail_link: String,
) -> Result<ListingEntry, ScraperError> {
    let title = page_title(doc)?.unwrap_or_else(|| slug.to_string());
    let cover_image_url =
        page_cover(doc, site.base_url())?.unwrap_or_else(|| site.icon_url().to_string());
    Ok(ListingEntry {
        title,
        cover_image_url,
        detail_link,
    })
}
