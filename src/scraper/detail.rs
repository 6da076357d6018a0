//! Novel detail pages: metadata from the summary block, chapters via [`chapters`].
//!
//! Missing markup never fails extraction; each field falls back to empty or Unknown.
//! Only the detail-page fetch itself is a hard error.

use crate::model::{Chapter, NovelDetail, NovelStatus};
use crate::scraper::chapters::retrieve_chapters;
use crate::scraper::{
    element_text, fetch_html, image_url, meta_property, parse_selector, HttpClient,
    ScraperError, SiteConfig,
};
use reqwest::Url;
use scraper::Html;

const TITLE_SELECTOR: &str = "div.post-title h1";
const COVER_SELECTOR: &str = "div.summary_image img";
const SYNOPSIS_SELECTOR: &str = "#editdescription > p";
const SYNOPSIS_FALLBACK_SELECTOR: &str = "div.summary__content > p";
const AUTHOR_SELECTOR: &str = "div.author-content > a";
const ARTIST_SELECTOR: &str = "div.artist-content > a";
const STATUS_SELECTOR: &str = "div.post-status .summary-content";
const GENRE_SELECTOR: &str = "div.genres-content > a";
const TAG_SELECTOR: &str = "div.tags-content > a";

/// Fetch a detail page and extract metadata plus the oldest-first chapter list.
pub fn fetch_detail(
    client: &mut dyn HttpClient,
    site: &SiteConfig,
    url: &str,
) -> Result<NovelDetail, ScraperError> {
    let url = ensure_page_url(url)?;
    let html = fetch_html(client, &url, "detail page")?;
    let doc = Html::parse_document(&html);
    let chapters = retrieve_chapters(client, site, &doc)?;
    extract_detail(&doc, site.base_url(), chapters)
}

/// Require an absolute http(s) URL.
pub(crate) fn ensure_page_url(url: &str) -> Result<String, ScraperError> {
    let parsed = Url::parse(url.trim()).map_err(|e| ScraperError::InvalidUrl {
        input: url.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ScraperError::InvalidUrl {
            input: url.to_string(),
            reason: "expected an http(s) URL with a host".to_string(),
        });
    }
    Ok(parsed.to_string())
}

/// Build a [`NovelDetail`] from a parsed detail page and an already-retrieved chapter list.
pub fn extract_detail(
    doc: &Html,
    base: &Url,
    chapters: Vec<Chapter>,
) -> Result<NovelDetail, ScraperError> {
    let title = page_title(doc)?.unwrap_or_default();
    let cover_image_url = page_cover(doc, base)?.unwrap_or_default();

    let mut paragraphs = texts(doc, SYNOPSIS_SELECTOR)?;
    if paragraphs.is_empty() {
        paragraphs = texts(doc, SYNOPSIS_FALLBACK_SELECTOR)?;
    }
    let synopsis = paragraphs.join("\n");

    let author = texts(doc, AUTHOR_SELECTOR)?.join(", ");
    let artist = texts(doc, ARTIST_SELECTOR)?.join(", ");

    // The status block also holds the release year; it never matches a status word.
    let status = NovelStatus::from_label(&texts(doc, STATUS_SELECTOR)?.join(" "));

    let mut tags = texts(doc, GENRE_SELECTOR)?;
    tags.extend(texts(doc, TAG_SELECTOR)?);

    Ok(NovelDetail {
        title,
        cover_image_url,
        synopsis,
        author,
        artist,
        status,
        tags,
        chapters,
    })
}

/// Page heading, then og:title.
pub(crate) fn page_title(doc: &Html) -> Result<Option<String>, ScraperError> {
    let sel = parse_selector(TITLE_SELECTOR)?;
    let heading = doc
        .select(&sel)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty());
    match heading {
        Some(t) => Ok(Some(t)),
        None => meta_property(doc, "og:title"),
    }
}

/// Summary cover image, then og:image.
pub(crate) fn page_cover(doc: &Html, base: &Url) -> Result<Option<String>, ScraperError> {
    let sel = parse_selector(COVER_SELECTOR)?;
    let cover = doc.select(&sel).next().and_then(|img| image_url(img, base));
    match cover {
        Some(c) => Ok(Some(c)),
        None => meta_property(doc, "og:image"),
    }
}

/// Trimmed text of every match, in document order.
fn texts(doc: &Html, selector: &str) -> Result<Vec<String>, ScraperError> {
    let sel = parse_selector(selector)?;
    Ok(doc.select(&sel).map(element_text).collect())
}
