//! MeioNovel extraction pipeline: HTTP seam, shared markup helpers, and the site adapter.
//!
//! Leaf-first: [`dates`] normalizes release dates, [`listing`] parses catalog pages,
//! [`search`] layers query fallbacks and slug probing on top of it, [`chapters`] and
//! [`detail`] build a [`NovelDetail`](crate::model::NovelDetail), and [`reader`] cleans
//! chapter pages. [`meionovels`] ties them to URLs and implements [`NovelSource`].

mod client;
mod error;

pub mod chapters;
pub mod dates;
pub mod detail;
pub mod listing;
pub mod meionovels;
pub mod reader;
pub mod search;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use client::{HttpClient, HttpResponse, PoliteClient, PoliteClientBuilder};
pub use error::{ScraperError, TransportError};
pub use meionovels::MeioNovels;

use crate::model::{ListingPage, NovelDetail};
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

pub const MEIONOVELS_BASE: &str = "https://meionovels.com";
pub const MEIONOVELS_ICON: &str =
    "https://raw.githubusercontent.com/Schnitzel5/sugoi-modules/main/javascript/icon/id.meionovels.png";

/// Site constants supplied by the host: base URL and placeholder icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    base_url: Url,
    icon_url: String,
}

impl SiteConfig {
    pub fn new(base_url: &str, icon_url: impl Into<String>) -> Result<Self, ScraperError> {
        let base_url = Url::parse(base_url).map_err(|e| ScraperError::InvalidUrl {
            input: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.host_str().is_none() {
            return Err(ScraperError::InvalidUrl {
                input: base_url.to_string(),
                reason: "URL has no host".to_string(),
            });
        }
        Ok(Self {
            base_url,
            icon_url: icon_url.into(),
        })
    }

    /// MeioNovel defaults.
    pub fn meionovels() -> Result<Self, ScraperError> {
        Self::new(MEIONOVELS_BASE, MEIONOVELS_ICON)
    }

    /// Base URL without trailing slash, for building request URLs.
    pub fn base(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Base URL for resolving relative links.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn icon_url(&self) -> &str {
        &self.icon_url
    }
}

/// Host-facing operations of a novel source.
///
/// Each call is independent: it fetches what it needs through the borrowed client and
/// returns a fresh value. Empty results are successes, not errors.
pub trait NovelSource {
    fn list_popular(&mut self, page: u32) -> Result<ListingPage, ScraperError>;
    fn list_latest(&mut self, page: u32) -> Result<ListingPage, ScraperError>;
    fn search(&mut self, query: &str, page: u32) -> Result<ListingPage, ScraperError>;
    fn get_detail(&mut self, url: &str) -> Result<NovelDetail, ScraperError>;
    /// Cleaned chapter HTML fragment (see [`reader::clean_chapter_html`]).
    fn get_chapter_body(&mut self, url: &str) -> Result<String, ScraperError>;
}

/// Outcome of a pipeline step that has a fallback behind it.
///
/// Such steps never return `Err`; callers branch on `Empty` and log the reason.
#[derive(Debug)]
pub enum Step<T> {
    Found(T),
    Empty(EmptyReason),
}

/// Why a fallback-bearing step produced nothing.
#[derive(Debug)]
pub enum EmptyReason {
    /// The page carried no post identifier for the chapter endpoint.
    MissingPostId,
    /// The request failed or answered with a non-2xx status.
    Transport(ScraperError),
    /// The page arrived but could not be read (bad selector, unusable markup).
    Markup(ScraperError),
    /// The response parsed but matched nothing.
    NoMatches,
}

impl EmptyReason {
    /// True when the fetch itself failed: unreachable host, timeout, body read error.
    /// Non-2xx answers and markup problems are not transport failures.
    pub fn is_transport(&self) -> bool {
        match self {
            EmptyReason::Transport(e) => e.is_transport(),
            _ => false,
        }
    }
}

/// Parse a CSS selector or return a selector error (avoids panics from Selector::parse).
pub(crate) fn parse_selector(sel: &str) -> Result<Selector, ScraperError> {
    Selector::parse(sel).map_err(|e| ScraperError::Selector {
        selector: sel.to_string(),
        reason: e.to_string(),
    })
}

/// GET `url` and return the body of a 2xx response.
pub(crate) fn fetch_html(
    client: &mut dyn HttpClient,
    url: &str,
    context: &str,
) -> Result<String, ScraperError> {
    client.get(url)?.into_body(url, Some(context))
}

/// All text of an element, trimmed.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Resolve `href` against `base`. None for empty, fragment-only or unparseable links.
pub(crate) fn absolute_url(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    base.join(href).ok().map(|u| u.to_string())
}

/// Image URL from `src`, then the lazy-load attributes the Madara theme uses.
/// Inline `data:` placeholders are skipped.
pub(crate) fn image_url(img: ElementRef<'_>, base: &Url) -> Option<String> {
    ["src", "data-src", "data-lazy-src"]
        .iter()
        .filter_map(|attr| img.value().attr(attr))
        .map(str::trim)
        .find(|src| !src.is_empty() && !src.starts_with("data:"))
        .and_then(|src| absolute_url(src, base))
}

/// `content` of `<meta property="{property}">`, if present and non-empty.
pub(crate) fn meta_property(doc: &Html, property: &str) -> Result<Option<String>, ScraperError> {
    let sel = parse_selector(&format!("meta[property=\"{}\"]", property))?;
    Ok(doc
        .select(&sel)
        .next()
        .and_then(|e| e.value().attr("content"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse(MEIONOVELS_BASE).unwrap()
    }

    #[test]
    fn site_config_base_has_no_trailing_slash() -> Result<(), ScraperError> {
        let site = SiteConfig::new("https://meionovels.com/", MEIONOVELS_ICON)?;
        assert_eq!(site.base(), "https://meionovels.com");
        assert_eq!(site.icon_url(), MEIONOVELS_ICON);
        Ok(())
    }

    #[test]
    fn site_config_rejects_invalid_base() {
        assert!(matches!(
            SiteConfig::new("not a url", MEIONOVELS_ICON),
            Err(ScraperError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn absolute_url_resolves_relative_and_skips_fragments() {
        assert_eq!(
            absolute_url("/novel/abc/", &base()).as_deref(),
            Some("https://meionovels.com/novel/abc/")
        );
        assert_eq!(
            absolute_url("https://cdn.example.com/a.jpg", &base()).as_deref(),
            Some("https://cdn.example.com/a.jpg")
        );
        assert!(absolute_url("", &base()).is_none());
        assert!(absolute_url("#", &base()).is_none());
    }

    #[test]
    fn image_url_prefers_real_src_over_placeholder() -> Result<(), ScraperError> {
        let doc = Html::parse_fragment(
            r#"<img src="data:image/gif;base64,R0lGOD" data-src="/wp-content/cover.jpg">"#,
        );
        let sel = parse_selector("img")?;
        let img = doc.select(&sel).next().unwrap();
        assert_eq!(
            image_url(img, &base()).as_deref(),
            Some("https://meionovels.com/wp-content/cover.jpg")
        );
        Ok(())
    }

    #[test]
    fn meta_property_reads_content() -> Result<(), ScraperError> {
        let doc = Html::parse_document(
            r#"<html><head><meta property="og:title" content=" Judul Novel "><meta property="og:image" content=""></head></html>"#,
        );
        assert_eq!(meta_property(&doc, "og:title")?.as_deref(), Some("Judul Novel"));
        assert!(meta_property(&doc, "og:image")?.is_none());
        Ok(())
    }

    #[test]
    fn only_failed_fetches_count_as_transport() {
        let unreachable = EmptyReason::Transport(ScraperError::Network {
            url: "https://meionovels.com/".to_string(),
            source: "connection refused".into(),
        });
        assert!(unreachable.is_transport());
        let not_found = EmptyReason::Transport(ScraperError::HttpStatus {
            status: 404,
            url: "https://meionovels.com/novel/x/".to_string(),
            context: None,
        });
        assert!(!not_found.is_transport());
        let markup = EmptyReason::Markup(ScraperError::Selector {
            selector: "div[".to_string(),
            reason: "unexpected end".to_string(),
        });
        assert!(!markup.is_transport());
        assert!(!EmptyReason::NoMatches.is_transport());
    }
}
