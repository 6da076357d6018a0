//! MeioNovel adapter (Madara WordPress theme). Maps host operations to site URLs.

use crate::model::{ListingPage, NovelDetail};
use crate::scraper::detail::{ensure_page_url, fetch_detail};
use crate::scraper::listing::parse_listing;
use crate::scraper::reader::clean_chapter_html;
use crate::scraper::search::resolve_search;
use crate::scraper::{fetch_html, HttpClient, NovelSource, ScraperError, SiteConfig};

/// Archive ordering accepted by the theme's `m_orderby` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordering {
    Trending,
    Latest,
}

impl Ordering {
    fn as_param(self) -> &'static str {
        match self {
            Ordering::Trending => "trending",
            Ordering::Latest => "latest",
        }
    }
}

/// Catalog page URL for a 1-based page.
pub fn archive_url(site: &SiteConfig, page: u32, order: Ordering) -> String {
    format!(
        "{}/novel/page/{}/?m_orderby={}",
        site.base(),
        page,
        order.as_param()
    )
}

/// MeioNovel source. Holds a reference to the caller's HTTP client.
pub struct MeioNovels<'a> {
    client: &'a mut dyn HttpClient,
    site: SiteConfig,
}

impl<'a> MeioNovels<'a> {
    pub fn new(client: &'a mut dyn HttpClient, site: SiteConfig) -> Self {
        Self { client, site }
    }

    fn list_archive(&mut self, page: u32, order: Ordering) -> Result<ListingPage, ScraperError> {
        let url = archive_url(&self.site, page, order);
        let html = fetch_html(self.client, &url, "catalog")?;
        let listing = parse_listing(&html, self.site.base_url())?;
        tracing::debug!(
            url = %url,
            entries = listing.entries.len(),
            has_more = listing.has_more,
            "catalog page"
        );
        Ok(listing)
    }
}

impl NovelSource for MeioNovels<'_> {
    fn list_popular(&mut self, page: u32) -> Result<ListingPage, ScraperError> {
        self.list_archive(page, Ordering::Trending)
    }

    fn list_latest(&mut self, page: u32) -> Result<ListingPage, ScraperError> {
        self.list_archive(page, Ordering::Latest)
    }

    fn search(&mut self, query: &str, page: u32) -> Result<ListingPage, ScraperError> {
        resolve_search(self.client, &self.site, query, page)
    }

    fn get_detail(&mut self, url: &str) -> Result<NovelDetail, ScraperError> {
        fetch_detail(self.client, &self.site, url)
    }

    fn get_chapter_body(&mut self, url: &str) -> Result<String, ScraperError> {
        let url = ensure_page_url(url)?;
        let html = fetch_html(self.client, &url, "chapter page")?;
        clean_chapter_html(&html)
    }
}
