//! meioscrape: MeioNovel site adapter. Catalog listings, search with slug probing,
//! novel details with chapter lists, and cleaned chapter text.

pub mod cli;
pub mod config;
pub mod model;
pub mod scraper;

// Re-exports for CLI and consumers.
pub use model::{Chapter, ChapterBody, ListingEntry, ListingPage, NovelDetail, NovelStatus};
pub use scraper::{
    HttpClient, HttpResponse, MeioNovels, NovelSource, PoliteClient, PoliteClientBuilder,
    ScraperError, SiteConfig,
};
