//! CLI parsing and orchestration. Runs one source operation and prints the result
//! (JSON for listings and details, the HTML fragment for chapters). Maps errors to exit codes.

use crate::config::{self, Config};
use crate::scraper::{
    MeioNovels, NovelSource, PoliteClient, PoliteClientBuilder, ScraperError, SiteConfig,
    MEIONOVELS_BASE, MEIONOVELS_ICON,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// CLI error carrying exit code and message.
#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Scraper(#[from] ScraperError),

    #[error("{0}")]
    Output(String),
}

impl CliRunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliRunError::InvalidInput(_) => 1,
            CliRunError::Scraper(_) => 2,
            CliRunError::Output(_) => 3,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "meioscrape")]
#[command(about = "Browse MeioNovel: catalog pages, search, novel details and chapter text")]
#[command(
    after_help = "Config file keys (base_url, icon_url, user_agent, request_delay_secs, timeout_secs, retry_count, retry_backoff_secs) are read from ./meioscrape.toml or the user config dir. CLI flags override config. Set RUST_LOG for finer log control."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Site base URL (overrides config; default https://meionovels.com).
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// HTTP User-Agent (overrides config).
    #[arg(long, global = true)]
    pub user_agent: Option<String>,

    /// Delay between requests in seconds (overrides config; default 1).
    #[arg(long, global = true)]
    pub delay: Option<u64>,

    /// Request timeout in seconds (overrides config; default 30).
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Debug logging and full error chain on failure.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Trending novels.
    Popular {
        #[arg(long, default_value_t = 1, value_parser = parse_page)]
        page: u32,
    },
    /// Recently updated novels.
    Latest {
        #[arg(long, default_value_t = 1, value_parser = parse_page)]
        page: u32,
    },
    /// Search by title; falls back to guessing the novel's slug on page 1.
    Search {
        query: String,
        #[arg(long, default_value_t = 1, value_parser = parse_page)]
        page: u32,
    },
    /// Novel metadata and chapter list (oldest first).
    Detail { url: String },
    /// Cleaned chapter HTML.
    Chapter { url: String },
}

fn parse_page(s: &str) -> Result<u32, String> {
    let page: u32 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid --page: '{}' is not a positive number", s))?;
    if page == 0 {
        return Err("Invalid --page: pages start at 1".to_string());
    }
    Ok(page)
}

/// Install the stderr log subscriber. RUST_LOG wins; otherwise warn, or debug with --verbose.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Site constants from flags, then config, then built-in defaults.
fn site_config(args: &Args, config: Option<&Config>) -> Result<SiteConfig, CliRunError> {
    let base_url = args
        .base_url
        .clone()
        .or_else(|| config.and_then(|c| c.base_url.clone()))
        .unwrap_or_else(|| MEIONOVELS_BASE.to_string());
    let icon_url = config
        .and_then(|c| c.icon_url.clone())
        .unwrap_or_else(|| MEIONOVELS_ICON.to_string());
    SiteConfig::new(&base_url, icon_url).map_err(|e| {
        CliRunError::InvalidInput(format!(
            "Expected a site URL such as {}. {}",
            MEIONOVELS_BASE, e
        ))
    })
}

/// Client settings from flags, then config. Anything unset keeps the builder default.
fn client_builder(args: &Args, config: Option<&Config>) -> PoliteClientBuilder {
    let mut builder = PoliteClient::builder();
    if let Some(secs) = args.delay.or_else(|| config.and_then(|c| c.request_delay_secs)) {
        builder = builder.delay_secs(secs);
    }
    if let Some(secs) = args.timeout.or_else(|| config.and_then(|c| c.timeout_secs)) {
        builder = builder.timeout_secs(secs);
    }
    if let Some(n) = config.and_then(|c| c.retry_count) {
        builder = builder.retry_count(n);
    }
    if let Some(secs) = config.and_then(|c| c.retry_backoff_secs.clone()) {
        builder = builder.retry_backoff_secs(secs);
    }
    if let Some(ua) = args
        .user_agent
        .clone()
        .or_else(|| config.and_then(|c| c.user_agent.clone()))
    {
        builder = builder.user_agent(ua);
    }
    builder
}

fn build_client(args: &Args, config: Option<&Config>) -> Result<PoliteClient, CliRunError> {
    client_builder(args, config)
        .build()
        .map_err(|e| CliRunError::InvalidInput(format!("Failed to create HTTP client: {}", e)))
}

fn render_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, CliRunError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    rendered.map_err(|e| CliRunError::Output(format!("Failed to write JSON: {}", e)))
}

/// Run the selected operation against a source and return what should be printed.
fn execute(
    source: &mut dyn NovelSource,
    command: &Command,
    pretty: bool,
) -> Result<String, CliRunError> {
    match command {
        Command::Popular { page } => render_json(&source.list_popular(*page)?, pretty),
        Command::Latest { page } => render_json(&source.list_latest(*page)?, pretty),
        Command::Search { query, page } => {
            if query.trim().is_empty() {
                return Err(CliRunError::InvalidInput(
                    "Search query must not be empty.".to_string(),
                ));
            }
            render_json(&source.search(query, *page)?, pretty)
        }
        Command::Detail { url } => render_json(&source.get_detail(url)?, pretty),
        Command::Chapter { url } => Ok(source.get_chapter_body(url)?),
    }
}

/// Entry point for the CLI. Returns Ok(()) on success; Err with exit code and message on failure.
pub fn run(args: &Args) -> Result<(), CliRunError> {
    let config = config::load_config().map_err(CliRunError::InvalidInput)?;
    let site = site_config(args, config.as_ref())?;
    let mut client = build_client(args, config.as_ref())?;
    let mut source = MeioNovels::new(&mut client, site);

    let output = execute(&mut source, &args.command, args.pretty)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", output)
        .map_err(|e| CliRunError::Output(format!("Failed to write output: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ListingEntry, ListingPage, NovelDetail};

    /// Source that answers every call with fixed data.
    struct FixedSource;

    impl NovelSource for FixedSource {
        fn list_popular(&mut self, page: u32) -> Result<ListingPage, ScraperError> {
            Ok(ListingPage {
                entries: vec![ListingEntry {
                    title: format!("Popular {}", page),
                    cover_image_url: String::new(),
                    detail_link: "https://meionovels.com/novel/p/".to_string(),
                }],
                has_more: true,
            })
        }
        fn list_latest(&mut self, _page: u32) -> Result<ListingPage, ScraperError> {
            Ok(ListingPage::default())
        }
        fn search(&mut self, _query: &str, _page: u32) -> Result<ListingPage, ScraperError> {
            Ok(ListingPage::default())
        }
        fn get_detail(&mut self, url: &str) -> Result<NovelDetail, ScraperError> {
            Err(ScraperError::HttpStatus {
                status: 404,
                url: url.to_string(),
                context: Some("detail page".to_string()),
            })
        }
        fn get_chapter_body(&mut self, _url: &str) -> Result<String, ScraperError> {
            Ok("<h2>Bab 1</h2><hr><br><p>Isi</p>".to_string())
        }
    }

    fn args(cmd: &[&str]) -> Args {
        let mut argv = vec!["meioscrape"];
        argv.extend_from_slice(cmd);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn parse_page_valid_and_invalid() {
        assert_eq!(parse_page("1").unwrap(), 1);
        assert_eq!(parse_page(" 12 ").unwrap(), 12);
        assert!(parse_page("0").is_err());
        assert!(parse_page("-1").is_err());
        assert!(parse_page("abc").is_err());
    }

    #[test]
    fn subcommands_parse() {
        assert_eq!(args(&["popular"]).command, Command::Popular { page: 1 });
        assert_eq!(
            args(&["latest", "--page", "3"]).command,
            Command::Latest { page: 3 }
        );
        assert_eq!(
            args(&["search", "the great novel", "--page", "2"]).command,
            Command::Search {
                query: "the great novel".to_string(),
                page: 2
            }
        );
        let a = args(&["--pretty", "detail", "https://meionovels.com/novel/x/"]);
        assert!(a.pretty);
        assert!(Args::try_parse_from(["meioscrape", "popular", "--page", "0"]).is_err());
    }

    #[test]
    fn site_config_prefers_flag_over_config() -> Result<(), CliRunError> {
        let config = Config {
            base_url: Some("https://config.example.com".to_string()),
            icon_url: Some("https://config.example.com/icon.png".to_string()),
            ..Config::default()
        };
        let a = args(&["--base-url", "https://flag.example.com", "popular"]);
        let site = site_config(&a, Some(&config))?;
        assert_eq!(site.base(), "https://flag.example.com");
        assert_eq!(site.icon_url(), "https://config.example.com/icon.png");

        let site = site_config(&args(&["popular"]), None)?;
        assert_eq!(site.base(), MEIONOVELS_BASE);
        Ok(())
    }

    #[test]
    fn client_builder_only_overrides_what_is_set() {
        assert_eq!(
            client_builder(&args(&["popular"]), None),
            PoliteClientBuilder::default()
        );

        let config = Config {
            request_delay_secs: Some(4),
            retry_count: Some(5),
            user_agent: Some("Config/1.0".to_string()),
            ..Config::default()
        };
        let a = args(&["--delay", "2", "--timeout", "9", "popular"]);
        assert_eq!(
            client_builder(&a, Some(&config)),
            PoliteClientBuilder::default()
                .delay_secs(2)
                .timeout_secs(9)
                .retry_count(5)
                .user_agent("Config/1.0")
        );
    }

    #[test]
    fn site_config_rejects_bad_base_url() {
        let a = args(&["--base-url", "nope", "popular"]);
        assert!(matches!(
            site_config(&a, None),
            Err(CliRunError::InvalidInput(_))
        ));
    }

    #[test]
    fn execute_renders_listing_json() -> Result<(), CliRunError> {
        let out = execute(&mut FixedSource, &Command::Popular { page: 2 }, false)?;
        let value: serde_json::Value =
            serde_json::from_str(&out).map_err(|e| CliRunError::Output(e.to_string()))?;
        assert_eq!(value["entries"][0]["title"].as_str(), Some("Popular 2"));
        assert_eq!(value["hasMore"].as_bool(), Some(true));
        Ok(())
    }

    #[test]
    fn execute_prints_chapter_html_verbatim() -> Result<(), CliRunError> {
        let out = execute(
            &mut FixedSource,
            &Command::Chapter {
                url: "https://meionovels.com/novel/x/bab-1/".to_string(),
            },
            true,
        )?;
        assert_eq!(out, "<h2>Bab 1</h2><hr><br><p>Isi</p>");
        Ok(())
    }

    #[test]
    fn execute_rejects_blank_search_and_maps_scraper_errors() {
        let blank = execute(
            &mut FixedSource,
            &Command::Search {
                query: "  ".to_string(),
                page: 1,
            },
            false,
        );
        assert!(matches!(blank, Err(CliRunError::InvalidInput(_))));

        let missing = execute(
            &mut FixedSource,
            &Command::Detail {
                url: "https://meionovels.com/novel/gone/".to_string(),
            },
            false,
        );
        match missing {
            Err(e) => assert_eq!(e.exit_code(), 2),
            Ok(out) => panic!("expected error, got {}", out),
        }
    }

    #[test]
    fn cli_run_error_exit_codes() {
        assert_eq!(CliRunError::InvalidInput("x".into()).exit_code(), 1);
        assert_eq!(
            CliRunError::Scraper(ScraperError::InvalidUrl {
                input: "x".into(),
                reason: "y".into()
            })
            .exit_code(),
            2
        );
        assert_eq!(CliRunError::Output("x".into()).exit_code(), 3);
    }
}
