//! In-memory [`HttpClient`] for tests: canned responses per URL, and a log of requests.

use crate::scraper::{HttpClient, HttpResponse, ScraperError};
use std::collections::HashMap;

enum Scripted {
    Response(HttpResponse),
    Unreachable,
}

/// Replays scripted responses. Unscripted URLs answer 404.
#[derive(Default)]
pub struct ScriptedClient {
    routes: HashMap<String, Scripted>,
    pub requested: Vec<String>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, body: &str) -> Self {
        self.routes.insert(
            url.to_string(),
            Scripted::Response(HttpResponse {
                status: 200,
                body: body.to_string(),
            }),
        );
        self
    }

    pub fn status(mut self, url: &str, status: u16) -> Self {
        self.routes.insert(
            url.to_string(),
            Scripted::Response(HttpResponse {
                status,
                body: String::new(),
            }),
        );
        self
    }

    /// Make `url` fail at the transport level.
    pub fn unreachable(mut self, url: &str) -> Self {
        self.routes.insert(url.to_string(), Scripted::Unreachable);
        self
    }
}

impl HttpClient for ScriptedClient {
    fn get(&mut self, url: &str) -> Result<HttpResponse, ScraperError> {
        self.requested.push(url.to_string());
        match self.routes.get(url) {
            Some(Scripted::Response(r)) => Ok(r.clone()),
            Some(Scripted::Unreachable) => Err(ScraperError::Network {
                url: url.to_string(),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "connection refused",
                )),
            }),
            None => Ok(HttpResponse {
                status: 404,
                body: String::new(),
            }),
        }
    }
}
