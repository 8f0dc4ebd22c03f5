#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use tickertape::fetcher::{FetchError, FetchedPage, Fetcher};

pub enum MockResponse {
    Ok { resolved_url: Option<String>, body: String },
    Status(u16),
    Transport,
}

/// Canned-response fetcher that counts how often the network is hit.
#[derive(Default)]
pub struct MockFetcher {
    responses: Mutex<HashMap<String, MockResponse>>,
    fetches: AtomicUsize,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(&self, url: &str, body: &str) {
        self.respond(
            url,
            MockResponse::Ok {
                resolved_url: None,
                body: body.to_string(),
            },
        );
    }

    pub fn respond(&self, url: &str, response: MockResponse) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), response);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        match self.responses.lock().unwrap().get(url) {
            Some(MockResponse::Ok { resolved_url, body }) => Ok(FetchedPage {
                resolved_url: resolved_url.clone().unwrap_or_else(|| url.to_string()),
                http_status: 200,
                body: body.clone(),
            }),
            Some(MockResponse::Status(status)) => Err(FetchError::Status {
                resolved_url: url.to_string(),
                status: *status,
            }),
            Some(MockResponse::Transport) | None => {
                Err(FetchError::Transport("connection reset".into()))
            }
        }
    }
}

pub fn article_html(title: &str) -> String {
    format!(
        "<html><head><title>{}</title>\
         <meta name=\"keywords\" content=\"finance\"></head>\
         <body><p>body</p></body></html>",
        title
    )
}
