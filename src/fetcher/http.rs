use std::time::Duration;

use async_trait::async_trait;
use rand::seq::IndexedRandom;
use reqwest::Client;

use crate::fetcher::{FetchError, FetchedPage, Fetcher, ProxyPool};

/// A small rotation of browser identities, picked uniformly per request.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
];

pub struct HttpFetcher {
    client: Client,
    proxies: ProxyPool,
    proxy_enabled: bool,
    timeout: Duration,
    throttle: Duration,
}

impl HttpFetcher {
    pub fn new(timeout_secs: u64, throttle_secs: u64) -> Self {
        let timeout = Duration::from_secs(timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            proxies: ProxyPool::default(),
            proxy_enabled: false,
            timeout,
            throttle: Duration::from_secs(throttle_secs),
        }
    }

    pub fn with_proxies(mut self, proxies: ProxyPool) -> Self {
        self.proxy_enabled = !proxies.is_empty();
        self.proxies = proxies;
        self
    }

    /// reqwest binds proxies at client construction, so proxied requests get
    /// a one-shot client built around the randomly chosen endpoint.
    fn request_client(&self) -> Result<Client, FetchError> {
        if !self.proxy_enabled {
            return Ok(self.client.clone());
        }

        let endpoint = match self.proxies.choose() {
            Some(e) => e,
            None => return Ok(self.client.clone()),
        };

        let proxy = reqwest::Proxy::all(endpoint.url())
            .map(|p| p.basic_auth(&endpoint.user, &endpoint.pass))?;

        let client = Client::builder()
            .timeout(self.timeout)
            .gzip(true)
            .brotli(true)
            .proxy(proxy)
            .build()?;

        Ok(client)
    }

    fn random_user_agent() -> &'static str {
        USER_AGENTS
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(USER_AGENTS[0])
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let client = self.request_client()?;

        let response = client
            .get(url)
            .header(reqwest::header::USER_AGENT, Self::random_user_agent())
            .send()
            .await?;

        let resolved_url = response.url().to_string();
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Status {
                resolved_url,
                status: status.as_u16(),
            });
        }

        // text() decodes according to the response charset.
        let body = response.text().await?;

        if !self.throttle.is_zero() {
            tokio::time::sleep(self.throttle).await;
        }

        Ok(FetchedPage {
            resolved_url,
            http_status: status.as_u16(),
            body,
        })
    }
}
