use std::path::Path;
use std::str::FromStr;

use rand::seq::IndexedRandom;

use crate::app::{Result, TickertapeError};

/// One `host:port:user:pass` proxy endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyEndpoint {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
}

impl ProxyEndpoint {
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl FromStr for ProxyEndpoint {
    type Err = TickertapeError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() != 4 {
            return Err(TickertapeError::Config(format!(
                "Invalid proxy endpoint (expected host:port:user:pass): {}",
                s
            )));
        }
        let port = parts[1]
            .parse::<u16>()
            .map_err(|_| TickertapeError::Config(format!("Invalid proxy port: {}", parts[1])))?;

        Ok(Self {
            host: parts[0].to_string(),
            port,
            user: parts[2].to_string(),
            pass: parts[3].to_string(),
        })
    }
}

/// A pool of proxy endpoints consumed by uniform random choice per request.
#[derive(Debug, Clone, Default)]
pub struct ProxyPool {
    endpoints: Vec<ProxyEndpoint>,
}

impl ProxyPool {
    pub fn new(endpoints: Vec<ProxyEndpoint>) -> Self {
        Self { endpoints }
    }

    /// Load one endpoint per non-empty line.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str_list(&content)
    }

    pub fn from_str_list(content: &str) -> Result<Self> {
        let endpoints = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(ProxyEndpoint::from_str)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { endpoints })
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn choose(&self) -> Option<&ProxyEndpoint> {
        self.endpoints.choose(&mut rand::rng())
    }
}
