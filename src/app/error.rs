use thiserror::Error;

#[derive(Error, Debug)]
pub enum TickertapeError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status} from {resolved_url}")]
    ResponseStatus { resolved_url: String, status: u16 },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Parse error for {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Feed parsing error: {0}")]
    FeedParse(String),

    #[error("No entries in feed: {0}")]
    NoEntries(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TickertapeError>;
