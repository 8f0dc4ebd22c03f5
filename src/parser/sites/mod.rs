//! Site-specific article parsers.

pub mod cnbc;
pub mod yahoo;

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Ticker symbols linked from within an article body, taken from anchor
/// `?symbol=` query parameters (the markup both CNBC and Yahoo use for
/// inline quote links).
pub(crate) fn linked_tickers(document: &Html, base: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    let base_url = Url::parse(base).ok();

    let mut tickers = Vec::new();
    for anchor in document.select(&selector) {
        if let Some(symbol) = anchor_symbol(&anchor, base_url.as_ref()) {
            if !tickers.contains(&symbol) {
                tickers.push(symbol);
            }
        }
    }
    tickers
}

fn anchor_symbol(anchor: &ElementRef<'_>, base: Option<&Url>) -> Option<String> {
    let href = anchor.value().attr("href")?;
    let url = match Url::parse(href) {
        Ok(u) => u,
        Err(_) => base?.join(href).ok()?,
    };
    url.query_pairs()
        .find(|(k, _)| k == "symbol")
        .map(|(_, v)| v.to_string())
        .filter(|s| !s.is_empty())
}

/// Concatenated text of every element matching `selector`.
pub(crate) fn text_of_all(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let mut out = String::new();
    for element in document.select(&selector) {
        let text = element.text().collect::<Vec<_>>().join(" ");
        let text = text.trim();
        if !text.is_empty() {
            out.push_str(text);
            out.push('\n');
        }
    }
    (!out.is_empty()).then(|| out.trim_end().to_string())
}
