use chrono::Utc;
use scraper::Html;

use crate::app::Result;
use crate::domain::Page;
use crate::parser::sites::{linked_tickers, text_of_all};
use crate::parser::{default, PageParser};

/// Yahoo Finance article pages.
pub struct YahooParser;

impl PageParser for YahooParser {
    fn parse(
        &self,
        origin_url: &str,
        resolved_url: &str,
        http_status: u16,
        body: &str,
    ) -> Result<Vec<Page>> {
        let document = Html::parse_document(body);

        let mut page = Page::new(origin_url);
        page.resolved_url = Some(resolved_url.to_string());
        page.http_status = Some(http_status);
        page.fetched_at = Some(Utc::now());

        page.article_title = text_of_all(&document, "header h1")
            .or_else(|| default::document_title(&document));
        page.article_text = text_of_all(&document, ".caas-body p")
            .or_else(|| text_of_all(&document, "article p"));
        page.keywords = default::meta_keywords(&document);
        page.entry_tickers = linked_tickers(&document, resolved_url);

        Ok(vec![page])
    }
}
