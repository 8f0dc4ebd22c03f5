use chrono::Utc;
use scraper::{Html, Selector};

use crate::app::Result;
use crate::domain::Page;
use crate::parser::PageParser;

/// Fallback parser for domains without a dedicated one: document title plus
/// `<meta name="keywords">`, nothing else.
pub struct DefaultParser;

impl PageParser for DefaultParser {
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
        page.article_title = document_title(&document);
        page.keywords = meta_keywords(&document);

        Ok(vec![page])
    }
}

pub(crate) fn document_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    let title = document
        .select(&selector)
        .next()?
        .text()
        .collect::<String>()
        .trim()
        .to_string();
    (!title.is_empty()).then_some(title)
}

pub(crate) fn meta_keywords(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("meta[name=\"keywords\"]") else {
        return Vec::new();
    };
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .flat_map(|content| content.split(','))
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect()
}
