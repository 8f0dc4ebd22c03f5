use chrono::{DateTime, Utc};
use scraper::{Html, Selector};

use crate::app::Result;
use crate::domain::Page;
use crate::parser::sites::{linked_tickers, text_of_all};
use crate::parser::{default, PageParser};

/// CNBC article pages. Headline and body selectors follow CNBC's article
/// templates; publish time comes from the `article:published_time` meta tag.
pub struct CnbcParser;

impl PageParser for CnbcParser {
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

        page.article_title = text_of_all(&document, "h1.ArticleHeader-headline")
            .or_else(|| default::document_title(&document));
        page.article_text = text_of_all(&document, ".ArticleBody-articleBody p")
            .or_else(|| text_of_all(&document, "article p"));
        page.article_published_at = published_time(&document);
        page.keywords = default::meta_keywords(&document);
        page.entry_tickers = linked_tickers(&document, resolved_url);

        Ok(vec![page])
    }
}

fn published_time(document: &Html) -> Option<DateTime<Utc>> {
    let selector = Selector::parse("meta[property=\"article:published_time\"]").ok()?;
    let content = document.select(&selector).next()?.value().attr("content")?;
    DateTime::parse_from_rfc3339(content)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = r#"<html><head>
        <title>fallback title</title>
        <meta property="article:published_time" content="2020-08-09T12:30:00Z">
        <meta name="keywords" content="markets,earnings">
        </head><body>
        <h1 class="ArticleHeader-headline">Stocks rally on earnings</h1>
        <div class="ArticleBody-articleBody">
            <p>First paragraph with <a href="/quotes/?symbol=TSLA">Tesla</a>.</p>
            <p>Second paragraph.</p>
        </div>
        </body></html>"#;

    #[test]
    fn test_parses_cnbc_article() {
        let pages = CnbcParser
            .parse(
                "https://www.cnbc.com/2020/08/09/story.html",
                "https://www.cnbc.com/2020/08/09/story.html",
                200,
                ARTICLE,
            )
            .unwrap();

        let page = &pages[0];
        assert_eq!(
            page.article_title.as_deref(),
            Some("Stocks rally on earnings")
        );
        assert!(page.article_text.as_deref().unwrap().contains("Second paragraph"));
        assert_eq!(page.entry_tickers, vec!["TSLA"]);
        assert_eq!(page.keywords, vec!["markets", "earnings"]);
        assert_eq!(
            page.article_published_at.unwrap().to_rfc3339(),
            "2020-08-09T12:30:00+00:00"
        );
    }

    #[test]
    fn test_falls_back_to_document_title() {
        let pages = CnbcParser
            .parse(
                "https://www.cnbc.com/x",
                "https://www.cnbc.com/x",
                200,
                "<html><head><title>fallback title</title></head><body></body></html>",
            )
            .unwrap();
        assert_eq!(pages[0].article_title.as_deref(), Some("fallback title"));
    }
}
