/// A unit of crawl work: one URL, optionally labelled with a tag
/// (a ticker symbol for feed-derived targets).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTarget {
    pub url: String,
    pub tag: Option<String>,
}

impl FetchTarget {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            tag: None,
        }
    }

    pub fn tagged(url: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            tag: Some(tag.into()),
        }
    }
}
