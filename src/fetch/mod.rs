mod extract;

pub use extract::{extract_article, extract_links, ExtractedArticle, MAX_CONTENT_CHARS};

use crate::{ArticleText, Fetcher, MonitorError, NewsLink};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Url;
use scraper::Html;
use std::time::Duration;
use tracing::{debug, info};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches the listing page and articles of a news site over plain HTTP.
#[derive(Debug, Clone)]
pub struct NewsSiteFetcher {
    http: reqwest::Client,
    target_url: String,
    base_url: Url,
}

impl NewsSiteFetcher {
    pub fn new(target_url: &str, base_url: &str) -> Result<NewsSiteFetcher, MonitorError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| MonitorError::ConfigError(format!("Invalid base url {base_url}: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(NewsSiteFetcher {
            http,
            target_url: target_url.to_string(),
            base_url,
        })
    }

    async fn get_html(&self, url: &str) -> Result<String, MonitorError> {
        debug!("Visit {}", url);
        Ok(self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?)
    }
}

#[async_trait::async_trait]
impl Fetcher for NewsSiteFetcher {
    async fn fetch_links(&self) -> Result<Vec<NewsLink>, MonitorError> {
        let html = self.get_html(&self.target_url).await?;
        let links = {
            let doc = Html::parse_document(&html);
            extract_links(&doc, &self.base_url)
        };

        info!("Found {} news articles", links.len());
        for (i, link) in links.iter().take(3).enumerate() {
            debug!("Article {}: {} - {}", i + 1, link.title, link.url);
        }
        Ok(links)
    }

    async fn fetch_article(&self, link: &NewsLink) -> Result<Option<ArticleText>, MonitorError> {
        let html = self.get_html(&link.url).await?;
        let article = {
            let doc = Html::parse_document(&html);
            extract_article(&doc)
        };

        Ok(article.map(|a| {
            let headline = a.headline.unwrap_or_else(|| link.title.clone());
            let text = ArticleText::from_parts(&headline, &a.paragraphs);
            debug!(url = %link.url, chars = text.as_str().len(), "Extracted content");
            text
        }))
    }
}
