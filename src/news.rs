//! Thin NewsAPI client used by the intel command.
//!
//! Failures here are never fatal to the bot: callers surface a notice and
//! move on. Outbound requests go through a leaky-bucket limiter so a burst
//! of commands cannot hammer the API.

use leaky_bucket::RateLimiter;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const TOP_HEADLINES_URL: &str = "https://newsapi.org/v2/top-headlines";
const EVERYTHING_URL: &str = "https://newsapi.org/v2/everything";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum NewsError {
    #[error("news request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("news API returned status {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct ArticlesResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

pub struct NewsClient {
    client: reqwest::Client,
    api_key: String,
    limiter: RateLimiter,
}

impl NewsClient {
    pub fn new(api_key: String) -> Result<Self, NewsError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_key,
            limiter: RateLimiter::builder()
                .interval(Duration::from_secs(2))
                .refill(1)
                .max(3)
                .initial(3)
                .build(),
        })
    }

    /// Top headlines for a country, falling back to a keyword search when the
    /// country feed comes back empty.
    pub async fn country_news(
        &self,
        country_code: &str,
        country_name: &str,
        page_size: usize,
    ) -> Result<Vec<Article>, NewsError> {
        let headlines = self
            .fetch(
                TOP_HEADLINES_URL,
                &[
                    ("country", country_code),
                    ("pageSize", &page_size.to_string()),
                    ("language", "en"),
                ],
            )
            .await?;
        if !headlines.is_empty() {
            return Ok(headlines);
        }
        self.fetch(
            EVERYTHING_URL,
            &[
                ("q", country_name),
                ("sortBy", "publishedAt"),
                ("pageSize", &page_size.to_string()),
                ("language", "en"),
            ],
        )
        .await
    }

    async fn fetch(&self, url: &str, params: &[(&str, &str)]) -> Result<Vec<Article>, NewsError> {
        self.limiter.acquire_one().await;
        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(NewsError::Status(response.status()));
        }
        let parsed: ArticlesResponse = response.json().await?;
        Ok(parsed.articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_articles_payload() {
        let raw = r#"{
            "status": "ok",
            "totalResults": 2,
            "articles": [
                {"title": "Alpha", "url": "https://example.com/a", "author": null},
                {"title": "Bravo", "url": "https://example.com/b", "source": {"name": "x"}}
            ]
        }"#;
        let parsed: ArticlesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            parsed.articles,
            vec![
                Article {
                    title: String::from("Alpha"),
                    url: String::from("https://example.com/a"),
                },
                Article {
                    title: String::from("Bravo"),
                    url: String::from("https://example.com/b"),
                },
            ]
        );
    }

    #[test]
    fn missing_articles_field_parses_empty() {
        let parsed: ArticlesResponse = serde_json::from_str(r#"{"status": "error"}"#).unwrap();
        assert!(parsed.articles.is_empty());
    }
}
