use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use super::loader::StatsSource;
use super::models::{
    order_active_first, Category, CategoryFilter, CategoryStats, Period, StatsSummary, SubscriptionRow,
};
use crate::config::ApiConfig;
use crate::{Error, Result};

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// JSON client for the subscription backend
#[derive(Debug, Clone)]
pub struct StatsClient {
    client: Client,
    base_url: Url,
}

impl StatsClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: Self::parse_base(&config.base_url)?,
        })
    }

    /// Base URL with a trailing slash so relative joins keep its path
    fn parse_base(raw: &str) -> Result<Url> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::Config("API base URL is empty".to_string()));
        }
        let with_slash = if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{}/", trimmed)
        };
        Ok(Url::parse(&with_slash)?)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn summary_url(&self, period: Period, category: CategoryFilter) -> Result<Url> {
        let mut url = self.endpoint("api/stats/summary")?;
        url.query_pairs_mut()
            .append_pair("period", period.as_str())
            .append_pair("category_id", &category.to_string());
        Ok(url)
    }

    fn by_category_url(&self, period: Period) -> Result<Url> {
        let mut url = self.endpoint("api/stats/by-category")?;
        url.query_pairs_mut().append_pair("period", period.as_str());
        Ok(url)
    }

    fn subscriptions_url(&self, category: CategoryFilter) -> Result<Url> {
        let mut url = self.endpoint("api/subscriptions")?;
        if let Some(id) = category.id() {
            url.query_pairs_mut().append_pair("category_id", &id.to_string());
        }
        Ok(url)
    }

    fn subscription_url(&self, id: i64) -> Result<Url> {
        self.endpoint(&format!("api/subscriptions/{}", id))
    }

    /// Map a non-2xx response to [`Error::Api`]
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error.or(b.message))
            .filter(|m| !m.is_empty())
            .or_else(|| {
                let text = body.trim();
                (!text.is_empty() && !text.starts_with('<')).then(|| text.to_string())
            })
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        let response = Self::check(response).await?;
        let body = response.text().await?;
        decode(&body)
    }

    async fn patch_json(&self, id: i64, body: serde_json::Value) -> Result<()> {
        let url = self.subscription_url(id)?;
        tracing::debug!(%url, %body, "PATCH");
        let response = self.client.patch(url).json(&body).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn summary(&self, period: Period, category: CategoryFilter) -> Result<StatsSummary> {
        self.get_json(self.summary_url(period, category)?).await
    }

    pub async fn by_category(&self, period: Period) -> Result<CategoryStats> {
        self.get_json(self.by_category_url(period)?).await
    }

    /// Subscriptions for the list, active first
    pub async fn subscriptions(&self, category: CategoryFilter) -> Result<Vec<SubscriptionRow>> {
        let mut rows: Vec<SubscriptionRow> = self.get_json(self.subscriptions_url(category)?).await?;
        order_active_first(&mut rows);
        Ok(rows)
    }

    /// Categories by name
    pub async fn categories(&self) -> Result<Vec<Category>> {
        self.get_json(self.endpoint("api/categories")?).await
    }

    pub async fn set_disabled(&self, id: i64, disabled: bool) -> Result<()> {
        self.patch_json(id, serde_json::json!({ "disabled": disabled })).await
    }

    /// Move a subscription to `category_id`, or out of any category with `None`
    pub async fn set_category(&self, id: i64, category_id: Option<i64>) -> Result<()> {
        self.patch_json(id, serde_json::json!({ "category_id": category_id })).await
    }

    pub async fn delete_subscription(&self, id: i64) -> Result<()> {
        let url = self.subscription_url(id)?;
        tracing::debug!(%url, "DELETE");
        let response = self.client.delete(url).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

/// Parse a response body, reporting malformed payloads as [`Error::Json`]
fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    Ok(serde_json::from_str(body)?)
}

#[async_trait]
impl StatsSource for StatsClient {
    async fn summary(&self, period: Period, category: CategoryFilter) -> Result<StatsSummary> {
        StatsClient::summary(self, period, category).await
    }

    async fn by_category(&self, period: Period) -> Result<CategoryStats> {
        StatsClient::by_category(self, period).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> StatsClient {
        StatsClient::new(&ApiConfig {
            base_url: base.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_summary_url() {
        let c = client("http://127.0.0.1:5000");
        let url = c.summary_url(Period::Quarter, CategoryFilter::All).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:5000/api/stats/summary?period=quarter&category_id=all"
        );

        let url = c.summary_url(Period::Week, CategoryFilter::Id(4)).unwrap();
        assert!(url.as_str().ends_with("period=week&category_id=4"));
    }

    #[test]
    fn test_base_path_is_preserved() {
        let c = client("https://example.com/tracker");
        let url = c.by_category_url(Period::Year).unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/tracker/api/stats/by-category?period=year"
        );
    }

    #[test]
    fn test_subscriptions_url_omits_all_filter() {
        let c = client("http://localhost:5000/");
        assert_eq!(
            c.subscriptions_url(CategoryFilter::All).unwrap().as_str(),
            "http://localhost:5000/api/subscriptions"
        );
        assert_eq!(
            c.subscriptions_url(CategoryFilter::Id(2)).unwrap().as_str(),
            "http://localhost:5000/api/subscriptions?category_id=2"
        );
        assert_eq!(
            c.subscription_url(9).unwrap().as_str(),
            "http://localhost:5000/api/subscriptions/9"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let empty = StatsClient::new(&ApiConfig {
            base_url: "  ".to_string(),
            ..Default::default()
        });
        assert!(matches!(empty, Err(Error::Config(_))));

        let bad = StatsClient::new(&ApiConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        });
        assert!(matches!(bad, Err(Error::UrlParse(_))));
    }

    #[test]
    fn test_decode_reports_json_errors() {
        let stats: CategoryStats = decode(r#"{"items": []}"#).unwrap();
        assert!(stats.items.is_empty());

        let err = decode::<CategoryStats>(r#"{"items": [{"name": 3}]}"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
        let err = decode::<Vec<Category>>("<html>").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_categories_url() {
        let c = client("http://localhost:5000");
        assert_eq!(
            c.endpoint("api/categories").unwrap().as_str(),
            "http://localhost:5000/api/categories"
        );
    }
}
