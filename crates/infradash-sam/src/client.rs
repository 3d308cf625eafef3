//! SAM.gov opportunities client.

use std::fmt;
use std::time::Duration;

use chrono::NaiveDate;
use infradash_core::{DataError, Result};
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use tracing::debug;

/// Production API root.
pub const SAM_API_BASE: &str = "https://api.sam.gov";

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "SAM_API_KEY";

/// Page size used by the tender alert.
pub const DEFAULT_LIMIT: usize = 100;

/// Date format SAM expects for `postedFrom` / `postedTo`.
const SAM_DATE_FORMAT: &str = "%m/%d/%Y";

/// Reads an explicit JSON `null` as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One contract opportunity posting.
///
/// SAM sends `null` for text fields it has no value for; those decode as
/// empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Opportunity {
    /// Unique notice identifier.
    #[serde(rename = "noticeId", default, deserialize_with = "null_as_default")]
    pub notice_id: String,
    /// Posting title.
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Full agency path, e.g. `DEPT OF DEFENSE.DEPT OF THE NAVY`.
    #[serde(
        rename = "fullParentPathName",
        default,
        deserialize_with = "null_as_default"
    )]
    pub agency: String,
    /// Description text.
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Public page of the posting.
    #[serde(rename = "uiLink", default)]
    pub link: Option<String>,
    /// Posting date as sent by SAM.
    #[serde(rename = "postedDate", default)]
    pub posted_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "totalRecords", default)]
    total_records: Option<u64>,
    #[serde(
        rename = "opportunitiesData",
        default,
        deserialize_with = "null_as_default"
    )]
    opportunities: Vec<Opportunity>,
}

/// SAM.gov Get Opportunities client.
#[derive(Clone)]
pub struct SamClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl fmt::Debug for SamClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SamClient")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl SamClient {
    /// Create a client with a 30 second timeout.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_key: api_key.into(),
            base_url: SAM_API_BASE.to_string(),
        }
    }

    /// Reads `SAM_API_KEY` through `lookup`.
    ///
    /// # Errors
    /// Returns [`DataError::MissingCredential`] if the key is absent or blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(API_KEY_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(Self::new)
            .ok_or_else(|| DataError::MissingCredential(API_KEY_VAR.to_string()))
    }

    /// Point the client at a different API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Fetch postings published between `from` and `to`, inclusive.
    ///
    /// Postings without a notice ID are dropped.
    ///
    /// # Errors
    /// Network failures, non-success statuses and undecodable bodies.
    pub async fn search(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        limit: usize,
    ) -> Result<Vec<Opportunity>> {
        let url = format!("{}/opportunities/v2/search", self.base_url);
        let posted_from = from.format(SAM_DATE_FORMAT).to_string();
        let posted_to = to.format(SAM_DATE_FORMAT).to_string();
        let limit = limit.to_string();

        debug!(%posted_from, %posted_to, %limit, "SAM request");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("postedFrom", posted_from.as_str()),
                ("postedTo", posted_to.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DataError::RateLimited {
                provider: "SAM.gov".to_string(),
                retry_after: None,
            });
        }

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(DataError::Network(format!("HTTP {status}: {text}")));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| DataError::Parse(e.to_string()))?;

        debug!(
            total = ?body.total_records,
            returned = body.opportunities.len(),
            "SAM response"
        );

        Ok(body
            .opportunities
            .into_iter()
            .filter(|o| !o.notice_id.is_empty())
            .collect())
    }

    /// Fetch postings published on `day`.
    ///
    /// # Errors
    /// See [`search`](Self::search).
    pub async fn fetch_day(&self, day: NaiveDate, limit: usize) -> Result<Vec<Opportunity>> {
        self.search(day, day, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_from_lookup() {
        assert!(SamClient::from_lookup(|_| Some("key".into())).is_ok());

        let err = SamClient::from_lookup(|_| None).unwrap_err();
        assert!(matches!(err, DataError::MissingCredential(ref v) if v == "SAM_API_KEY"));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let debug_str = format!("{:?}", SamClient::new("sam-secret"));
        assert!(!debug_str.contains("sam-secret"));
    }

    #[test]
    fn test_opportunity_defaults() {
        let opp: Opportunity = serde_json::from_value(json!({"noticeId": "abc"})).unwrap();
        assert_eq!(opp.notice_id, "abc");
        assert!(opp.description.is_empty());
        assert_eq!(opp.link, None);
    }

    #[tokio::test]
    async fn test_fetch_day_sends_us_dates() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/opportunities/v2/search"))
            .and(query_param("api_key", "k"))
            .and(query_param("postedFrom", "03/07/2025"))
            .and(query_param("postedTo", "03/07/2025"))
            .and(query_param("limit", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "totalRecords": 2,
                "opportunitiesData": [
                    {
                        "noticeId": "n-1",
                        "title": "Hypersonic test range support",
                        "fullParentPathName": "DEPT OF DEFENSE.DEPT OF THE AIR FORCE",
                        "description": "Long text",
                        "uiLink": "https://sam.gov/opp/n-1/view"
                    },
                    {"title": "no id"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SamClient::new("k").with_base_url(server.uri());
        let day = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        let opps = client.fetch_day(day, DEFAULT_LIMIT).await.unwrap();

        assert_eq!(opps.len(), 1);
        assert_eq!(opps[0].agency, "DEPT OF DEFENSE.DEPT OF THE AIR FORCE");
        assert_eq!(opps[0].link.as_deref(), Some("https://sam.gov/opp/n-1/view"));
    }

    #[tokio::test]
    async fn test_null_fields_do_not_fail_the_page() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/opportunities/v2/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "totalRecords": 2,
                "opportunitiesData": [
                    {
                        "noticeId": "a",
                        "title": "Grid modernization study",
                        "fullParentPathName": "DEPARTMENT OF ENERGY",
                        "description": "Long text",
                        "uiLink": null
                    },
                    {
                        "noticeId": "b",
                        "title": null,
                        "fullParentPathName": null,
                        "description": null,
                        "uiLink": "https://sam.gov/opp/b/view"
                    }
                ]
            })))
            .mount(&server)
            .await;

        let client = SamClient::new("k").with_base_url(server.uri());
        let day = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        let opps = client.fetch_day(day, 10).await.unwrap();

        assert_eq!(opps.len(), 2);
        assert_eq!(opps[0].title, "Grid modernization study");
        assert_eq!(opps[0].link, None);
        assert_eq!(opps[1].notice_id, "b");
        assert!(opps[1].title.is_empty());
        assert!(opps[1].agency.is_empty());
        assert!(opps[1].description.is_empty());
    }

    #[tokio::test]
    async fn test_http_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API_KEY_INVALID"))
            .mount(&server)
            .await;

        let client = SamClient::new("bad").with_base_url(server.uri());
        let day = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        let err = client.fetch_day(day, 10).await.unwrap_err();
        assert!(matches!(err, DataError::Network(ref m) if m.contains("403")));
    }

    #[tokio::test]
    async fn test_missing_data_array_is_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"totalRecords": 0})))
            .mount(&server)
            .await;

        let client = SamClient::new("k").with_base_url(server.uri());
        let day = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert!(client.fetch_day(day, 10).await.unwrap().is_empty());
    }
}
