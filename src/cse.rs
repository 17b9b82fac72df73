//! Client for the Google custom search engine (CSE) JSON API.
//!
//! Image results need "Image Search" enabled in the engine configuration at
//! https://programmablesearchengine.google.com/

use std::fmt;
use std::sync::RwLock;
use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde_json::Value;

use crate::data_models::SearchResult;
use crate::error::{ConfigError, SearchError};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/customsearch/v1/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// The provider always pages in blocks of 10, `num` only trims a block.
pub const PROVIDER_PAGE_SIZE: i64 = 10;
pub const MAX_PER_PAGE: i64 = 10;

/// What to search for. Built with chained setters:
///
/// ```rust,ignore
/// let params = SearchParams::new("cat").page(2).only_image(true);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub query: String,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub safe_search: bool,
    pub only_image: bool,
}

impl SearchParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn per_page(mut self, per_page: i64) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn safe_search(mut self, on: bool) -> Self {
        self.safe_search = on;
        self
    }

    pub fn only_image(mut self, on: bool) -> Self {
        self.only_image = on;
        self
    }

    /// Page number actually used: absolute value, never below 1.
    pub fn effective_page(&self) -> i64 {
        self.page.unwrap_or(1).saturating_abs().max(1)
    }

    /// 1-based index of the first result of the page.
    pub fn start_index(&self) -> i64 {
        (self.effective_page() - 1)
            .saturating_mul(PROVIDER_PAGE_SIZE)
            .saturating_add(1)
    }

    /// `per_page` when it is in `1..=10`, otherwise the provider default applies.
    pub fn num(&self) -> Option<i64> {
        self.per_page.filter(|n| (1..=MAX_PER_PAGE).contains(n))
    }

    /// Query string pairs for the request, credentials first.
    pub fn to_query(&self, api_key: &str, engine_id: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("key", api_key.to_string()),
            ("cx", engine_id.to_string()),
            ("q", self.query.clone()),
            ("start", self.start_index().to_string()),
            (
                "safe",
                if self.safe_search { "active" } else { "off" }.to_string(),
            ),
        ];
        if let Some(num) = self.num() {
            params.push(("num", num.to_string()));
        }
        if self.only_image {
            params.push(("searchType", "image".to_string()));
        }
        params
    }
}

pub struct SearchClientBuilder {
    api_key: String,
    engine_id: String,
    base_url: String,
    timeout: Duration,
    user_agent: String,
}

impl SearchClientBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> Result<SearchClient, ConfigError> {
        if self.api_key.is_empty() {
            return Err(ConfigError::Missing("api key"));
        }
        if self.engine_id.is_empty() {
            return Err(ConfigError::Missing("search engine id"));
        }
        let base_url = Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url,
                reason: "not a base url".to_string(),
            });
        }

        let http = Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent)
            .build()?;

        Ok(SearchClient {
            api_key: self.api_key,
            engine_id: self.engine_id,
            base_url,
            http: RwLock::new(Some(http)),
        })
    }
}

/// Authenticated access to the CSE API over one shared connection pool.
///
/// The client is either open (searches allowed) or closed; `close` is the only
/// transition and it is one-way. Safe to share behind an `Arc` and call
/// from many tasks at once.
pub struct SearchClient {
    api_key: String,
    engine_id: String,
    base_url: Url,
    http: RwLock<Option<Client>>,
}

impl SearchClient {
    pub fn builder(api_key: impl Into<String>, engine_id: impl Into<String>) -> SearchClientBuilder {
        SearchClientBuilder {
            api_key: api_key.into(),
            engine_id: engine_id.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("imarch/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn new(api_key: &str, engine_id: &str) -> Result<Self, ConfigError> {
        Self::builder(api_key, engine_id).build()
    }

    pub fn engine_id(&self) -> &str {
        &self.engine_id
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn search(&self, params: &SearchParams) -> Result<SearchResult, SearchError> {
        let raw = self.request(params).await?;
        let result = SearchResult::from_value(raw, params.only_image)?;
        log::debug!(
            "search {:?} page {} returned {} items",
            params.query,
            params.effective_page(),
            result.items.len()
        );
        Ok(result)
    }

    /// Same request as [`search`](Self::search) but hands back the provider JSON untouched.
    pub async fn search_raw(&self, params: &SearchParams) -> Result<Value, SearchError> {
        self.request(params).await
    }

    /// Releases the connection pool. Calling it again does nothing.
    ///
    /// Requests already in flight hold their own handle and keep the pool
    /// alive until they finish; new searches fail with [`SearchError::Closed`].
    pub fn close(&self) {
        let mut http = self.http.write().unwrap_or_else(|e| e.into_inner());
        if http.take().is_some() {
            log::info!("search client closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.http
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_none()
    }

    fn session(&self) -> Result<Client, SearchError> {
        // reqwest::Client is a handle to a shared pool, cloning it is cheap
        self.http
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(SearchError::Closed)
    }

    async fn request(&self, params: &SearchParams) -> Result<Value, SearchError> {
        let http = self.session()?;
        let query = params.to_query(&self.api_key, &self.engine_id);

        log::debug!(
            "GET {} q={:?} start={} num={:?} image={}",
            self.base_url,
            params.query,
            params.start_index(),
            params.num(),
            params.only_image
        );

        let response = http.get(self.base_url.clone()).query(&query).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(classify_failure(status, body));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

fn classify_failure(status: StatusCode, body: String) -> SearchError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SearchError::Authentication {
            status: status.as_u16(),
            body,
        },
        _ => SearchError::Provider {
            status: status.as_u16(),
            body,
        },
    }
}

impl fmt::Debug for SearchClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchClient")
            .field("api_key", &"<redacted>")
            .field("engine_id", &self.engine_id)
            .field("base_url", &self.base_url.as_str())
            .field("closed", &self.is_closed())
            .finish()
    }
}
