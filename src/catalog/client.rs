use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{Client, StatusCode};
use tracing::instrument;

use crate::error::CatalogError;

use super::types::{LoginResponse, ProductNode, SearchResponse, ShortLinkResponse};

/// Capability interface the generator and renderer depend on. Tested against
/// an in-memory fake; `ShopeeCatalogClient` is the only `reqwest`-backed
/// implementation.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn search_products(&self, keyword: &str, limit: u32) -> Result<Vec<ProductNode>, CatalogError>;
    async fn generate_short_link(&self, origin_url: &str) -> Result<String, CatalogError>;
}

/// Bearer-token-caching client for the upstream offer catalog. On a 401 the
/// cached token is dropped under the lock and the call is retried once after
/// a fresh login — never more than once, so a persistently broken upstream
/// fails fast instead of looping.
pub struct ShopeeCatalogClient {
    http: Client,
    base_url: String,
    username: String,
    password: String,
    token: Mutex<Option<String>>,
}

impl ShopeeCatalogClient {
    pub fn new(base_url: String, username: String, password: String, timeout: Duration) -> Result<Self, CatalogError> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;
        Ok(Self { http, base_url, username, password, token: Mutex::new(None) })
    }

    fn has_credentials(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }

    #[instrument(skip(self), level = "debug")]
    async fn login(&self) -> Result<String, CatalogError> {
        if !self.has_credentials() {
            return Err(CatalogError::CredentialsMissing);
        }

        let url = format!("{}/auth/login", self.base_url);
        let resp = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "username": self.username, "password": self.password }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(CatalogError::LoginFailed(format!("status {}", resp.status())));
        }

        let body: LoginResponse = resp.json().await.map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;
        *self.token.lock() = Some(body.access_token.clone());
        Ok(body.access_token)
    }

    async fn token(&self) -> Result<String, CatalogError> {
        if let Some(t) = self.token.lock().clone() {
            return Ok(t);
        }
        self.login().await
    }

    fn clear_token(&self) {
        *self.token.lock() = None;
    }
}

#[async_trait]
impl CatalogClient for ShopeeCatalogClient {
    #[instrument(skip(self), fields(keyword = %keyword, limit = limit), level = "debug")]
    async fn search_products(&self, keyword: &str, limit: u32) -> Result<Vec<ProductNode>, CatalogError> {
        let token = self.token().await?;
        let url = format!("{}/products/search", self.base_url);
        let limit_str = limit.to_string();
        let query = [("keyword", keyword), ("page", "1"), ("limit", &limit_str), ("sort_type", "2")];

        let mut resp = self.http.get(&url).bearer_auth(&token).query(&query).send().await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            self.clear_token();
            let fresh = self.login().await?;
            resp = self.http.get(&url).bearer_auth(&fresh).query(&query).send().await?;
        }

        if !resp.status().is_success() {
            return Err(CatalogError::HttpError { status: resp.status().as_u16(), message: resp.text().await.unwrap_or_default() });
        }

        let body: SearchResponse = resp.json().await.map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;
        Ok(body.nodes)
    }

    #[instrument(skip(self, origin_url), level = "debug")]
    async fn generate_short_link(&self, origin_url: &str) -> Result<String, CatalogError> {
        let token = self.token().await?;
        let url = format!("{}/links/shorten", self.base_url);

        let resp =
            self.http.post(&url).bearer_auth(token).json(&serde_json::json!({ "origin_url": origin_url })).send().await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            self.clear_token();
            let fresh = self.login().await?;
            let resp = self
                .http
                .post(&url)
                .bearer_auth(fresh)
                .json(&serde_json::json!({ "origin_url": origin_url }))
                .send()
                .await?;
            if !resp.status().is_success() {
                return Err(CatalogError::HttpError { status: resp.status().as_u16(), message: resp.text().await.unwrap_or_default() });
            }
            let body: ShortLinkResponse = resp.json().await.map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;
            return Ok(body.short_link);
        }

        if !resp.status().is_success() {
            return Err(CatalogError::HttpError { status: resp.status().as_u16(), message: resp.text().await.unwrap_or_default() });
        }

        let body: ShortLinkResponse = resp.json().await.map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;
        Ok(body.short_link)
    }
}
