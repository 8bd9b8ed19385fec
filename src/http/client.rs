use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use moka::future::Cache;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::TransmuteConfig;
use crate::http::errors::BackendError;
use crate::observability::backend_metrics;

/// Tunables for [`BackendHttpClient`]
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub request_timeout: Duration,
    pub requests_per_second: u32,
    pub burst_capacity: u32,
    pub cache_ttl: Duration,
    pub cache_capacity: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            requests_per_second: 5,
            burst_capacity: 10,
            cache_ttl: Duration::from_secs(300),
            cache_capacity: 100,
        }
    }
}

impl ClientSettings {
    pub fn from_config(config: &TransmuteConfig) -> Self {
        Self {
            request_timeout: Duration::from_secs(config.backend.request_timeout_seconds),
            requests_per_second: config.backend.rate_limit.requests_per_second,
            burst_capacity: config.backend.rate_limit.burst_capacity,
            cache_ttl: Duration::from_secs(config.catalog.cache_ttl_seconds),
            cache_capacity: config.catalog.cache_capacity,
        }
    }
}

/// Rate-limited JSON client for the backend, attaching the bearer credential
/// to every request and caching selected GET responses
#[derive(Clone)]
pub struct BackendHttpClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
    cache: Cache<String, serde_json::Value>,
}

impl std::fmt::Debug for BackendHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendHttpClient")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

impl BackendHttpClient {
    pub fn new(base_url: &str, token: Option<String>, settings: ClientSettings) -> Result<Self, BackendError> {
        let base_url = Url::parse(base_url).map_err(|e| BackendError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        let http = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(BackendError::Build)?;

        let per_second = NonZeroU32::new(settings.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(settings.burst_capacity).unwrap_or(per_second);
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(per_second).allow_burst(burst)));

        let cache = Cache::builder()
            .max_capacity(settings.cache_capacity)
            .time_to_live(settings.cache_ttl)
            .build();

        Ok(Self {
            http,
            base_url,
            token: token.filter(|token| !token.trim().is_empty()),
            rate_limiter,
            cache,
        })
    }

    pub fn from_config(config: &TransmuteConfig) -> Result<Self, BackendError> {
        Self::new(
            &config.backend.base_url,
            config.backend.token.clone(),
            ClientSettings::from_config(config),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url.join(path).map_err(|e| BackendError::InvalidUrl {
            url: format!("{}{}", self.base_url, path),
            reason: e.to_string(),
        })
    }

    /// POST a JSON body and decode the JSON response
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.http.post(self.endpoint(path)?).json(body);
        let text = self.send(path, request).await?;
        decode(path, &text)
    }

    /// POST a JSON body; a 2xx response whose body does not decode yields `T::default()`
    pub async fn post_json_lenient<B, T>(&self, path: &str, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Default,
    {
        let request = self.http.post(self.endpoint(path)?).json(body);
        let text = self.send(path, request).await?;
        match decode(path, &text) {
            Ok(value) => Ok(value),
            Err(e) => {
                debug!(endpoint = path, error = %e, "Ignoring undecodable success body");
                Ok(T::default())
            }
        }
    }

    /// GET and decode, consulting the cache first when `cache_key` is given
    pub async fn get_json_cached<T>(&self, path: &str, cache_key: Option<String>) -> Result<T, BackendError>
    where
        T: DeserializeOwned + Serialize,
    {
        let metrics = backend_metrics();
        if let Some(ref key) = cache_key {
            if let Some(cached) = self.cache.get(key).await {
                if let Ok(value) = serde_json::from_value(cached) {
                    debug!("Cache hit for key: {}", key);
                    metrics.record_cache_hit();
                    return Ok(value);
                }
            }
            metrics.record_cache_miss();
        }

        let request = self.http.get(self.endpoint(path)?);
        let text = self.send(path, request).await?;
        let value: T = decode(path, &text)?;

        if let Some(key) = cache_key {
            if let Ok(data) = serde_json::to_value(&value) {
                self.cache.insert(key, data).await;
                debug!("Cached response for future requests");
            }
        }

        Ok(value)
    }

    pub async fn clear_cache(&self) {
        self.cache.invalidate_all();
        info!("Backend client cache cleared");
    }

    async fn send(&self, endpoint: &str, request: RequestBuilder) -> Result<String, BackendError> {
        let metrics = backend_metrics();
        self.rate_limiter.until_ready().await;
        metrics.record_request();

        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        debug!(endpoint, "Sending backend request");
        let response = request.send().await.map_err(|source| {
            metrics.record_error();
            warn!(endpoint, error = %source, "Backend unreachable");
            BackendError::Transport {
                endpoint: endpoint.to_string(),
                source,
            }
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|source| {
            metrics.record_error();
            BackendError::Transport {
                endpoint: endpoint.to_string(),
                source,
            }
        })?;

        if !status.is_success() {
            metrics.record_error();
            let err = BackendError::from_status(endpoint, status.as_u16(), &text);
            warn!(endpoint, status = status.as_u16(), error = %err.user_message(), "Backend rejected request");
            return Err(err);
        }

        Ok(text)
    }
}

fn decode<T: DeserializeOwned>(endpoint: &str, text: &str) -> Result<T, BackendError> {
    serde_json::from_str(text).map_err(|source| BackendError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}
