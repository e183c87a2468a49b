use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use regex::RegexSet;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::RelayConfig;

/// Path query parameter naming the upstream resource.
pub const PATH_PARAM: &str = "path";

const ALLOWED_PATHS: [&str; 5] = [
    r"(?i)^/company/[A-Z0-9]+$",
    r"(?i)^/company/[A-Z0-9]+/officers$",
    r"(?i)^/company/[A-Z0-9]+/filing-history$",
    r"(?i)^/company/[A-Z0-9]+/charges$",
    r"(?i)^/search/companies$",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    #[error("Missing 'path' query parameter")]
    MissingPath,
    #[error("Path not allowed")]
    PathNotAllowed,
    #[error("Rate limit exceeded")]
    RateLimited,
    #[error("Proxy request failed: {0}")]
    Upstream(String),
}

/// Upstream paths the relay is willing to forward.
#[derive(Debug, Clone)]
pub struct AllowList {
    patterns: RegexSet,
}

impl AllowList {
    pub fn registry_paths() -> Result<Self, regex::Error> {
        Ok(Self {
            patterns: RegexSet::new(ALLOWED_PATHS)?,
        })
    }

    pub fn permits(&self, path: &str) -> bool {
        self.patterns.is_match(path)
    }
}

/// Monotonic time source so throttle windows can be driven from tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window request counter. A request is refused once the counter has
/// already passed `threshold`; the counter resets when the window elapses.
pub struct FixedWindowThrottle {
    threshold: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
    state: Mutex<Window>,
}

impl FixedWindowThrottle {
    pub fn new(threshold: u32, window: Duration) -> Self {
        Self::with_clock(threshold, window, Arc::new(SystemClock))
    }

    pub fn with_clock(threshold: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        let started = clock.now();
        Self {
            threshold,
            window,
            clock,
            state: Mutex::new(Window { started, count: 0 }),
        }
    }

    pub fn try_acquire(&self) -> bool {
        let now = self.clock.now();
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if now.duration_since(state.started) >= self.window {
            state.started = now;
            state.count = 0;
        }

        if state.count > self.threshold {
            return false;
        }
        state.count += 1;
        true
    }

    pub fn current_count(&self) -> u32 {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .count
    }
}

/// Status and JSON body returned by the upstream registry.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Value,
}

#[async_trait]
pub trait RegistryUpstream: Send + Sync {
    async fn get(&self, path: &str, query: &[(String, String)])
        -> Result<UpstreamResponse, RelayError>;
}

/// Calls the registry API with the server-held credential as Basic auth.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpUpstream {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl RegistryUpstream for HttpUpstream {
    async fn get(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<UpstreamResponse, RelayError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(url)
            .query(query)
            .basic_auth(&self.api_key, None::<&str>)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| RelayError::Upstream(err.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .json::<Value>()
            .await
            .map_err(|err| RelayError::Upstream(err.to_string()))?;

        Ok(UpstreamResponse { status, body })
    }
}

/// Allow-list and throttle in front of the upstream registry.
pub struct RegistryRelay {
    allow_list: AllowList,
    throttle: FixedWindowThrottle,
    upstream: Arc<dyn RegistryUpstream>,
}

impl RegistryRelay {
    pub fn new(
        allow_list: AllowList,
        throttle: FixedWindowThrottle,
        upstream: Arc<dyn RegistryUpstream>,
    ) -> Self {
        Self {
            allow_list,
            throttle,
            upstream,
        }
    }

    /// Builds the HTTP relay when a credential is configured.
    pub fn from_config(config: &RelayConfig) -> Result<Option<Self>, regex::Error> {
        let Some(api_key) = config.api_key.as_deref() else {
            return Ok(None);
        };
        let upstream = HttpUpstream::new(config.base_url.clone(), api_key);
        Ok(Some(Self::new(
            AllowList::registry_paths()?,
            FixedWindowThrottle::new(config.max_requests_per_window, config.window),
            Arc::new(upstream),
        )))
    }

    pub fn throttle(&self) -> &FixedWindowThrottle {
        &self.throttle
    }

    /// `params` is the full incoming query; `path` is removed and the rest forwarded.
    pub async fn forward(&self, params: &[(String, String)]) -> Result<UpstreamResponse, RelayError> {
        let path = params
            .iter()
            .find(|(key, _)| key == PATH_PARAM)
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.is_empty())
            .ok_or(RelayError::MissingPath)?;

        if !self.allow_list.permits(path) {
            debug!(path, "relay path rejected");
            return Err(RelayError::PathNotAllowed);
        }

        if !self.throttle.try_acquire() {
            warn!(path, "relay throttle exceeded");
            return Err(RelayError::RateLimited);
        }

        let forwarded: Vec<(String, String)> = params
            .iter()
            .filter(|(key, _)| key != PATH_PARAM)
            .cloned()
            .collect();

        let response = self.upstream.get(path, &forwarded).await;
        match &response {
            Ok(upstream) => debug!(path, status = upstream.status, "relay forwarded"),
            Err(err) => warn!(path, error = %err, "relay upstream failed"),
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list_matches_registry_paths_case_insensitively() {
        let allow = AllowList::registry_paths().expect("patterns compile");
        for path in [
            "/company/00991413",
            "/company/sc123456/officers",
            "/company/OC300001/filing-history",
            "/company/07654321/charges",
            "/search/companies",
            "/SEARCH/COMPANIES",
        ] {
            assert!(allow.permits(path), "{path}");
        }
        for path in [
            "/company/",
            "/company/0099-1413",
            "/company/00991413/persons-with-significant-control",
            "/search/officers",
            "/company/00991413/officers/extra",
            "company/00991413",
        ] {
            assert!(!allow.permits(path), "{path}");
        }
    }

    struct ManualClock(Mutex<Instant>);

    impl ManualClock {
        fn advance(&self, by: Duration) {
            let mut now = self.0.lock().expect("clock lock");
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.0.lock().expect("clock lock")
        }
    }

    #[test]
    fn throttle_allows_threshold_plus_one_then_resets() {
        let clock = Arc::new(ManualClock(Mutex::new(Instant::now())));
        let throttle = FixedWindowThrottle::with_clock(3, Duration::from_secs(60), clock.clone());

        let accepted = (0..6).filter(|_| throttle.try_acquire()).count();
        assert_eq!(accepted, 4);
        assert_eq!(throttle.current_count(), 4);

        clock.advance(Duration::from_secs(59));
        assert!(!throttle.try_acquire());

        clock.advance(Duration::from_secs(1));
        assert!(throttle.try_acquire());
        assert_eq!(throttle.current_count(), 1);
    }
}
