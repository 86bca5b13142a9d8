use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::error::DwdError;
use crate::forecast::decode_overview;
use crate::model::Forecast;

pub const DEFAULT_BASE_URL: &str = "https://app-prod-ws.warnwetter.de/v16";
pub const DEFAULT_USER_AGENT: &str = "dwd api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings used when a [`Session`] builds its HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Upper bound for a whole request, connect through body.
    pub timeout: Duration,
}

impl SessionConfig {
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Connection to the warnwetter web service.
///
/// A session must be initialized with [`Session::init`] before use. The
/// initialized client keeps a cookie jar, so cookies set by one response
/// are sent with later requests to the same host.
#[derive(Debug, Clone, Default)]
pub struct Session {
    config: SessionConfig,
    http: Option<Client>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self { config, http: None }
    }

    /// Build the HTTP client. Calling it again starts over with an empty cookie jar.
    pub fn init(&mut self) -> Result<(), DwdError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_str(&self.config.user_agent)?);

        let http = Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .timeout(self.config.timeout)
            .build()?;

        self.http = Some(http);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.http.is_some()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Fetch the daily forecasts for a station.
    pub async fn overview(&self, station_id: &str) -> Result<Vec<Forecast>, DwdError> {
        let http = self.http.as_ref().ok_or(DwdError::NotInitialized)?;
        let url = format!("{}/stationOverview", self.config.base_url.trim_end_matches('/'));

        debug!(%url, station_id, "Requesting station overview");

        let res = http
            .get(&url)
            .query(&[("stationIds", station_id)])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(DwdError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        decode_overview(&body, station_id)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((end, _)) => format!("{}...", &body[..end]),
        None => body.to_string(),
    }
}
