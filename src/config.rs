use std::env;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_APP_NAME: &str = "lmsApp";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the backend, without the `/api` suffix.
    pub api_url: String,
    /// Application name used in the `X-<app>-alert` response headers.
    pub app_name: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            app_name: DEFAULT_APP_NAME.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let api_url = env::var("LMS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let app_name = env::var("LMS_APP_NAME").unwrap_or_else(|_| DEFAULT_APP_NAME.to_string());
        let timeout = match env::var("LMS_HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                AppError::Config(format!("LMS_HTTP_TIMEOUT_SECS is not a number: {}", raw))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Self {
            api_url,
            app_name,
            timeout: Duration::from_secs(timeout),
        }
        .validated()
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Result<Self, AppError> {
        self.api_url = api_url.into();
        self.validated()
    }

    fn validated(mut self) -> Result<Self, AppError> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "API URL must start with http:// or https://: {}",
                self.api_url
            )));
        }
        while self.api_url.ends_with('/') {
            self.api_url.pop();
        }
        if self.app_name.is_empty() {
            return Err(AppError::Config("application name is empty".to_string()));
        }
        Ok(self)
    }
}
