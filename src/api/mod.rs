pub mod dto;
pub mod http;

use async_trait::async_trait;
use reqwest::header::HeaderMap;

use crate::error::AppError;
use crate::models::Entity;

pub use http::HttpEntityClient;

/// Notification the backend attaches to a successful mutation through the
/// `X-<app>-alert` and `X-<app>-params` headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub key: String,
    pub param: Option<String>,
}

impl Alert {
    pub fn from_headers(headers: &HeaderMap, app_name: &str) -> Option<Self> {
        let key = header_text(headers, &format!("x-{}-alert", app_name))?;
        let param = header_text(headers, &format!("x-{}-params", app_name));
        Some(Self { key, param })
    }

    pub fn message(&self) -> String {
        match &self.param {
            Some(param) => format!("{} ({})", self.key, param),
            None => self.key.clone(),
        }
    }
}

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Entity returned by a create or update call, together with the alert the
/// backend raised for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Saved<E> {
    pub entity: E,
    pub alert: Option<Alert>,
}

#[async_trait]
pub trait EntityApi<E: Entity>: Send + Sync {
    /// `sort` is a comparator of the form `field,direction`.
    async fn fetch_all(&self, sort: Option<&str>) -> Result<Vec<E>, AppError>;
    async fn fetch(&self, id: i64) -> Result<E, AppError>;
    async fn create(&self, entity: &E) -> Result<Saved<E>, AppError>;
    async fn update(&self, entity: &E) -> Result<Saved<E>, AppError>;
    /// Merge-patch: fields left `null` are ignored by the backend.
    async fn partial_update(&self, entity: &E) -> Result<Saved<E>, AppError>;
    async fn delete(&self, id: i64) -> Result<Option<Alert>, AppError>;
}
