use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use tracing::{debug, info, warn};

use crate::api::dto::ProblemDetail;
use crate::api::{Alert, EntityApi, Saved, header_text};
use crate::config::ClientConfig;
use crate::error::AppError;
use crate::models::Entity;

const MERGE_PATCH_JSON: &str = "application/merge-patch+json";

/// REST client for one entity collection, `/api/<resource>`.
pub struct HttpEntityClient<E> {
    client: Client,
    config: ClientConfig,
    _entity: PhantomData<fn() -> E>,
}

/// HTTP client honoring the configured timeout.
pub fn build_client(config: &ClientConfig) -> Result<Client, AppError> {
    Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))
}

impl<E: Entity> HttpEntityClient<E> {
    pub fn new(config: ClientConfig) -> Result<Self, AppError> {
        let client = build_client(&config)?;
        Ok(Self::with_client(client, config))
    }

    /// Shares one connection pool between the clients of several entities.
    pub fn with_client(client: Client, config: ClientConfig) -> Self {
        Self {
            client,
            config,
            _entity: PhantomData,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/api/{}", self.config.api_url, E::RESOURCE)
    }

    fn entity_url(&self, id: i64) -> String {
        format!("{}/{}", self.collection_url(), id)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, AppError> {
        let response = request.header(ACCEPT, "application/json").send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_key = header_text(response.headers(), &format!("x-{}-error", self.config.app_name));
        let body = response.text().await.unwrap_or_default();
        warn!(
            "{} request failed with {} (error key: {})",
            E::NAME,
            status,
            error_key.as_deref().unwrap_or("-")
        );
        Err(error_from_status(status, &body))
    }

    async fn saved(&self, response: Response) -> Result<Saved<E>, AppError> {
        let alert = Alert::from_headers(response.headers(), &self.config.app_name);
        let body = response.text().await?;
        let entity = serde_json::from_str::<E>(&body)?;
        if let Some(alert) = &alert {
            info!("{}", alert.message());
        }
        Ok(Saved { entity, alert })
    }

    fn require_id(entity: &E) -> Result<i64, AppError> {
        entity
            .id()
            .ok_or_else(|| AppError::BadRequest(format!("Invalid id: {} has no id", E::NAME)))
    }
}

fn error_from_status(status: StatusCode, body: &str) -> AppError {
    let message = ProblemDetail::parse(body)
        .and_then(|p| p.summary())
        .unwrap_or_else(|| {
            if body.is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                body.to_string()
            }
        });

    match status {
        StatusCode::NOT_FOUND => AppError::NotFound,
        StatusCode::BAD_REQUEST => AppError::BadRequest(message),
        StatusCode::CONFLICT => AppError::Conflict(message),
        _ => AppError::Server {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl<E: Entity> EntityApi<E> for HttpEntityClient<E> {
    async fn fetch_all(&self, sort: Option<&str>) -> Result<Vec<E>, AppError> {
        let mut url = Url::parse(&self.collection_url())
            .map_err(|e| AppError::Config(format!("Invalid API URL: {}", e)))?;
        if let Some(sort) = sort {
            url.query_pairs_mut().append_pair("sort", sort);
        }
        debug!("GET {}", url);

        let response = self.send(self.client.get(url)).await?;
        let body = response.text().await?;
        let entities = serde_json::from_str::<Vec<E>>(&body)?;
        debug!("fetched {} {} records", entities.len(), E::NAME);
        Ok(entities)
    }

    async fn fetch(&self, id: i64) -> Result<E, AppError> {
        let url = self.entity_url(id);
        debug!("GET {}", url);

        let response = self.send(self.client.get(&url)).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str::<E>(&body)?)
    }

    async fn create(&self, entity: &E) -> Result<Saved<E>, AppError> {
        if entity.id().is_some() {
            return Err(AppError::BadRequest(format!(
                "A new {} cannot already have an ID",
                E::NAME
            )));
        }
        let url = self.collection_url();
        debug!("POST {}", url);

        let response = self.send(self.client.post(&url).json(entity)).await?;
        self.saved(response).await
    }

    async fn update(&self, entity: &E) -> Result<Saved<E>, AppError> {
        let id = Self::require_id(entity)?;
        let url = self.entity_url(id);
        debug!("PUT {}", url);

        let response = self.send(self.client.put(&url).json(entity)).await?;
        self.saved(response).await
    }

    async fn partial_update(&self, entity: &E) -> Result<Saved<E>, AppError> {
        let id = Self::require_id(entity)?;
        let url = self.entity_url(id);
        debug!("PATCH {}", url);

        let body = serde_json::to_vec(entity)?;
        let request = self
            .client
            .patch(&url)
            .header(CONTENT_TYPE, MERGE_PATCH_JSON)
            .body(body);
        let response = self.send(request).await?;
        self.saved(response).await
    }

    async fn delete(&self, id: i64) -> Result<Option<Alert>, AppError> {
        let url = self.entity_url(id);
        debug!("DELETE {}", url);

        let response = self.send(self.client.delete(&url)).await?;
        let alert = Alert::from_headers(response.headers(), &self.config.app_name);
        if let Some(alert) = &alert {
            info!("{}", alert.message());
        }
        Ok(alert)
    }
}
