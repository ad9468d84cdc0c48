use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::api::http::build_client;
use crate::api::{EntityApi, HttpEntityClient};
use crate::config::ClientConfig;
use crate::error::AppError;
use crate::models::{Course, Student};
use crate::navigation::{MemoryHistory, Navigator};

#[derive(Clone)]
pub struct AppState {
    pub courses: Arc<dyn EntityApi<Course>>,
    pub students: Arc<dyn EntityApi<Student>>,
    pub navigator: Arc<dyn Navigator>,
    /// Parent of every view's cancellation scope.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// HTTP-backed state sharing one connection pool, starting at `start`.
    pub fn connect(config: ClientConfig, start: &str) -> Result<Self, AppError> {
        let client = build_client(&config)?;

        Ok(Self {
            courses: Arc::new(HttpEntityClient::with_client(client.clone(), config.clone())),
            students: Arc::new(HttpEntityClient::with_client(client, config)),
            navigator: Arc::new(MemoryHistory::new(start)),
            shutdown: CancellationToken::new(),
        })
    }
}
