use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::api::{Alert, EntityApi};
use crate::error::AppError;
use crate::models::Entity;
use crate::navigation::Navigator;
use crate::state::AppState;
use crate::views::ViewScope;

/// Confirmation dialog for deleting one entity.
pub struct DeleteView<E: Entity> {
    scope: ViewScope,
    api: Arc<dyn EntityApi<E>>,
    navigator: Arc<dyn Navigator>,
    id: i64,
    entity: Option<E>,
}

impl<E: Entity> DeleteView<E> {
    pub fn open(app: &AppState, id: i64) -> Self {
        Self {
            scope: ViewScope::new(&app.shutdown),
            api: E::api(app),
            navigator: app.navigator.clone(),
            id,
            entity: None,
        }
    }

    pub fn handle(&self) -> CancellationToken {
        self.scope.handle()
    }

    /// Loads the entity the question refers to.
    pub async fn mount(&mut self) -> Result<(), AppError> {
        let entity = self.scope.run(self.api.fetch(self.id)).await?;
        self.entity = Some(entity);
        Ok(())
    }

    pub fn entity(&self) -> Option<&E> {
        self.entity.as_ref()
    }

    pub fn target_id(&self) -> i64 {
        self.entity.as_ref().and_then(|e| e.id()).unwrap_or(self.id)
    }

    pub fn question(&self) -> String {
        format!(
            "Are you sure you want to delete this {} {}?",
            E::NAME,
            self.target_id()
        )
    }

    /// Deletes and returns to the collection. On failure the dialog stays
    /// open and the address is unchanged.
    pub async fn confirm(&mut self) -> Result<Option<Alert>, AppError> {
        let id = self.target_id();
        let alert = self.scope.run(self.api.delete(id)).await?;
        info!("deleted {} {}", E::NAME, id);

        self.navigator.push(E::ROUTE);
        self.scope.close();
        Ok(alert)
    }

    /// Closes the dialog without touching the backend.
    pub fn cancel(self) {
        self.navigator.push(E::ROUTE);
        self.scope.close();
    }
}
