use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::api::EntityApi;
use crate::error::AppError;
use crate::models::Entity;
use crate::state::AppState;
use crate::views::ViewScope;

/// Read-only view of one entity.
pub struct DetailView<E: Entity> {
    scope: ViewScope,
    api: Arc<dyn EntityApi<E>>,
    id: i64,
    entity: Option<E>,
}

impl<E: Entity> DetailView<E> {
    pub fn open(app: &AppState, id: i64) -> Self {
        Self {
            scope: ViewScope::new(&app.shutdown),
            api: E::api(app),
            id,
            entity: None,
        }
    }

    pub fn handle(&self) -> CancellationToken {
        self.scope.handle()
    }

    pub async fn mount(&mut self) -> Result<&E, AppError> {
        let entity = self.scope.run(self.api.fetch(self.id)).await?;
        Ok(self.entity.insert(entity))
    }

    pub fn entity(&self) -> Option<&E> {
        self.entity.as_ref()
    }

    pub fn back_route(&self) -> &'static str {
        E::ROUTE
    }

    pub fn edit_route(&self) -> String {
        format!("{}/{}/edit", E::ROUTE, self.id)
    }
}
