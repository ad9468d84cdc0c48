use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::EntityApi;
use crate::error::AppError;
use crate::models::Entity;
use crate::navigation::Navigator;
use crate::sort::SortState;
use crate::state::AppState;
use crate::views::ViewScope;

pub const DEFAULT_SORT_FIELD: &str = "id";

#[derive(Debug, Clone)]
pub struct ListState<E> {
    pub entities: Vec<E>,
    pub loading: bool,
    pub sort: SortState,
    /// Message of the last failed fetch, cleared when the next one starts.
    pub error: Option<String>,
}

/// What the list area shows.
#[derive(Debug, PartialEq)]
pub enum ListBody<'a, E> {
    Table(&'a [E]),
    /// Empty while a fetch is in flight: neither table nor notice.
    Pending,
    NotFound,
}

impl<E> ListState<E> {
    pub fn body(&self) -> ListBody<'_, E> {
        if !self.entities.is_empty() {
            ListBody::Table(&self.entities)
        } else if self.loading {
            ListBody::Pending
        } else {
            ListBody::NotFound
        }
    }

    /// The refresh control is disabled while a fetch is in flight.
    pub fn can_refresh(&self) -> bool {
        !self.loading
    }
}

/// Sortable collection view. Sort criteria live in the address query
/// (`?sort=field,order`) so a list can be bookmarked and reloaded.
pub struct ListView<E: Entity> {
    scope: ViewScope,
    api: Arc<dyn EntityApi<E>>,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<ListState<E>>,
}

impl<E: Entity> ListView<E> {
    pub fn open(app: &AppState) -> Self {
        let location = app.navigator.location();
        let sort = SortState::from_query(&location.search, DEFAULT_SORT_FIELD);
        debug!("opening {} list sorted by {}", E::NAME, sort.comparator());

        let (state, _) = watch::channel(ListState {
            entities: Vec::new(),
            loading: false,
            sort,
            error: None,
        });

        Self {
            scope: ViewScope::new(&app.shutdown),
            api: E::api(app),
            navigator: app.navigator.clone(),
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState<E>> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ListState<E> {
        self.state.borrow().clone()
    }

    pub fn sort(&self) -> SortState {
        self.state.borrow().sort.clone()
    }

    pub fn handle(&self) -> CancellationToken {
        self.scope.handle()
    }

    pub async fn mount(&mut self) -> Result<(), AppError> {
        self.refresh().await
    }

    /// Column header activation.
    pub async fn set_sort(&mut self, field: &str) -> Result<(), AppError> {
        if !E::SORT_FIELDS.iter().any(|f| *f == field) {
            return Err(AppError::validation(
                "sort",
                format!("{} cannot be sorted by {}", E::NAME, field),
            ));
        }
        self.state.send_modify(|s| s.sort.toggle(field));
        self.refresh().await
    }

    /// Re-fetches the collection with the current sort, then brings the
    /// address query in line with it.
    pub async fn refresh(&mut self) -> Result<(), AppError> {
        let sort = self.sort();
        let comparator = sort.comparator();
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        let outcome = match self.scope.run(self.api.fetch_all(Some(&comparator))).await {
            Err(AppError::Cancelled) => {
                // Entities and address stay as they were; only the flag drops.
                self.state.send_modify(|s| s.loading = false);
                return Err(AppError::Cancelled);
            }
            Ok(entities) => {
                self.state.send_modify(|s| {
                    s.entities = entities;
                    s.loading = false;
                });
                Ok(())
            }
            Err(e) => {
                warn!("failed to fetch {}: {}", E::NAME, e);
                let message = e.to_string();
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.error = Some(message);
                });
                Err(e)
            }
        };

        self.sync_address(&sort);
        outcome
    }

    fn sync_address(&self, sort: &SortState) {
        let location = self.navigator.location();
        let query = sort.to_query();
        if location.search != query {
            self.navigator.push(&format!("{}{}", location.pathname, query));
        }
    }

    pub fn close(self) {
        self.scope.close();
    }
}
