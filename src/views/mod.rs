pub mod delete;
pub mod detail;
pub mod list;
pub mod update;

use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::AppError;

pub use delete::DeleteView;
pub use detail::DetailView;
pub use list::{ListBody, ListState, ListView};
pub use update::{Editable, Mode, UpdateView};

/// Lifetime of one mounted view. Remote calls made through [`ViewScope::run`]
/// are abandoned once the scope is closed, and the scope closes itself when
/// dropped.
#[derive(Debug)]
pub struct ViewScope {
    token: CancellationToken,
}

impl ViewScope {
    pub fn new(parent: &CancellationToken) -> Self {
        Self {
            token: parent.child_token(),
        }
    }

    /// Token another task can cancel to tear the view down.
    pub fn handle(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn close(&self) {
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    pub async fn run<T, F>(&self, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        if self.is_closed() {
            return Err(AppError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                debug!("view closed while a request was pending");
                Err(AppError::Cancelled)
            }
            result = fut => result,
        }
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
