use std::fmt::Debug;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::api::Saved;
use crate::error::AppError;
use crate::models::Entity;
use crate::state::AppState;
use crate::views::ViewScope;

/// An entity the create/edit form can produce.
#[async_trait]
pub trait Editable: Entity {
    /// Raw form values.
    type Form: Default + Clone + Debug + PartialEq + Send + Sync;
    /// Reference data the form's selectors offer (e.g. the students a course
    /// can be assigned to).
    type Choices: Default + Clone + Debug + Send + Sync;

    async fn load_choices(state: &AppState) -> Result<Self::Choices, AppError>;

    /// Form values that reproduce `self` when submitted unchanged.
    fn form_defaults(&self) -> Self::Form;

    fn set_field(form: &mut Self::Form, name: &str, value: String) -> Result<(), AppError>;

    /// Applies the form over `self`, resolving selections against `choices`.
    fn merge_form(&self, form: &Self::Form, choices: &Self::Choices) -> Result<Self, AppError>;

    /// `(value, label)` pairs of the association selector.
    fn selector_options(_choices: &Self::Choices) -> Vec<(String, String)> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Edit(i64),
}

/// Create/edit form. The mode is fixed when the view opens: an id in the
/// address means edit, none means create.
pub struct UpdateView<E: Editable> {
    scope: ViewScope,
    app: AppState,
    mode: Mode,
    entity: E,
    choices: E::Choices,
    loading: bool,
}

impl<E: Editable> UpdateView<E> {
    pub fn open(app: &AppState, mode: Mode) -> Self {
        Self {
            scope: ViewScope::new(&app.shutdown),
            app: app.clone(),
            mode,
            entity: E::default(),
            choices: E::Choices::default(),
            loading: false,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_new(&self) -> bool {
        self.mode == Mode::Create
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn entity(&self) -> &E {
        &self.entity
    }

    pub fn choices(&self) -> &E::Choices {
        &self.choices
    }

    pub fn handle(&self) -> CancellationToken {
        self.scope.handle()
    }

    /// Creating clears any previous entity; editing fetches it. The choices
    /// are loaded either way.
    pub async fn mount(&mut self) -> Result<(), AppError> {
        self.loading = true;
        let loaded = self.load().await;
        self.loading = false;

        let (entity, choices) = loaded?;
        self.entity = entity;
        self.choices = choices;
        Ok(())
    }

    async fn load(&self) -> Result<(E, E::Choices), AppError> {
        let entity = match self.mode {
            Mode::Create => E::default(),
            Mode::Edit(id) => self.scope.run(E::api(&self.app).fetch(id)).await?,
        };
        let choices = self.scope.run(E::load_choices(&self.app)).await?;
        Ok((entity, choices))
    }

    /// Initial form values: blank when creating, the loaded entity when editing.
    pub fn form(&self) -> E::Form {
        match self.mode {
            Mode::Create => E::Form::default(),
            Mode::Edit(_) => self.entity.form_defaults(),
        }
    }

    /// Saves the form and, on success, returns to the collection route.
    /// A failure leaves the view and the address as they were.
    pub async fn submit(&mut self, form: &E::Form) -> Result<Saved<E>, AppError> {
        let merged = self.entity.merge_form(form, &self.choices)?;
        let api = E::api(&self.app);

        let saved = match self.mode {
            Mode::Create => {
                debug!("creating {}", E::NAME);
                self.scope.run(api.create(&merged)).await?
            }
            Mode::Edit(id) => {
                debug!("updating {} {}", E::NAME, id);
                self.scope.run(api.update(&merged)).await?
            }
        };

        info!("saved {} {:?}", E::NAME, saved.entity.id());
        self.entity = saved.entity.clone();
        if let Some(id) = self.entity.id() {
            // The entity exists now; saving again updates it.
            self.mode = Mode::Edit(id);
        }
        self.app.navigator.push(E::ROUTE);
        Ok(saved)
    }

    /// Sends only the fields the form sets, as a merge-patch. Edit mode only.
    pub async fn patch(&mut self, form: &E::Form) -> Result<Saved<E>, AppError> {
        let Mode::Edit(id) = self.mode else {
            return Err(AppError::BadRequest(format!(
                "a new {} cannot be patched",
                E::NAME
            )));
        };

        let mut base = E::default();
        base.set_id(Some(id));
        let mut partial = base.merge_form(form, &self.choices)?;
        partial.set_id(Some(id));

        let api = E::api(&self.app);
        let saved = self.scope.run(api.partial_update(&partial)).await?;
        self.entity = saved.entity.clone();
        self.app.navigator.push(E::ROUTE);
        Ok(saved)
    }

    pub fn close(self) {
        self.scope.close();
    }
}
