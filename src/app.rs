//! Opens the view an address points at and drives it.

use tracing::info;

use crate::error::AppError;
use crate::models::{Course, Student};
use crate::render::{Columns, render_delete, render_detail, render_form, render_list};
use crate::routes::{EntityKind, Route, Screen};
use crate::state::AppState;
use crate::views::{DeleteView, DetailView, Editable, ListView, Mode, UpdateView};

/// What to do once the view is mounted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Action {
    /// Column headers to activate, in order.
    pub sort: Vec<String>,
    /// Form fields to set before submitting. Empty means only show the form.
    pub set: Vec<(String, String)>,
    pub patch: bool,
    pub confirm: bool,
}

/// Opens the view for the navigator's current address and returns its
/// rendering.
pub async fn open(app: &AppState, action: &Action) -> Result<String, AppError> {
    let location = app.navigator.location();
    let route = Route::parse(&location.pathname)?;
    info!("opening {}", location);

    match route.entity {
        EntityKind::Courses => open_screen::<Course>(app, route.screen, action).await,
        EntityKind::Student => open_screen::<Student>(app, route.screen, action).await,
    }
}

async fn open_screen<E: Editable + Columns>(
    app: &AppState,
    screen: Screen,
    action: &Action,
) -> Result<String, AppError> {
    match screen {
        Screen::List => {
            let mut view = ListView::<E>::open(app);
            view.mount().await?;
            for field in &action.sort {
                view.set_sort(field).await?;
            }
            Ok(render_list(&view.state()))
        }
        Screen::Detail(id) => {
            let mut view = DetailView::<E>::open(app, id);
            let entity = view.mount().await?;
            Ok(render_detail(entity))
        }
        Screen::Create => edit::<E>(app, Mode::Create, action).await,
        Screen::Edit(id) => edit::<E>(app, Mode::Edit(id), action).await,
        Screen::Delete(id) => {
            let mut view = DeleteView::<E>::open(app, id);
            view.mount().await?;
            if !action.confirm {
                return Ok(render_delete(&view));
            }
            let alert = view.confirm().await?;
            Ok(match alert {
                Some(alert) => format!("{}\n", alert.message()),
                None => format!("Deleted {} {}\n", E::NAME, view.target_id()),
            })
        }
    }
}

async fn edit<E: Editable + Columns>(
    app: &AppState,
    mode: Mode,
    action: &Action,
) -> Result<String, AppError> {
    let mut view = UpdateView::<E>::open(app, mode);
    view.mount().await?;
    if action.set.is_empty() {
        return Ok(render_form(&view));
    }

    let mut form = if action.patch {
        E::Form::default()
    } else {
        view.form()
    };
    for (name, value) in &action.set {
        E::set_field(&mut form, name, value.clone())?;
    }

    let saved = if action.patch {
        view.patch(&form).await?
    } else {
        view.submit(&form).await?
    };

    let mut out = render_detail(&saved.entity);
    if let Some(alert) = &saved.alert {
        out.push_str(&alert.message());
        out.push('\n');
    }
    Ok(out)
}
