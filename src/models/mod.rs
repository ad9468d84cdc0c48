pub mod course;
pub mod student;

use std::fmt::Debug;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Serialize, de::DeserializeOwned};

use crate::api::EntityApi;
use crate::error::AppError;
use crate::state::AppState;

pub use course::{Course, CourseForm};
pub use student::{Student, StudentForm};

/// A record managed through one REST collection and one set of UI routes.
pub trait Entity:
    Serialize + DeserializeOwned + Clone + Debug + Default + PartialEq + Send + Sync + 'static
{
    /// Display name, also the middle segment of alert keys (`lmsApp.<NAME>.created`).
    const NAME: &'static str;
    /// Collection segment under `/api/`.
    const RESOURCE: &'static str;
    /// Collection route in the address bar.
    const ROUTE: &'static str;
    /// Columns the list view may sort by.
    const SORT_FIELDS: &'static [&'static str];

    fn id(&self) -> Option<i64>;

    fn set_id(&mut self, id: Option<i64>);

    fn api(state: &AppState) -> Arc<dyn EntityApi<Self>>;
}

/// Date format used by date inputs and the wire format.
pub const FORM_DATE_FORMAT: &str = "%Y-%m-%d";

/// Coerces the textual id a form carries into a number. Blank means no id.
pub(crate) fn parse_form_id(raw: &str) -> Result<Option<i64>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<i64>()
        .map(Some)
        .map_err(|_| AppError::validation("id", format!("not a number: {}", raw)))
}

/// Blank date inputs clear the date.
pub(crate) fn parse_form_date(field: &str, raw: &str) -> Result<Option<NaiveDate>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, FORM_DATE_FORMAT)
        .map(Some)
        .map_err(|e| AppError::validation(field, format!("{} ({})", raw, e)))
}

pub(crate) fn format_form_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(FORM_DATE_FORMAT).to_string())
}
