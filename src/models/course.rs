use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::EntityApi;
use crate::error::AppError;
use crate::models::{Entity, Student, format_form_date, parse_form_date, parse_form_id};
use crate::state::AppState;
use crate::views::Editable;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub course_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<Student>,
}

impl Course {
    /// Display name of the associated student, empty when there is none.
    pub fn student_label(&self) -> &str {
        self.student
            .as_ref()
            .and_then(|s| s.student_name.as_deref())
            .unwrap_or("")
    }
}

impl Entity for Course {
    const NAME: &'static str = "courses";
    const RESOURCE: &'static str = "courses";
    const ROUTE: &'static str = "/courses";
    const SORT_FIELDS: &'static [&'static str] = &["id", "course_name", "start_date", "end_date"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }

    fn api(state: &AppState) -> Arc<dyn EntityApi<Self>> {
        state.courses.clone()
    }
}

/// Raw values of the course form, as text inputs hold them.
///
/// `None` leaves the loaded value untouched, except for `student`: the
/// selector always decides the association, and an unset or blank selection
/// means no student.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseForm {
    pub id: Option<String>,
    pub course_name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub student: Option<String>,
}

/// First student whose stringified id equals the selected value.
pub fn resolve_student(students: &[Student], selected: Option<&str>) -> Option<Student> {
    let selected = selected?;
    students
        .iter()
        .find(|s| s.id.map(|id| id.to_string()).as_deref() == Some(selected))
        .cloned()
}

#[async_trait]
impl Editable for Course {
    type Form = CourseForm;
    type Choices = Vec<Student>;

    async fn load_choices(state: &AppState) -> Result<Vec<Student>, AppError> {
        let students = state.students.fetch_all(None).await?;
        debug!("loaded {} students for the course form", students.len());
        Ok(students)
    }

    fn form_defaults(&self) -> CourseForm {
        CourseForm {
            id: self.id.map(|id| id.to_string()),
            course_name: self.course_name.clone(),
            start_date: format_form_date(self.start_date),
            end_date: format_form_date(self.end_date),
            student: self
                .student
                .as_ref()
                .and_then(|s| s.id)
                .map(|id| id.to_string()),
        }
    }

    fn set_field(form: &mut CourseForm, name: &str, value: String) -> Result<(), AppError> {
        match name {
            "id" => form.id = Some(value),
            "course_name" => form.course_name = Some(value),
            "start_date" => form.start_date = Some(value),
            "end_date" => form.end_date = Some(value),
            "student" => form.student = Some(value),
            other => return Err(AppError::validation(other, "unknown course field")),
        }
        Ok(())
    }

    fn merge_form(&self, form: &CourseForm, students: &Vec<Student>) -> Result<Self, AppError> {
        let mut merged = self.clone();
        if let Some(raw) = &form.id {
            merged.id = parse_form_id(raw)?;
        }
        if let Some(name) = &form.course_name {
            merged.course_name = Some(name.clone());
        }
        if let Some(raw) = &form.start_date {
            merged.start_date = parse_form_date("start_date", raw)?;
        }
        if let Some(raw) = &form.end_date {
            merged.end_date = parse_form_date("end_date", raw)?;
        }
        merged.student = resolve_student(students, form.student.as_deref());
        Ok(merged)
    }

    fn selector_options(students: &Vec<Student>) -> Vec<(String, String)> {
        std::iter::once((String::new(), String::new()))
            .chain(students.iter().filter_map(|s| {
                let id = s.id?;
                Some((id.to_string(), s.student_name.clone().unwrap_or_default()))
            }))
            .collect()
    }
}
