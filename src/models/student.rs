use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::EntityApi;
use crate::error::AppError;
use crate::models::{Entity, parse_form_id};
use crate::state::AppState;
use crate::views::Editable;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Student {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub reg_no: Option<String>,
    pub student_name: Option<String>,
}

impl Entity for Student {
    const NAME: &'static str = "student";
    const RESOURCE: &'static str = "students";
    const ROUTE: &'static str = "/student";
    const SORT_FIELDS: &'static [&'static str] = &["id", "reg_no", "student_name"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }

    fn api(state: &AppState) -> Arc<dyn EntityApi<Self>> {
        state.students.clone()
    }
}

/// Raw values of the student form. `None` leaves the loaded value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentForm {
    pub id: Option<String>,
    pub reg_no: Option<String>,
    pub student_name: Option<String>,
}

#[async_trait]
impl Editable for Student {
    type Form = StudentForm;
    type Choices = ();

    async fn load_choices(_state: &AppState) -> Result<(), AppError> {
        Ok(())
    }

    fn form_defaults(&self) -> StudentForm {
        StudentForm {
            id: self.id.map(|id| id.to_string()),
            reg_no: self.reg_no.clone(),
            student_name: self.student_name.clone(),
        }
    }

    fn set_field(form: &mut StudentForm, name: &str, value: String) -> Result<(), AppError> {
        match name {
            "id" => form.id = Some(value),
            "reg_no" => form.reg_no = Some(value),
            "student_name" => form.student_name = Some(value),
            other => return Err(AppError::validation(other, "unknown student field")),
        }
        Ok(())
    }

    fn merge_form(&self, form: &StudentForm, _choices: &()) -> Result<Self, AppError> {
        let mut merged = self.clone();
        if let Some(raw) = &form.id {
            merged.id = parse_form_id(raw)?;
        }
        if let Some(reg_no) = &form.reg_no {
            merged.reg_no = Some(reg_no.clone());
        }
        if let Some(name) = &form.student_name {
            merged.student_name = Some(name.clone());
        }
        Ok(merged)
    }
}
