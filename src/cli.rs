use clap::Parser;

use crate::app::Action;
use crate::error::AppError;

#[derive(Parser, Debug)]
#[command(version, about = "Administration client for the LMS backend", long_about = None)]
pub struct Args {
    /// Address to open, e.g. `/courses?sort=course_name,desc` or `/courses/7/edit`
    pub path: String,

    /// Backend base URL, overrides LMS_API_URL
    #[arg(long)]
    pub api_url: Option<String>,

    /// Activate a column header of a list view (repeat to toggle again)
    #[arg(long = "sort", value_name = "FIELD")]
    pub sort: Vec<String>,

    /// Set a field of a create/edit form
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Send only the fields given with --set, as a partial update
    #[arg(long, default_value_t = false)]
    pub patch: bool,

    /// Confirm a delete dialog
    #[arg(short, long, default_value_t = false)]
    pub yes: bool,
}

impl Args {
    pub fn action(&self) -> Result<Action, AppError> {
        let set = self
            .set
            .iter()
            .map(|pair| {
                pair.split_once('=')
                    .map(|(key, value)| (key.trim().to_string(), value.to_string()))
                    .ok_or_else(|| AppError::validation(pair.as_str(), "expected KEY=VALUE"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Action {
            sort: self.sort.clone(),
            set,
            patch: self.patch,
            confirm: self.yes,
        })
    }
}
