//! Sort criteria of the list views and their `sort=field,order` encoding.

use std::fmt;
use std::str::FromStr;

use url::form_urlencoded;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(AppError::validation("sort", format!("unknown order: {}", other))),
        }
    }
}

/// Indicator drawn next to a column header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortIcon {
    Neutral,
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    pub field: String,
    pub order: SortOrder,
}

impl SortState {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    /// Reads `sort=field,order` from a query string (with or without the
    /// leading `?`). Missing or malformed parts fall back to `default_field`
    /// and ascending order.
    pub fn from_query(search: &str, default_field: &str) -> Self {
        let param = form_urlencoded::parse(search.trim_start_matches('?').as_bytes())
            .find(|(key, _)| key == "sort")
            .map(|(_, value)| value.into_owned());

        let Some(param) = param else {
            return Self::new(default_field, SortOrder::Asc);
        };

        let (field, order) = match param.split_once(',') {
            Some((field, order)) => (field, order.parse().unwrap_or_default()),
            None => (param.as_str(), SortOrder::Asc),
        };
        let field = if field.trim().is_empty() {
            default_field
        } else {
            field.trim()
        };
        Self::new(field, order)
    }

    /// Clicking the active column flips the order; clicking another column
    /// moves the sort there and keeps the current order.
    pub fn toggle(&mut self, field: &str) {
        if self.field == field {
            self.order = self.order.flipped();
        } else {
            self.field = field.to_string();
        }
    }

    /// Comparator sent to the backend: `field,order`.
    pub fn comparator(&self) -> String {
        format!("{},{}", self.field, self.order)
    }

    /// Query string the address should carry, including the `?`.
    pub fn to_query(&self) -> String {
        format!("?sort={}", self.comparator())
    }

    pub fn icon(&self, field: &str) -> SortIcon {
        if self.field != field {
            SortIcon::Neutral
        } else {
            match self.order {
                SortOrder::Asc => SortIcon::Ascending,
                SortOrder::Desc => SortIcon::Descending,
            }
        }
    }
}
