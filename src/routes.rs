use std::fmt;

use crate::error::AppError;
use crate::models::{Course, Entity, Student};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Courses,
    Student,
}

impl EntityKind {
    pub fn route(self) -> &'static str {
        match self {
            EntityKind::Courses => Course::ROUTE,
            EntityKind::Student => Student::ROUTE,
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        [EntityKind::Courses, EntityKind::Student]
            .into_iter()
            .find(|kind| kind.route().trim_start_matches('/') == segment)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    List,
    Create,
    Detail(i64),
    Edit(i64),
    Delete(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub entity: EntityKind,
    pub screen: Screen,
}

impl Route {
    /// Parses a path such as `/courses/7/edit`. Query strings are ignored.
    pub fn parse(path: &str) -> Result<Self, AppError> {
        let unknown = || AppError::UnknownRoute(path.to_string());
        let path_only = path.split('?').next().unwrap_or_default();
        let segments: Vec<&str> = path_only.split('/').filter(|s| !s.is_empty()).collect();

        let (first, rest) = segments.split_first().ok_or_else(unknown)?;
        let entity = EntityKind::from_segment(first).ok_or_else(unknown)?;

        let screen = match rest {
            [] => Screen::List,
            ["new"] => Screen::Create,
            [id] => Screen::Detail(parse_id(id)?),
            [id, "edit"] => Screen::Edit(parse_id(id)?),
            [id, "delete"] => Screen::Delete(parse_id(id)?),
            _ => return Err(unknown()),
        };
        Ok(Self { entity, screen })
    }
}

fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::validation("id", format!("not a number: {}", raw)))
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = self.entity.route();
        match self.screen {
            Screen::List => write!(f, "{}", base),
            Screen::Create => write!(f, "{}/new", base),
            Screen::Detail(id) => write!(f, "{}/{}", base, id),
            Screen::Edit(id) => write!(f, "{}/{}/edit", base, id),
            Screen::Delete(id) => write!(f, "{}/{}/delete", base, id),
        }
    }
}
