use std::fmt;
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

/// Current address: path plus query string (including the leading `?`, or
/// empty).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub pathname: String,
    pub search: String,
}

impl Location {
    pub fn parse(address: &str) -> Self {
        match address.split_once('?') {
            Some((path, query)) if !query.is_empty() => Self {
                pathname: normalize_path(path),
                search: format!("?{}", query),
            },
            Some((path, _)) => Self {
                pathname: normalize_path(path),
                search: String::new(),
            },
            None => Self {
                pathname: normalize_path(address),
                search: String::new(),
            },
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pathname, self.search)
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

pub trait Navigator: Send + Sync {
    fn location(&self) -> Location;

    /// Moves to `to`, adding a history entry.
    fn push(&self, to: &str);
}

/// Navigator backed by an in-memory history stack.
pub struct MemoryHistory {
    entries: Mutex<Vec<Location>>,
}

impl MemoryHistory {
    pub fn new(start: &str) -> Self {
        Self {
            entries: Mutex::new(vec![Location::parse(start)]),
        }
    }

    pub fn entries(&self) -> Vec<Location> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Location>> {
        // A poisoned history is still a valid list of locations.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Navigator for MemoryHistory {
    fn location(&self) -> Location {
        self.lock().last().cloned().unwrap_or_default()
    }

    fn push(&self, to: &str) {
        debug!("navigate to {}", to);
        self.lock().push(Location::parse(to));
    }
}
