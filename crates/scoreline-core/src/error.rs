// Error taxonomy shared by every aggregation component.

use std::fmt;

use thiserror::Error;
use tracing::warn;

/// Errors surfaced by the store adapter and the aggregation layer.
#[derive(Debug, Error)]
pub enum Error {
    /// The underlying store could not be opened or reached. Fatal at startup.
    #[error("sports store unavailable at {path}: {source}")]
    StoreUnavailable {
        path: String,
        source: rusqlite::Error,
    },

    /// A prepared query could not execute, or a row could not be decoded.
    #[error("query failed ({context}): {source}")]
    QueryFailed {
        context: &'static str,
        source: rusqlite::Error,
    },

    /// A lookup by id or name yielded zero rows.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// A name-based lookup matched more than one row.
    #[error("{entity} reference `{key}` is ambiguous ({} candidates)", candidates.len())]
    AmbiguousReference {
        entity: &'static str,
        key: String,
        candidates: Vec<i64>,
    },
}

impl Error {
    pub(crate) fn query(context: &'static str) -> impl FnOnce(rusqlite::Error) -> Error {
        move |source| Error::QueryFailed { context, source }
    }

    /// Whether this error means "no data" rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ---------------------------------------------------------------------------
// Section: per-view boundary value
// ---------------------------------------------------------------------------

/// Outcome of one optional sub-view.
///
/// Aggregations that feed a composite view are caught at their own boundary:
/// a failure degrades that section to `Failed` (reason kept for logging and
/// display) while sibling sections still render.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Section<T> {
    Ready(T),
    /// The query succeeded but there was nothing to show.
    Empty,
    Failed(String),
}

impl<T> Section<T> {
    /// Fold a component result into a section, logging failures.
    ///
    /// `is_empty` decides whether a successful value should render as the
    /// "no data" placeholder. `NotFound` is treated as empty, not as a failure.
    pub fn from_result(what: &str, result: Result<T>, is_empty: impl FnOnce(&T) -> bool) -> Self {
        match result {
            Ok(value) if is_empty(&value) => Section::Empty,
            Ok(value) => Section::Ready(value),
            Err(e) if e.is_not_found() => Section::Empty,
            Err(e) => {
                warn!("{what} unavailable: {e}");
                Section::Failed(e.to_string())
            }
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Section::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Section::Failed(_))
    }
}

impl<T> Section<Vec<T>> {
    /// Build a section from a list-valued result; an empty list is `Empty`.
    pub fn from_list(what: &str, result: Result<Vec<T>>) -> Self {
        Section::from_result(what, result, Vec::is_empty)
    }
}

impl<T> fmt::Display for Section<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Ready(_) => write!(f, "ready"),
            Section::Empty => write!(f, "no data"),
            Section::Failed(reason) => write!(f, "unavailable: {reason}"),
        }
    }
}
