//! Domain errors surfaced to the user as blocking messages.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HubError {
    /// A required form field was left empty.
    #[error("{0} required")]
    MissingField(&'static str),

    #[error("Assignment not found: {0}")]
    AssignmentNotFound(String),

    #[error("Faculty member not found: {0}")]
    FacultyNotFound(String),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("Unknown panel: {0}")]
    UnknownPanel(String),
}

pub type Result<T> = std::result::Result<T, HubError>;
