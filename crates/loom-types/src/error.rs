use thiserror::Error;

/// Errors produced by type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("empty identifier")]
    EmptyId,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("unknown visibility: {0}")]
    UnknownVisibility(String),
}
