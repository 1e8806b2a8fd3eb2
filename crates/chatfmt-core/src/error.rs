use thiserror::Error;

/// Configuration problems detected before any text is processed.
///
/// Content that cannot be enriched (unknown users, terms that never match) is not an error;
/// it is left as literal text.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum FormatError {
    #[error("formatter is missing its {0}")]
    MissingCollaborator(&'static str),
}
