use thiserror::Error;

/// An error that occurred while parsing a duration such as `200ms`.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("'{0}' is not a duration, expected a number followed by a unit")]
    Syntax(String),
    #[error("unit '{0}' is not supported")]
    UnitNotSupported(String),
}
