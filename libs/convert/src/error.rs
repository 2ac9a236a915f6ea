use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid converter: {0}")]
    InvalidConverter(String),

    #[error("conversion is not exact: {0}")]
    Inexact(String),

    #[error("numeric overflow")]
    Overflow,
}
