use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("malformed unit expression at character {pos}: {message}")]
    MalformedExpression { pos: usize, message: String },

    #[error("unknown unit '{symbol}' at character {pos}")]
    UnknownUnit { symbol: String, pos: usize },

    #[error(transparent)]
    Convert(#[from] mensura_convert::Error),

    #[error("non-linear unit '{0}' has no linear system converter")]
    NonLinear(String),

    #[error("incompatible units: '{from}' vs '{to}'")]
    Incompatible { from: String, to: String },

    #[error("unit exponent out of range")]
    ExponentOverflow,

    #[error("annotation '{0}' may not contain '}}'")]
    InvalidAnnotation(String),

    #[error("failed to write formatted unit")]
    Sink(#[from] std::fmt::Error),
}

impl Error {
    pub(crate) fn malformed(pos: usize, message: impl Into<String>) -> Self {
        Error::MalformedExpression {
            pos,
            message: message.into(),
        }
    }
}
