//! Definition of errors.

use thiserror::Error;

pub type Result<T, E = VersoError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum VersoError {
    /// A corpus or artifact file is missing or malformed.
    #[error("LoadError: {0}")]
    Load(String),

    /// The language oracle could not determine a language.
    #[error("DetectionFailed: could not determine the language of the text")]
    DetectionFailed,

    /// A label that was not seen when the label encoder was fit.
    #[error("UnknownLabel: {0:?}")]
    UnknownLabel(String),

    /// A class index outside `[0, n_classes)`.
    #[error("IndexOutOfRange: {index} is not in [0, {n_classes})")]
    IndexOutOfRange { index: usize, n_classes: usize },

    /// Blank or whitespace-only input.
    #[error("EmptyInput: no lyrics were given")]
    EmptyInput,

    /// The artifact set could not be loaded, so genres cannot be predicted.
    #[error("ModelsUnavailable: trained artifacts are not loaded")]
    ModelsUnavailable,

    #[error("InvalidModelError: {0}")]
    InvalidModel(String),

    #[error("InvalidArgumentError: {arg}: {msg}")]
    InvalidArgument { arg: &'static str, msg: String },

    #[error(transparent)]
    Decode(#[from] bincode::error::DecodeError),

    #[error(transparent)]
    Encode(#[from] bincode::error::EncodeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl VersoError {
    pub(crate) fn load<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::Load(msg.into())
    }

    pub(crate) fn invalid_model<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidModel(msg.into())
    }

    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument {
            arg,
            msg: msg.into(),
        }
    }
}
