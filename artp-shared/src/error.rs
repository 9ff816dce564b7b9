#![allow(dead_code)]

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("unsupported codec descriptor: {0}")]
    ErrUnsupportedCodec(String),
    #[error("invalid format parameters: {0}")]
    ErrInvalidFormatParameters(String),
    #[error("buffer: short")]
    ErrBufferShort,

    #[error("{0}")]
    Other(String),
}
