//! Error types for stroke construction, compositing and encoding

use thiserror::Error;

/// Errors surfaced by the annotation core
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// A stroke could not be built from the supplied gesture data
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The base image is empty or its pixel buffer is unreadable
    #[error("invalid image: {0}")]
    InvalidImage(String),
    /// The encoder could not produce or write bytes for the composite
    #[error("encode failure: {0}")]
    EncodeFailure(String),
    /// The caption font could not be parsed
    #[error("invalid font: {0}")]
    InvalidFont(String),
}

pub type Result<T> = std::result::Result<T, Error>;
