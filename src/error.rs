use quick_xml::Error as XMLError;
use std::{str::Utf8Error, string::FromUtf8Error};
use thiserror::Error;

/// Wrapper around `std::Result`
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
#[derive(Debug, Error)]
pub enum Error {
    /// [`std::io`] related error, passed through untouched.
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    /// Decoding related error.
    /// Maybe the XML declaration has an encoding value that it doesn't recognize,
    /// or it doesn't match its actual encoding.
    ///
    /// Only returned when [`ReadOptions::strict`](crate::ReadOptions::strict) is set.
    #[error("Cannot decode XML")]
    CannotDecode,
    /// Assorted errors while parsing XML.
    ///
    /// Only returned when [`ReadOptions::strict`](crate::ReadOptions::strict) is set.
    /// Otherwise the tree built so far is kept and the error is logged.
    #[error("Malformed XML: {0}")]
    MalformedXML(String),
    /// The projected value could not be written as json.
    #[error("Cannot serialize json: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<XMLError> for Error {
    fn from(err: XMLError) -> Error {
        match err {
            XMLError::EndEventMismatch { expected, found } => Error::MalformedXML(format!(
                "Closing tag mismatch. Expected {}, found {}",
                expected, found,
            )),
            XMLError::Io(err) => Error::Io(err),
            XMLError::Utf8(_) => Error::CannotDecode,
            err => Error::MalformedXML(err.to_string()),
        }
    }
}

impl From<FromUtf8Error> for Error {
    fn from(_: FromUtf8Error) -> Error {
        Error::CannotDecode
    }
}

impl From<Utf8Error> for Error {
    fn from(_: Utf8Error) -> Error {
        Error::CannotDecode
    }
}
