use std::{fmt, io, num::ParseIntError};

use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;
use url::ParseError as UrlParseError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum MarginaliaError {
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Encode failure: {0}")]
    Encode(String),
    #[error("Invalid block type: {0}")]
    InvalidType(String),
    #[error("Invalid block data: {0}")]
    InvalidData(String),
    #[error("Failed to convert block data to blocks: {0}")]
    FailedToConvertBlockDataToBlocks(String),
    #[error("Duplicate chapter: {0}")]
    DuplicateChapter(String),
    #[error("Structural invariant violated: {0}")]
    StructuralInvariant(String),
    #[error("Invalid outline edit: {0}")]
    InvalidEdit(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl MarginaliaError {
    /// Decode failures are the ones a caller may degrade to an empty document on.
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            MarginaliaError::Decode(_)
                | MarginaliaError::InvalidType(_)
                | MarginaliaError::InvalidData(_)
                | MarginaliaError::FailedToConvertBlockDataToBlocks(_)
        )
    }
}

impl From<toml::de::Error> for MarginaliaError {
    fn from(src: toml::de::Error) -> MarginaliaError {
        MarginaliaError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for MarginaliaError {
    fn from(src: toml::ser::Error) -> MarginaliaError {
        MarginaliaError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<JsonError> for MarginaliaError {
    fn from(src: JsonError) -> MarginaliaError {
        MarginaliaError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<uuid::Error> for MarginaliaError {
    fn from(src: uuid::Error) -> MarginaliaError {
        MarginaliaError::Serialization(format!("UUID conversion failed: {src}"))
    }
}

impl From<UrlParseError> for MarginaliaError {
    fn from(src: UrlParseError) -> MarginaliaError {
        MarginaliaError::Serialization(format!("Invalid URL: {src}"))
    }
}

impl From<hex::FromHexError> for MarginaliaError {
    fn from(src: hex::FromHexError) -> MarginaliaError {
        MarginaliaError::Storage(format!("Stored blob is not valid hex: {src}"))
    }
}

impl From<ParseIntError> for MarginaliaError {
    fn from(src: ParseIntError) -> MarginaliaError {
        MarginaliaError::Decode(format!("Expected an integer: {src}"))
    }
}

impl From<io::Error> for MarginaliaError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => MarginaliaError::NotFound(format!("{x}")),
            _ => MarginaliaError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<fmt::Error> for MarginaliaError {
    fn from(x: fmt::Error) -> Self {
        MarginaliaError::Encode(format!("{x}"))
    }
}
