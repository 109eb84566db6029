//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! unresolved references (measurements, filters, styles), inconsistent measurement data,
//! malformed configuration, IO and serialization failures.
use thiserror::Error;

use crate::measurement::MeasurementKey;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown measurement '{key}'")]
    UnknownMeasurement { key: MeasurementKey },

    #[error("unknown filter '{id}'")]
    UnknownFilter { id: String },

    #[error("unknown style '{id}'")]
    UnknownStyle { id: String },

    #[error("measurement '{key}' has {found} faces, expected {expected}")]
    MeasurementLengthMismatch {
        key: MeasurementKey,
        expected: usize,
        found: usize,
    },

    #[error("malformed configuration: {0}")]
    MalformedConfiguration(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the error only invalidates the feature that raised it.
    ///
    /// Dangling references are recovered per feature; everything else aborts the run.
    pub fn is_feature_recoverable(&self) -> bool {
        matches!(
            self,
            Error::UnknownMeasurement { .. } | Error::UnknownFilter { .. } | Error::UnknownStyle { .. }
        )
    }
}

impl From<toml::de::Error> for Error {
    fn from(value: toml::de::Error) -> Self {
        Error::MalformedConfiguration(value.to_string())
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}
