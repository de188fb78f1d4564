use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::envelope::Family;

/// Errors a [`Handler`](crate::Handler) may return. Anything convertible into this box is accepted.
pub type Err = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Fatal errors for a single invocation.
///
/// None of these are retried by the adapter and none of them leave state behind for later
/// invocations.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The event shape matched none of the supported trigger families.
    #[error("unrecognized event payload schema: {0}")]
    UnrecognizedSchema(String),

    /// The family was detected, but a field it requires is absent or mistyped.
    #[error("malformed {family} event: {reason}")]
    MalformedEnvelope {
        /// The family the event was classified as.
        family: Family,
        /// What was wrong with it.
        reason: String,
    },

    /// The application handler failed. The source error is passed through untouched.
    #[error("handler failed: {0}")]
    HandlerFailure(#[source] Err),

    /// A body was flagged as base64 but did not decode.
    #[error("body is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
}

impl AdapterError {
    pub(crate) fn malformed(family: Family, reason: impl Into<String>) -> Self {
        AdapterError::MalformedEnvelope {
            family,
            reason: reason.into(),
        }
    }

    /// The name this error is reported under.
    pub fn kind(&self) -> &'static str {
        match self {
            AdapterError::UnrecognizedSchema(_) => "UnrecognizedSchema",
            AdapterError::MalformedEnvelope { .. } => "MalformedEnvelope",
            AdapterError::HandlerFailure(_) => "HandlerFailure",
            AdapterError::Encoding(_) => "EncodingError",
        }
    }
}

/// A computer-readable report of a failed invocation, in the shape the
/// [Lambda Runtime API](https://docs.aws.amazon.com/lambda/latest/dg/runtimes-api.html)
/// expects on its error endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorReport {
    /// The kind of error, e.g. `MalformedEnvelope`.
    #[serde(rename = "errorType")]
    pub name: String,
    /// The [std::fmt::Display] output of the error.
    #[serde(rename = "errorMessage")]
    pub err: String,
}

impl From<&AdapterError> for ErrorReport {
    fn from(err: &AdapterError) -> Self {
        ErrorReport {
            name: String::from(err.kind()),
            err: err.to_string(),
        }
    }
}
