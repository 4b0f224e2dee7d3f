//! Tracker service errors

use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across the crate.
pub type Result<T, E = Error> = anyhow::Result<T, E>;

/// Domain level error type returned by the tracker crates.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Error {
    /// The request payload is invalid or missing required fields.
    #[error("code: 400, description: {0}")]
    BadRequest(String),

    /// The requested resource could not be found.
    #[error("code: 404, description: {0}")]
    NotFound(String),

    /// A non recoverable internal error occurred.
    #[error("code: 500, description: {0}")]
    Internal(String),

    /// The upstream feed could not be fetched.
    #[error("code: 502, description: {0}")]
    BadGateway(String),

    /// The real-time feed payload is malformed or truncated.
    #[error("code: 500, description: decode_error {0}")]
    Decode(String),

    /// A static table header is missing a column the table cannot do without.
    #[error("code: 500, description: missing_column {0}")]
    MissingColumn(String),

    /// The durable vehicle store rejected a read or write.
    #[error("code: 500, description: persistence_error {0}")]
    Persistence(String),
}

impl Error {
    /// Returns the stable error code associated with the variant.
    #[must_use]
    pub const fn code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error description.
    #[must_use]
    pub fn description(&self) -> String {
        self.to_string()
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        let chain = err.chain().map(ToString::to_string).collect::<Vec<_>>().join(" -> ");

        // if type is Error, return it with the newly added context
        if let Some(inner) = err.downcast_ref::<Self>() {
            tracing::debug!("Error: {err}, caused by: {inner}");

            return match inner {
                Self::BadRequest(_s) => Self::BadRequest(chain),
                Self::NotFound(_s) => Self::NotFound(chain),
                Self::BadGateway(_s) => Self::BadGateway(chain),
                Self::Internal(_s) => Self::Internal(chain),
                Self::Decode(e) => Self::Decode(format!("{err}: {e}")),
                Self::MissingColumn(e) => Self::MissingColumn(format!("{err}: {e}")),
                Self::Persistence(e) => Self::Persistence(format!("{err}: {e}")),
            };
        }

        // otherwise, return an Internal error
        Self::Internal(chain)
    }
}

pub struct HttpError {
    status: StatusCode,
    error: String,
}

impl From<Error> for HttpError {
    fn from(e: Error) -> Self {
        Self { status: e.code(), error: e.to_string() }
    }
}

impl From<anyhow::Error> for HttpError {
    fn from(e: anyhow::Error) -> Self {
        let error = format!("{e}, caused by: {}", e.root_cause());
        let status = e.downcast_ref().map_or(StatusCode::INTERNAL_SERVER_ERROR, Error::code);
        Self { status, error }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, self.error).into_response()
    }
}

#[macro_export]
macro_rules! bad_request {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::BadRequest(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::BadRequest(format!($err))
    };
}

#[macro_export]
macro_rules! not_found {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::NotFound(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::NotFound(format!($err))
    };
}

#[macro_export]
macro_rules! bad_gateway {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::BadGateway(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::BadGateway(format!($err))
    };
}

#[cfg(test)]
mod tests {
    use anyhow::{Context, Result, anyhow};
    use http::StatusCode;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{EnvFilter, Registry, fmt};

    use super::Error;

    #[test]
    fn error_display() {
        let err = Error::BadRequest("invalid category".to_string());
        assert_eq!(format!("{err}",), "code: 400, description: invalid category");
    }

    #[test]
    fn with_context() {
        Registry::default().with(EnvFilter::new("debug")).with(fmt::layer()).init();

        let context_error = || -> Result<(), Error> {
            Err(Error::NotFound("no snapshot".to_string()))
                .context("loading stops")
                .context("serving request")?;
            Ok(())
        };

        let result = context_error();
        assert_eq!(
            result.unwrap_err(),
            Error::NotFound(
                "serving request -> loading stops -> code: 404, description: no snapshot"
                    .to_string()
            )
        );
    }

    #[test]
    fn decode_context() {
        let result = Err::<(), Error>(Error::Decode("truncated buffer".to_string()))
            .context("decoding feed");
        let err: Error = result.unwrap_err().into();

        assert_eq!(
            err.to_string(),
            "code: 500, description: decode_error decoding feed: truncated buffer"
        );
    }

    #[test]
    fn anyhow_context() {
        let result = Err::<(), anyhow::Error>(anyhow!("one-off error")).context("error context");
        let err: Error = result.unwrap_err().into();

        assert_eq!(err.to_string(), "code: 500, description: error context -> one-off error");
    }

    #[test]
    fn status_codes() {
        assert_eq!(bad_request!("bad {}", "input").code(), StatusCode::BAD_REQUEST);
        assert_eq!(not_found!("missing").code(), StatusCode::NOT_FOUND);
        assert_eq!(bad_gateway!("upstream {}", 503).code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            Error::Persistence("write failed".to_string()).code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
