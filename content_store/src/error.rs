//! Error types for content store operations.

use std::{fmt, time::Duration};

/// Result type for content store operations.
pub type ContentResult<T> = Result<T, ContentError>;

/// Errors that can occur during content store operations.
///
/// Every variant that comes out of a remote call carries the operation name
/// and the addressed target (`document <id>` or `path <blob>`), so the error
/// alone is enough to diagnose which call failed.
#[derive(Debug)]
pub enum ContentError {
    /// Referenced content does not exist.
    NotFound { target: String },

    /// Write path failed after the resilience policies gave up.
    Upload {
        target: String,
        source: Box<ContentError>,
    },

    /// The circuit breaker rejected the call without contacting the backend.
    CircuitOpen { op: &'static str, target: String },

    /// A single backend call exceeded the configured timeout.
    Timeout {
        op: &'static str,
        target: String,
        after: Duration,
    },

    /// Backend (Azure/object store) failure.
    Backend {
        op: &'static str,
        target: String,
        source: object_store::Error,
    },

    /// Invalid or incomplete configuration. Fatal at construction time.
    Configuration { reason: String },

    /// Checksum computation failed (e.g. unsupported algorithm).
    Checksum { algorithm: String, reason: String },

    /// I/O error, usually from a caller-supplied content stream.
    Io { source: std::io::Error },
}

impl ContentError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        ContentError::Configuration {
            reason: reason.into(),
        }
    }

    /// Map an object store error, turning `NotFound` into the dedicated
    /// variant so callers can tell "missing" apart from "try later".
    pub fn backend(op: &'static str, target: &str, source: object_store::Error) -> Self {
        match source {
            object_store::Error::NotFound { .. } => ContentError::NotFound {
                target: target.to_string(),
            },
            source => ContentError::Backend {
                op,
                target: target.to_string(),
                source,
            },
        }
    }

    /// Wrap a write-path failure. Breaker rejections stay distinct.
    pub fn upload(target: &str, err: ContentError) -> Self {
        match err {
            err @ (ContentError::CircuitOpen { .. }
            | ContentError::Upload { .. }
            | ContentError::Configuration { .. }) => err,
            err => ContentError::Upload {
                target: target.to_string(),
                source: Box::new(err),
            },
        }
    }

    /// Whether the failure says something about backend health.
    ///
    /// Only transient errors are counted as failures by the circuit breaker.
    pub fn is_transient(&self) -> bool {
        match self {
            ContentError::Backend { .. } | ContentError::Timeout { .. } => true,
            ContentError::Upload { source, .. } => source.is_transient(),
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ContentError::NotFound { .. })
    }

    pub fn is_circuit_open(&self) -> bool {
        matches!(self, ContentError::CircuitOpen { .. })
    }
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentError::NotFound { target } => write!(f, "Content not found for {}", target),
            ContentError::Upload { target, source } => {
                write!(f, "Failed to upload content for {}: {}", target, source)
            }
            ContentError::CircuitOpen { op, target } => write!(
                f,
                "Circuit breaker is open, rejected {} for {}",
                op, target
            ),
            ContentError::Timeout { op, target, after } => {
                write!(f, "{} for {} timed out after {:?}", op, target, after)
            }
            ContentError::Backend { op, target, source } => {
                write!(f, "Backend error during {} for {}: {}", op, target, source)
            }
            ContentError::Configuration { reason } => write!(f, "Configuration error: {}", reason),
            ContentError::Checksum { algorithm, reason } => {
                write!(f, "Checksum error ({}): {}", algorithm, reason)
            }
            ContentError::Io { source } => write!(f, "I/O error: {}", source),
        }
    }
}

impl std::error::Error for ContentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ContentError::Upload { source, .. } => Some(source.as_ref()),
            ContentError::Backend { source, .. } => Some(source),
            ContentError::Io { source } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ContentError {
    fn from(err: std::io::Error) -> Self {
        ContentError::Io { source: err }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generic_backend_error() -> object_store::Error {
        object_store::Error::Generic {
            store: "test",
            source: "connection reset".into(),
        }
    }

    #[test]
    fn test_backend_not_found_maps_to_not_found() {
        let err = ContentError::backend(
            "get",
            "document 42",
            object_store::Error::NotFound {
                path: "documents/42.content".to_string(),
                source: "missing".into(),
            },
        );
        assert!(err.is_not_found());
        assert!(!err.is_transient());
        assert_eq!(err.to_string(), "Content not found for document 42");
    }

    #[test]
    fn test_upload_keeps_circuit_open_distinct() {
        let open = ContentError::CircuitOpen {
            op: "store",
            target: "document 1".to_string(),
        };
        assert!(ContentError::upload("document 1", open).is_circuit_open());

        let wrapped = ContentError::upload(
            "document 1",
            ContentError::backend("store", "document 1", generic_backend_error()),
        );
        assert!(matches!(wrapped, ContentError::Upload { .. }));
        assert!(wrapped.is_transient());
    }
}
