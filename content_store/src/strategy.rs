//! Upload strategy selection.

use strum::{AsRefStr, Display};

/// How a payload is written to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum UploadStrategy {
    /// One request carrying the whole payload.
    Single,
    /// Block upload: independently staged blocks committed as a list.
    Chunked,
}

impl UploadStrategy {
    /// Payloads strictly larger than the threshold use block upload.
    pub fn select(payload_size: u64, threshold: u64) -> Self {
        if payload_size > threshold {
            UploadStrategy::Chunked
        } else {
            UploadStrategy::Single
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1024 * 1024;

    #[test]
    fn test_select_by_threshold() {
        let threshold = 256 * MIB;
        assert_eq!(
            UploadStrategy::select(300 * MIB, threshold),
            UploadStrategy::Chunked
        );
        assert_eq!(
            UploadStrategy::select(10 * 1024, threshold),
            UploadStrategy::Single
        );
    }

    #[test]
    fn test_threshold_boundary_is_single() {
        assert_eq!(UploadStrategy::select(1024, 1024), UploadStrategy::Single);
        assert_eq!(UploadStrategy::select(1025, 1024), UploadStrategy::Chunked);
        assert_eq!(UploadStrategy::select(0, 0), UploadStrategy::Single);
    }

    #[test]
    fn test_labels() {
        assert_eq!(UploadStrategy::Single.as_ref(), "single");
        assert_eq!(UploadStrategy::Chunked.to_string(), "chunked");
    }
}
