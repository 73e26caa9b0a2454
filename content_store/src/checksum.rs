//! Content checksums.

use std::str::FromStr;

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use strum::{Display, EnumString};

use crate::{ContentError, ContentResult};

/// Supported digest algorithms. Names parse case-insensitively, with or
/// without the dash (`SHA-256`, `sha256`). `SHA` alone means SHA-1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ChecksumAlgorithm {
    #[strum(to_string = "MD5", serialize = "MD-5")]
    Md5,
    #[strum(to_string = "SHA-1", serialize = "SHA1", serialize = "SHA")]
    Sha1,
    #[strum(to_string = "SHA-224", serialize = "SHA224")]
    Sha224,
    #[strum(to_string = "SHA-256", serialize = "SHA256")]
    Sha256,
    #[strum(to_string = "SHA-384", serialize = "SHA384")]
    Sha384,
    #[strum(to_string = "SHA-512", serialize = "SHA512")]
    Sha512,
}

impl ChecksumAlgorithm {
    pub fn parse(name: &str) -> ContentResult<Self> {
        ChecksumAlgorithm::from_str(name.trim()).map_err(|_| ContentError::Checksum {
            algorithm: name.to_string(),
            reason: "unsupported digest algorithm".to_string(),
        })
    }

    pub fn hasher(self) -> ChecksumHasher {
        match self {
            ChecksumAlgorithm::Md5 => ChecksumHasher::Md5(Md5::new()),
            ChecksumAlgorithm::Sha1 => ChecksumHasher::Sha1(Sha1::new()),
            ChecksumAlgorithm::Sha224 => ChecksumHasher::Sha224(Sha224::new()),
            ChecksumAlgorithm::Sha256 => ChecksumHasher::Sha256(Sha256::new()),
            ChecksumAlgorithm::Sha384 => ChecksumHasher::Sha384(Sha384::new()),
            ChecksumAlgorithm::Sha512 => ChecksumHasher::Sha512(Sha512::new()),
        }
    }

    /// One-shot digest, lowercase hex.
    pub fn digest_hex(self, data: &[u8]) -> String {
        let mut hasher = self.hasher();
        hasher.update(data);
        hasher.finalize_hex()
    }
}

/// Incremental hasher fed chunk by chunk while content streams in.
pub enum ChecksumHasher {
    Md5(Md5),
    Sha1(Sha1),
    Sha224(Sha224),
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
}

impl ChecksumHasher {
    pub fn update(&mut self, data: &[u8]) {
        match self {
            ChecksumHasher::Md5(h) => h.update(data),
            ChecksumHasher::Sha1(h) => h.update(data),
            ChecksumHasher::Sha224(h) => h.update(data),
            ChecksumHasher::Sha256(h) => h.update(data),
            ChecksumHasher::Sha384(h) => h.update(data),
            ChecksumHasher::Sha512(h) => h.update(data),
        }
    }

    pub fn finalize_hex(self) -> String {
        match self {
            ChecksumHasher::Md5(h) => hex::encode(h.finalize()),
            ChecksumHasher::Sha1(h) => hex::encode(h.finalize()),
            ChecksumHasher::Sha224(h) => hex::encode(h.finalize()),
            ChecksumHasher::Sha256(h) => hex::encode(h.finalize()),
            ChecksumHasher::Sha384(h) => hex::encode(h.finalize()),
            ChecksumHasher::Sha512(h) => hex::encode(h.finalize()),
        }
    }
}

/// Case-insensitive hex comparison.
pub fn checksums_match(actual: &str, expected: &str) -> bool {
    actual.eq_ignore_ascii_case(expected.trim())
}
