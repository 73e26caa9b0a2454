//! Blob naming for document content.

use uuid::Uuid;

/// Suffix appended to every document content blob.
pub const CONTENT_SUFFIX: &str = ".content";

/// Maps document identifiers to blob names: `{prefix}{document_id}.content`.
///
/// The format is persisted state; changing it makes previously stored
/// content unreachable. The prefix is used verbatim, so a prefix without a
/// trailing `/` is simply glued to the identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobNaming {
    prefix: String,
}

impl BlobNaming {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn blob_name(&self, document_id: &Uuid) -> String {
        format!("{}{}{}", self.prefix, document_id, CONTENT_SUFFIX)
    }
}
