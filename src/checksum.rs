//! Canonical-form fingerprints
//!
//! A document's checksum is the SHA256 of its canonical serialization, so two
//! documents that save to the same text share a checksum regardless of how
//! their source files were formatted.

use sha2::{Digest, Sha256};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::Document;
use crate::serializer::serialize_with;
use crate::tree::WriteOptions;

/// SHA256 of genxml text, hex encoded
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    /// Fingerprint text exactly as it is
    pub fn of_text(text: &str) -> Self {
        Self(format!("{:x}", Sha256::digest(text.as_bytes())))
    }

    /// Fingerprint the default canonical form of a document
    pub fn of_document(doc: &Document) -> Self {
        Self::of_document_with(doc, &WriteOptions::default())
    }

    pub fn of_document_with(doc: &Document, options: &WriteOptions) -> Self {
        Self::of_text(&serialize_with(doc, options))
    }

    /// Whether `doc` still serializes to the fingerprinted canonical text
    ///
    /// Editors can keep the checksum taken at load time and ask this before
    /// prompting to save.
    pub fn verify(&self, doc: &Document) -> bool {
        *self == Self::of_document(doc)
    }

    /// Whether `text` is already exactly the canonical form of `doc`
    pub fn is_canonical(text: &str, doc: &Document, options: &WriteOptions) -> bool {
        Self::of_text(text) == Self::of_document_with(doc, options)
    }

    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
