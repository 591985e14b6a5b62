//! Error types for genxml documents

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Result type for document operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Fatal errors: the document could not be produced or written at all
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("No <{expected}> root element (found {})", .found.as_deref().unwrap_or("nothing"))]
    MissingRootNode {
        expected: &'static str,
        found: Option<String>,
    },

    #[error("Malformed XML: {0}")]
    Malformed(#[from] roxmltree::Error),

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The element kinds a genxml document is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Root,
    Enum,
    Struct,
    Field,
    Value,
}

impl NodeKind {
    /// The XML tag for this kind
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::Root => crate::ROOT_TAG,
            NodeKind::Enum => "enum",
            NodeKind::Struct => "struct",
            NodeKind::Field => "field",
            NodeKind::Value => "value",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Why a single node was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseErrorKind {
    #[error("'{node}' is missing required attribute '{attr}'")]
    MissingRequiredAttribute { node: NodeKind, attr: &'static str },

    #[error("'{node}' attribute '{attr}' is not a valid {expected}: {found:?}")]
    AttributeTypeMismatch {
        node: NodeKind,
        attr: &'static str,
        found: String,
        expected: &'static str,
    },

    #[error("no '{collection}' belongs to this '{node}'")]
    EmptyRequiredCollection { node: NodeKind, collection: NodeKind },

    #[error("'{node}' has an invalid '{child}' child")]
    InvalidChild { node: NodeKind, child: NodeKind },
}

/// A collected parse error with its source location
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseError {
    /// 1-based line of the offending element
    pub line: u32,
    /// The element's `name` attribute, if it had one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(flatten)]
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(line: u32, kind: ParseErrorKind) -> Self {
        Self {
            line,
            subject: None,
            kind,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.line)?;
        if let Some(subject) = &self.subject {
            write!(f, " ('{}')", subject)?;
        }
        write!(f, ": {}", self.kind)
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new(
            7,
            ParseErrorKind::EmptyRequiredCollection {
                node: NodeKind::Struct,
                collection: NodeKind::Field,
            },
        )
        .with_subject("Header");
        assert_eq!(
            err.to_string(),
            "line 7 ('Header'): no 'field' belongs to this 'struct'"
        );
    }

    #[test]
    fn test_missing_root_display() {
        let err = SchemaError::MissingRootNode {
            expected: "genxml",
            found: Some("schema".to_string()),
        };
        assert_eq!(err.to_string(), "No <genxml> root element (found schema)");
    }
}
