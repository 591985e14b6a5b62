//! genxml
//!
//! Document model, parser and serializer for genxml schema files: named
//! `enum`s of integer constants and fixed-width `struct`s of bit fields.
//!
//! ## Format
//!
//! ```text
//! <genxml>
//! ├── <enum name prefix? info?>
//! │   └── <value name value prefix? info?>      (one or more)
//! └── <struct name length prefix? info?>
//!     └── <field name start end type default? prefix? info?>   (one or more)
//!         └── <value name value ...>            (optional choices)
//! ```
//!
//! ## Error policy
//!
//! Parsing never stops at the first problem. Each failing node is recorded
//! as a [`ParseError`] with its line and dropped from its parent; a parent
//! whose required children failed is dropped too. Only unreadable text or a
//! missing `<genxml>` root fails the whole call.

pub mod checksum;
pub mod config;
pub mod error;
pub mod file;
pub mod lint;
pub mod model;
pub mod parser;
pub mod serializer;
pub mod tree;

pub use checksum::Checksum;
pub use config::GenxmlConfig;
pub use error::{NodeKind, ParseError, ParseErrorKind, Result, SchemaError};
pub use file::{load, save, save_with};
pub use lint::{lint_document, LintResult, LintWarning};
pub use model::{Base, Document, Enum, Field, Struct, Value};
pub use parser::{parse, ParseOutcome};
pub use serializer::{serialize, serialize_with, to_tree};
pub use tree::WriteOptions;

/// Tag of the document root element
pub const ROOT_TAG: &str = "genxml";
