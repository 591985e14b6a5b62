//! Whole-file load and save

use std::fs;
use std::path::Path;

use tracing::{error, info};

use crate::error::{Result, SchemaError};
use crate::model::Document;
use crate::parser::{parse, ParseOutcome};
use crate::serializer::serialize_with;
use crate::tree::WriteOptions;

/// Read and parse a genxml file
pub fn load(path: impl AsRef<Path>) -> Result<ParseOutcome> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| SchemaError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let outcome = parse(&text)?;
    info!(
        path = %path.display(),
        structures = outcome.document.structures.len(),
        enumerates = outcome.document.enumerates.len(),
        errors = outcome.errors.len(),
        "loaded document"
    );
    Ok(outcome)
}

/// Serialize and write a document with the default options
pub fn save(doc: &Document, path: impl AsRef<Path>) -> Result<()> {
    save_with(doc, path, &WriteOptions::default())
}

pub fn save_with(doc: &Document, path: impl AsRef<Path>, options: &WriteOptions) -> Result<()> {
    let path = path.as_ref();
    let text = serialize_with(doc, options);
    match fs::write(path, text) {
        Ok(()) => {
            info!(path = %path.display(), "saved document");
            Ok(())
        }
        Err(source) => {
            error!(path = %path.display(), %source, "failed to save document");
            Err(SchemaError::Write {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}
