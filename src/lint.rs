//! Document linting
//!
//! Reports suspicious but accepted authoring: names repeated inside one
//! sibling collection. Linting never rejects or rewrites a document, and bit
//! ranges are not inspected.

use std::collections::HashSet;

use serde::Serialize;

use crate::model::{Base, Document};

/// Result of linting a document
#[derive(Debug, Default, Serialize)]
pub struct LintResult {
    pub warnings: Vec<LintWarning>,
}

impl LintResult {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintWarning {
    pub code: &'static str,
    pub message: String,
    /// Slash-separated location, e.g. `struct/Header/field`
    pub path: String,
}

pub const DUPLICATE_NAME: &str = "W001";

pub fn lint_document(doc: &Document) -> LintResult {
    let mut result = LintResult::default();

    check_unique(&mut result, "enum", doc.enumerates.iter().map(|e| &e.base));
    check_unique(&mut result, "struct", doc.structures.iter().map(|s| &s.base));

    for enumerate in &doc.enumerates {
        let path = format!("enum/{}/value", enumerate.base.name);
        check_unique(&mut result, &path, enumerate.values.iter().map(|v| &v.base));
    }

    for structure in &doc.structures {
        let path = format!("struct/{}/field", structure.base.name);
        check_unique(&mut result, &path, structure.fields.iter().map(|f| &f.base));

        for field in &structure.fields {
            if let Some(choices) = &field.choices {
                let path = format!("struct/{}/field/{}/value", structure.base.name, field.base.name);
                check_unique(&mut result, &path, choices.iter().map(|c| &c.base));
            }
        }
    }

    result
}

fn check_unique<'a>(result: &mut LintResult, path: &str, items: impl Iterator<Item = &'a Base>) {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for base in items {
        let name = base.name.as_str();
        if !seen.insert(name) && reported.insert(name) {
            result.warnings.push(LintWarning {
                code: DUPLICATE_NAME,
                message: format!("duplicate name '{}'", name),
                path: path.to_string(),
            });
        }
    }
}
