//! Document model types
//!
//! Every node shares the [`Base`] record (`name`, `prefix`, `info`);
//! kind-specific data sits next to it. Optional attributes are `Option`s so
//! that "absent" and "present but empty" survive a load/save cycle.

use serde::{Deserialize, Serialize};

/// Attributes common to every node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Base {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

impl Base {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: None,
            info: None,
        }
    }
}

/// A named constant: an enum member or a field choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Value {
    #[serde(flatten)]
    pub base: Base,
    pub value: u64,
}

impl Value {
    pub fn new(name: impl Into<String>, value: u64) -> Self {
        Self {
            base: Base::new(name),
            value,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.base.prefix = Some(prefix.into());
        self
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.base.info = Some(info.into());
        self
    }
}

/// A named bit range inside a struct
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    #[serde(flatten)]
    pub base: Base,
    pub start: u32,
    pub end: u32,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<u64>,
    /// `Some` only when the source carried at least one `value` child
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Value>>,
}

impl Field {
    pub fn new(name: impl Into<String>, start: u32, end: u32, ty: impl Into<String>) -> Self {
        Self {
            base: Base::new(name),
            start,
            end,
            ty: ty.into(),
            default_value: None,
            choices: None,
        }
    }

    pub fn with_default(mut self, default_value: u64) -> Self {
        self.default_value = Some(default_value);
        self
    }

    /// Append a choice, creating the choice list on first use
    pub fn with_choice(mut self, choice: Value) -> Self {
        self.choices.get_or_insert_with(Vec::new).push(choice);
        self
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.base.info = Some(info.into());
        self
    }

    pub fn choice(&self, name: &str) -> Option<&Value> {
        self.choices
            .as_deref()
            .and_then(|choices| choices.iter().find(|c| c.base.name == name))
    }
}

/// A named, non-empty set of values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enum {
    #[serde(flatten)]
    pub base: Base,
    pub values: Vec<Value>,
}

impl Enum {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            base: Base::new(name),
            values,
        }
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.iter().find(|v| v.base.name == name)
    }
}

/// A fixed bit-length record made of ordered fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Struct {
    #[serde(flatten)]
    pub base: Base,
    pub length: u32,
    pub fields: Vec<Field>,
}

impl Struct {
    pub fn new(name: impl Into<String>, length: u32, fields: Vec<Field>) -> Self {
        Self {
            base: Base::new(name),
            length,
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.base.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.base.name == name)
    }
}

/// A whole genxml document
///
/// The root's `name` may be empty; it is only written back when non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(flatten)]
    pub base: Base,
    #[serde(default)]
    pub structures: Vec<Struct>,
    #[serde(default)]
    pub enumerates: Vec<Enum>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn structure(&self, name: &str) -> Option<&Struct> {
        self.structures.iter().find(|s| s.base.name == name)
    }

    pub fn structure_mut(&mut self, name: &str) -> Option<&mut Struct> {
        self.structures.iter_mut().find(|s| s.base.name == name)
    }

    pub fn enumerate(&self, name: &str) -> Option<&Enum> {
        self.enumerates.iter().find(|e| e.base.name == name)
    }

    pub fn enumerate_mut(&mut self, name: &str) -> Option<&mut Enum> {
        self.enumerates.iter_mut().find(|e| e.base.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty() && self.enumerates.is_empty()
    }
}
