//! Enumerated values and the registry that hydrates them

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::Value;

/// Capability exposed by values that know how to label themselves.
///
/// Type detection checks for this capability to decide whether a column
/// holds translatable enum values.
pub trait LabeledValue {
    /// Human-readable label (a translation key when a domain is set)
    fn label(&self) -> &str;

    /// Translation domain the label belongs to
    fn translation_domain(&self) -> &str;
}

/// A single case of a named enum, as produced by `EnumRegistry::hydrate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    pub enum_name: String,
    pub case: String,
    pub label: Option<String>,
    pub translation_domain: Option<String>,
}

impl EnumValue {
    pub fn new(enum_name: impl Into<String>, case: impl Into<String>) -> Self {
        Self {
            enum_name: enum_name.into(),
            case: case.into(),
            label: None,
            translation_domain: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_translation_domain(mut self, domain: impl Into<String>) -> Self {
        self.translation_domain = Some(domain.into());
        self
    }

    /// Label if present, otherwise the raw case
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.case)
    }
}

impl LabeledValue for EnumValue {
    fn label(&self) -> &str {
        self.display_label()
    }

    fn translation_domain(&self) -> &str {
        self.translation_domain.as_deref().unwrap_or_default()
    }
}

/// One case of an enum definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumCase {
    pub value: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// Named enum declared in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDefinition {
    pub name: String,
    #[serde(default)]
    pub translation_domain: Option<String>,
    #[serde(default)]
    pub cases: Vec<EnumCase>,
}

/// Registry of enum definitions, constructed once and shared by `Arc`.
///
/// Data sources use it to turn raw column values into `Value::Enum`.
#[derive(Debug, Clone, Default)]
pub struct EnumRegistry {
    definitions: IndexMap<String, EnumDefinition>,
}

impl EnumRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_definitions(definitions: impl IntoIterator<Item = EnumDefinition>) -> Self {
        let mut registry = Self::new();
        for definition in definitions {
            registry.register(definition);
        }
        registry
    }

    pub fn register(&mut self, definition: EnumDefinition) {
        self.definitions.insert(definition.name.clone(), definition);
    }

    pub fn get(&self, name: &str) -> Option<&EnumDefinition> {
        self.definitions.get(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Convert a raw value into a case of `enum_name`.
    ///
    /// Unknown enums, unknown cases and NULL pass through unchanged.
    pub fn hydrate(&self, enum_name: &str, raw: &Value) -> Value {
        let Some(definition) = self.definitions.get(enum_name) else {
            tracing::trace!(enum_name = %enum_name, "enum not registered, keeping raw value");
            return raw.clone();
        };

        let key = match raw {
            Value::Null | Value::Enum(_) => return raw.clone(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        match definition.cases.iter().find(|c| c.value == key) {
            Some(case) => Value::Enum(EnumValue {
                enum_name: definition.name.clone(),
                case: case.value.clone(),
                label: case.label.clone(),
                translation_domain: definition.translation_domain.clone(),
            }),
            None => raw.clone(),
        }
    }
}
