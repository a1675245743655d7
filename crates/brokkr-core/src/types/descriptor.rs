//! Extension descriptor types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Load order assigned to extensions that do not declare one
pub const DEFAULT_LOAD_ORDER: i64 = 9999;

/// Declared dependencies of an extension
///
/// Accepts either a list of names or an npm-style object, in which case the
/// keys are the dependency names (sorted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencyList {
    List(Vec<String>),
    Map(BTreeMap<String, serde_json::Value>),
}

impl Default for DependencyList {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl DependencyList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::List(names) => names,
            Self::Map(map) => map.into_keys().collect(),
        }
    }
}

/// Extension identity and registration metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionDescriptor {
    /// Extension name (identity key)
    pub name: String,

    /// Human readable description
    pub description: String,

    /// Location the extension is registered under (e.g. `/private-extensions`)
    pub location: String,

    /// Load order, lower loads first
    pub load_order: i64,

    /// Names of extensions this one depends on, in declared order
    pub dependencies: Vec<String>,
}

impl ExtensionDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            location: String::new(),
            load_order: DEFAULT_LOAD_ORDER,
            dependencies: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_load_order(mut self, load_order: i64) -> Self {
        self.load_order = load_order;
        self
    }

    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }
}

/// On-disk shape of a descriptor file (`package.json`)
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescriptorFile {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    load_order: Option<i64>,
    #[serde(default)]
    dependencies: DependencyList,
}

impl<'de> Deserialize<'de> for ExtensionDescriptor {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let file = DescriptorFile::deserialize(deserializer)?;
        Ok(Self {
            name: file.name,
            description: file.description.or(file.comment).unwrap_or_default(),
            location: String::new(),
            load_order: file.load_order.unwrap_or(DEFAULT_LOAD_ORDER),
            dependencies: file.dependencies.into_vec(),
        })
    }
}
