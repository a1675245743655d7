//! Manifest document types
//!
//! A manifest lists the database scripts of one extension in the order they
//! must be applied:
//!
//! ```json
//! {
//!   "name": "inventory",
//!   "defaultSchema": "xtmfg",
//!   "databaseScripts": [
//!     "create_tables.sql",
//!     ["functions/itemcost.sql", "functions/itemprice.sql"],
//!     "views/inventory_history.sql"
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use super::descriptor::{DependencyList, ExtensionDescriptor, DEFAULT_LOAD_ORDER};

/// One `databaseScripts` entry: a relative path or a nested list of entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptEntry {
    Path(String),
    Group(Vec<ScriptEntry>),
}

impl ScriptEntry {
    fn flatten_into(&self, out: &mut Vec<String>) {
        match self {
            Self::Path(path) => out.push(path.clone()),
            Self::Group(entries) => {
                for entry in entries {
                    entry.flatten_into(out);
                }
            }
        }
    }
}

impl From<&str> for ScriptEntry {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

/// Parsed manifest file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_order: Option<i64>,

    #[serde(default)]
    pub dependencies: DependencyList,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_schema: Option<String>,

    #[serde(default)]
    pub database_scripts: Vec<ScriptEntry>,
}

impl Manifest {
    /// Flatten `databaseScripts` into one ordered list of relative paths
    pub fn flattened_scripts(&self) -> Vec<String> {
        let mut scripts = Vec::new();
        for entry in &self.database_scripts {
            entry.flatten_into(&mut scripts);
        }
        scripts
    }

    /// Treat the manifest as an extension descriptor, when it names one
    pub fn descriptor(&self) -> Option<ExtensionDescriptor> {
        let name = self.name.clone()?;
        Some(ExtensionDescriptor {
            name,
            description: self
                .description
                .clone()
                .or_else(|| self.comment.clone())
                .unwrap_or_default(),
            location: String::new(),
            load_order: self.load_order.unwrap_or(DEFAULT_LOAD_ORDER),
            dependencies: self.dependencies.clone().into_vec(),
        })
    }
}
