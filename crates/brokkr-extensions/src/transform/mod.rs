//! Content transforms
//!
//! A transform turns the raw text of one script file into executable SQL.
//! Transforms are looked up by file extension:
//!
//! | Extension | Format | Output |
//! |-----------|--------|--------|
//! | `sql` | passthrough | unchanged text |
//! | `mql` | metadata-driven SQL | `saveMetasql(...)` call |
//! | `ui` | UI form | upsert into the form table |
//! | `xml` | report definition | upsert into the report table |
//! | `js` | UI script | upsert into the script table |
//!
//! Generated SQL embeds file content in dollar quotes without further
//! escaping. Only feed trusted source trees through these transforms.

mod metasql;
mod packaged;
mod report;

use brokkr_core::{Error, Result};
use camino::Utf8Path;
use std::collections::HashMap;
use std::sync::Arc;

/// Turns source text into SQL
pub trait ContentTransform: Send + Sync {
    /// Transform `text`, read from `path`, for the given default schema
    fn transform(&self, text: &str, path: &Utf8Path, default_schema: Option<&str>)
        -> Result<String>;
}

/// Built-in content formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentFormat {
    Passthrough,
    MetaSql,
    UiForm,
    Report,
    UiScript,
}

impl ContentFormat {
    /// Every built-in format with the file extension it handles
    pub const DEFAULTS: [(&'static str, ContentFormat); 5] = [
        ("sql", ContentFormat::Passthrough),
        ("mql", ContentFormat::MetaSql),
        ("ui", ContentFormat::UiForm),
        ("xml", ContentFormat::Report),
        ("js", ContentFormat::UiScript),
    ];

    /// Format for a file extension, if it is a built-in one
    pub fn from_extension(extension: &str) -> Option<Self> {
        Self::DEFAULTS
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|(_, format)| *format)
    }
}

impl ContentTransform for ContentFormat {
    fn transform(
        &self,
        text: &str,
        path: &Utf8Path,
        default_schema: Option<&str>,
    ) -> Result<String> {
        match self {
            Self::Passthrough => Ok(text.to_string()),
            Self::MetaSql => metasql::convert(text, path, default_schema),
            Self::UiForm => packaged::convert_uiform(text, path, default_schema),
            Self::Report => report::convert(text, path, default_schema),
            Self::UiScript => packaged::convert_uiscript(text, path, default_schema),
        }
    }
}

/// Transforms keyed by file extension
#[derive(Clone, Default)]
pub struct TransformRegistry {
    transforms: HashMap<String, Arc<dyn ContentTransform>>,
}

impl TransformRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in format registered
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (extension, format) in ContentFormat::DEFAULTS {
            registry.register(extension, Arc::new(format));
        }
        registry
    }

    /// Register (or replace) the transform for an extension
    pub fn register(&mut self, extension: impl Into<String>, transform: Arc<dyn ContentTransform>) {
        self.transforms.insert(extension.into(), transform);
    }

    /// Look up the transform for an extension
    pub fn get(&self, extension: &str) -> Option<&Arc<dyn ContentTransform>> {
        self.transforms.get(extension)
    }

    /// Transform a file's text with the transform registered for its extension
    pub fn apply(
        &self,
        text: &str,
        path: &Utf8Path,
        default_schema: Option<&str>,
    ) -> Result<String> {
        let extension = path.extension().unwrap_or_default();
        let transform = self
            .get(extension)
            .ok_or_else(|| Error::unsupported_format(path.as_str(), extension))?;
        transform.transform(text, path, default_schema)
    }
}

/// `insert ... where not exists` followed by an `update` for the same key
pub(crate) fn upsert_sql(
    table: &str,
    keys: &[(&str, String)],
    values: &[(&str, String)],
) -> String {
    let columns: Vec<&str> = keys.iter().chain(values).map(|(c, _)| *c).collect();
    let literals: Vec<&str> = keys.iter().chain(values).map(|(_, v)| v.as_str()).collect();
    let predicate = keys
        .iter()
        .map(|(c, v)| format!("{} = {}", c, v))
        .collect::<Vec<_>>()
        .join(" and ");
    let assignments = values
        .iter()
        .map(|(c, v)| format!("{} = {}", c, v))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "insert into {table} ({columns}) select {literals} where not exists \
         (select 1 from {table} where {predicate});\n\
         update {table} set {assignments} where {predicate};",
        table = table,
        columns = columns.join(", "),
        literals = literals.join(", "),
        predicate = predicate,
        assignments = assignments,
    )
}

/// Table name, qualified by the default schema when there is one
pub(crate) fn package_table(default_schema: Option<&str>, packaged: &str, unpackaged: &str) -> String {
    match default_schema {
        Some(schema) => format!("{}.{}", schema, packaged),
        None => unpackaged.to_string(),
    }
}

pub(crate) fn quoted(value: &str) -> String {
    format!("'{}'", value)
}

pub(crate) fn dollar_quoted(value: &str) -> String {
    format!("$${}$$", value)
}
