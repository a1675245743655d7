//! Common test utilities for brokkr-extensions
//!
//! Builds throwaway extension source trees on disk.

#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// Temporary source tree for composing extensions
pub struct SourceTree {
    _temp: TempDir,
    root: Utf8PathBuf,
}

impl SourceTree {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("temp dir is UTF-8");
        Self { _temp: temp, root }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn path(&self, rel: &str) -> Utf8PathBuf {
        self.root.join(rel)
    }

    /// Write a file, creating parent directories
    pub fn write(&self, rel: &str, content: &str) -> Utf8PathBuf {
        let path = self.root.join(rel);
        std::fs::create_dir_all(path.parent().expect("file has a parent"))
            .expect("Failed to create directories");
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Write a manifest listing `scripts` and a matching `<name>;` script for each
    pub fn extension(&self, source_dir: &str, default_schema: Option<&str>, scripts: &[&str]) -> Utf8PathBuf {
        for script in scripts {
            self.write(
                &format!("{}/{}", source_dir, script),
                &format!("select '{}';\n", script),
            );
        }
        let manifest = serde_json::json!({
            "defaultSchema": default_schema,
            "databaseScripts": scripts,
        });
        self.write(&format!("{}/manifest.js", source_dir), &manifest.to_string())
    }
}

/// Load notice the compiler emits ahead of each file
pub fn notice(file_name: &str) -> String {
    format!(
        "do $$ BEGIN RAISE NOTICE 'Loading file {}'; END $$ language plpgsql;\n",
        file_name
    )
}

/// Statements of a generated SQL text, one per non-empty line
pub fn statements(sql: &str) -> Vec<&str> {
    sql.lines().map(str::trim).filter(|l| !l.is_empty()).collect()
}
