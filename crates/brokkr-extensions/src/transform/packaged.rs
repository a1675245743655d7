//! UI forms and UI scripts, both stored by file stem

use brokkr_core::{Error, Result};
use camino::Utf8Path;

use super::{dollar_quoted, package_table, quoted, upsert_sql};

fn stem(path: &Utf8Path) -> Result<&str> {
    path.file_stem()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::transform_failed(path.as_str(), "file has no name"))
}

pub(super) fn convert_uiform(
    text: &str,
    path: &Utf8Path,
    default_schema: Option<&str>,
) -> Result<String> {
    let name = stem(path)?;
    let table = package_table(default_schema, "pkguiform", "uiform");

    Ok(upsert_sql(
        &table,
        &[("uiform_name", quoted(name))],
        &[
            ("uiform_order", "0".to_string()),
            ("uiform_enabled", "true".to_string()),
            ("uiform_source", dollar_quoted(text)),
            ("uiform_notes", quoted("")),
        ],
    ))
}

pub(super) fn convert_uiscript(
    text: &str,
    path: &Utf8Path,
    default_schema: Option<&str>,
) -> Result<String> {
    let name = stem(path)?;
    let table = package_table(default_schema, "pkgscript", "script");

    Ok(upsert_sql(
        &table,
        &[("script_name", quoted(name))],
        &[
            ("script_order", "0".to_string()),
            ("script_enabled", "true".to_string()),
            ("script_source", dollar_quoted(text)),
            ("script_notes", quoted("")),
        ],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uiform_uses_stem_and_package_table() {
        let sql = convert_uiform(
            "<ui version=\"4.0\"/>",
            Utf8Path::new("/ext/client/uiforms/itemSite.ui"),
            Some("xtmfg"),
        )
        .unwrap();

        assert!(sql.starts_with("insert into xtmfg.pkguiform (uiform_name, "));
        assert!(sql.contains("where uiform_name = 'itemSite'"));
        assert!(sql.contains("$$<ui version=\"4.0\"/>$$"));
        assert!(sql.trim_end().ends_with(';'));
    }

    #[test]
    fn test_uiscript_without_schema() {
        let sql = convert_uiscript(
            "include(\"globalErrorLog\");",
            Utf8Path::new("scripts/salesOrder.js"),
            None,
        )
        .unwrap();

        assert!(sql.starts_with("insert into script (script_name, "));
        assert!(sql.contains("update script set script_order = 0"));
        assert!(sql.contains("where script_name = 'salesOrder'"));
    }
}
