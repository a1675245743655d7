//! Report definitions (OpenRPT XML)

use brokkr_core::{Error, Result};
use camino::Utf8Path;
use regex::Regex;
use std::sync::LazyLock;

use super::{dollar_quoted, package_table, upsert_sql};

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<name>(.*?)</name>").expect("name regex is valid"));
static DESCRIPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<description>(.*?)</description>").expect("description regex is valid")
});
static GRADE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<grade>\s*(\d+)\s*</grade>").expect("grade regex is valid"));

fn capture<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
}

pub(super) fn convert(text: &str, path: &Utf8Path, default_schema: Option<&str>) -> Result<String> {
    let name = capture(&NAME_RE, text)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| Error::transform_failed(path.as_str(), "report has no <name>"))?;
    let description = capture(&DESCRIPTION_RE, text).unwrap_or_default();
    let grade = capture(&GRADE_RE, text).unwrap_or("0");
    let table = package_table(default_schema, "pkgreport", "report");

    Ok(upsert_sql(
        &table,
        &[
            ("report_name", dollar_quoted(name)),
            ("report_grade", grade.to_string()),
        ],
        &[
            ("report_descrip", dollar_quoted(description)),
            ("report_source", dollar_quoted(text)),
            ("report_loaddate", "now()".to_string()),
        ],
    ))
}
