//! MetaSQL statements
//!
//! Files open with a fixed header:
//!
//! ```text
//! -- Group: inventoryHistory
//! -- Name:  detail
//! -- Notes: used by dspInventoryHistory
//! --        continuation notes
//! SELECT ...
//! ```

use brokkr_core::{Error, Result};
use camino::Utf8Path;

use super::{dollar_quoted, quoted};

const GROUP_PREFIX: &str = "-- Group:";
const NAME_PREFIX: &str = "-- Name:";
const NOTES_PREFIX: &str = "-- Notes:";

pub(super) fn convert(text: &str, path: &Utf8Path, default_schema: Option<&str>) -> Result<String> {
    let lines: Vec<&str> = text.lines().collect();

    let header = |index: usize, prefix: &str| -> Result<String> {
        lines
            .get(index)
            .and_then(|line| line.strip_prefix(prefix))
            .map(|rest| rest.trim().to_string())
            .ok_or_else(|| {
                Error::transform_failed(
                    path.as_str(),
                    format!("improperly formatted metasql, line {} must start with '{}'", index + 1, prefix),
                )
            })
    };

    let group = header(0, GROUP_PREFIX)?;
    let name = header(1, NAME_PREFIX)?;
    let mut notes = vec![header(2, NOTES_PREFIX)?];
    notes.extend(
        lines
            .iter()
            .skip(3)
            .take_while(|line| line.starts_with("--"))
            .map(|line| line.trim_start_matches('-').trim().to_string()),
    );

    let schema = default_schema.map(quoted).unwrap_or_else(|| "NULL".to_string());

    Ok(format!(
        "select saveMetasql({}, {}, {}, {}, true, {}, 0);",
        quoted(&group),
        quoted(&name),
        dollar_quoted(notes.join("\n").trim()),
        dollar_quoted(text.trim()),
        schema,
    ))
}
