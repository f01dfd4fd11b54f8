//! Parser for `info` output
//!
//! The output is one `key: value` record per line. The format is loose, so
//! anything that is not a record is skipped instead of rejected.

use indexmap::IndexMap;

/// Parse `info` output into an ordered map.
///
/// Each line is split on its first `:` only, so values may contain colons
/// (`execution_root: C:/x` keeps `C:/x`). Lines without a colon are ignored.
/// Keys and values are trimmed. A repeated key takes the last value but keeps
/// the position of its first occurrence.
pub fn parse_info_output(text: &str) -> IndexMap<String, String> {
    let mut entries = IndexMap::new();

    for line in text.split('\n') {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        entries.insert(key.trim().to_string(), value.trim().to_string());
    }

    entries
}
