//! Helpers for editing untyped TOML documents with dotted keys.

use toml::{Table, Value};

use crate::error::{ConfigError, Result};

/// Remove `key` from `table` and return it as a table.
///
/// A missing key or a non-table value yields an empty table; the caller
/// re-inserts the (possibly modified) result.
pub(crate) fn take_table(table: &mut Table, key: &str) -> Table {
    match table.remove(key) {
        Some(Value::Table(inner)) => inner,
        _ => Table::new(),
    }
}

/// Borrow `table[key]` as a table, if it is one.
pub(crate) fn get_table<'a>(table: &'a Table, key: &str) -> Option<&'a Table> {
    table.get(key).and_then(Value::as_table)
}

/// Split a dotted key (`jira.service_address`) into its segments.
pub(crate) fn split_key(key: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = key.split('.').map(str::trim).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(ConfigError::invalid_key(key, "empty key segment"));
    }
    Ok(segments)
}

/// Look up a dotted key.
pub(crate) fn get_path<'a>(table: &'a Table, key: &str) -> Option<&'a Value> {
    let segments = split_key(key).ok()?;
    let (last, parents) = segments.split_last()?;
    let mut current = table;
    for segment in parents {
        current = get_table(current, segment)?;
    }
    current.get(*last)
}

/// Set a dotted key, creating intermediate tables.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidKey`] if a segment is empty or an
/// intermediate segment already holds a non-table value.
pub(crate) fn set_path(table: &mut Table, key: &str, value: Value) -> Result<()> {
    let segments = split_key(key)?;
    set_segments(table, key, &segments, value)
}

fn set_segments(table: &mut Table, key: &str, segments: &[&str], value: Value) -> Result<()> {
    match segments {
        [] => Err(ConfigError::invalid_key(key, "empty key")),
        [last] => {
            table.insert((*last).to_string(), value);
            Ok(())
        }
        [first, rest @ ..] => {
            let mut child = match table.remove(*first) {
                Some(Value::Table(inner)) => inner,
                None => Table::new(),
                Some(other) => {
                    table.insert((*first).to_string(), other);
                    return Err(ConfigError::invalid_key(
                        key,
                        format!("'{first}' is not a section"),
                    ));
                }
            };
            let result = set_segments(&mut child, key, rest, value);
            table.insert((*first).to_string(), Value::Table(child));
            result
        }
    }
}
