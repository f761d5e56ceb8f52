//! Output formatting helpers for the `workflow` CLI.

use std::io::{self, Write};

use serde::Serialize;

/// Print `value` as pretty JSON to stdout.
pub fn output_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            // Ignore broken pipe errors (e.g., piped to `head`)
            let _ = writeln!(io::stdout().lock(), "{json}");
        }
        Err(e) => {
            eprintln!("Error: failed to serialize JSON: {e}");
            std::process::exit(1);
        }
    }
}

/// Print `label: value` lines with the values aligned.
pub fn output_fields<L: AsRef<str>>(fields: &[(L, String)]) {
    let width = fields
        .iter()
        .map(|(label, _)| label.as_ref().len())
        .max()
        .unwrap_or(0);
    let mut handle = io::stdout().lock();
    for (label, value) in fields {
        let label = format!("{}:", label.as_ref());
        let _ = writeln!(handle, "{label:<width$}  {value}", width = width + 1);
    }
}

/// Join a list for display, showing `-` when it is empty.
pub fn display_list(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}
