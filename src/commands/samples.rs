use anyhow::{Context, Result};

use crate::models::LocationSample;

/// Parse a JSON-lines track: one location sample per line, blank lines and
/// lines starting with `#` skipped.
pub fn parse_samples(input: &str) -> Result<Vec<LocationSample>> {
    input
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(number, line)| {
            serde_json::from_str::<LocationSample>(line)
                .with_context(|| format!("Invalid location sample on line {}", number))
        })
        .collect()
}
