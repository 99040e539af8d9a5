//! CSV quote loader.
//!
//! Reads `<name>.csv` exports of daily stock quotes and maps each row into a
//! fixed record schema. The files come from third-party exports: headers and
//! values may be double-quoted, the change column carries a trailing `%`, and
//! some files start with a UTF-8 BOM.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, bail};
use serde::Serialize;

/// One daily quote row. Serializes under the historical field names the API
/// has always exposed.
#[derive(Debug, Clone, Serialize)]
pub struct StockPrice {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    /// Kept as a string: exports use suffixed values like "1.2M"
    #[serde(rename = "Volume")]
    pub volume: String,
    #[serde(rename = "ChangePercent")]
    pub change_percent: f64,
}

fn strip_quotes(s: &str) -> &str {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

fn get_value<'a>(row: &'a HashMap<String, String>, key: &str) -> anyhow::Result<&'a str> {
    row.get(key)
        .map(|v| strip_quotes(v))
        .with_context(|| format!("Missing key in row: {}", key))
}

fn parse_number(raw: &str, key: &str) -> anyhow::Result<f64> {
    raw.replace(',', "")
        .parse()
        .with_context(|| format!("Invalid numeric value for {}: {}", key, raw))
}

fn map_row(row: &HashMap<String, String>) -> anyhow::Result<StockPrice> {
    let change = get_value(row, "Change %")?;
    let change = change.strip_suffix('%').unwrap_or(change);

    Ok(StockPrice {
        date: get_value(row, "Date")?.to_string(),
        price: parse_number(get_value(row, "Price")?, "Price")?,
        open: parse_number(get_value(row, "Open")?, "Open")?,
        high: parse_number(get_value(row, "High")?, "High")?,
        low: parse_number(get_value(row, "Low")?, "Low")?,
        volume: get_value(row, "Vol.")?.to_string(),
        change_percent: parse_number(change, "Change %")?,
    })
}

/// Loads and parses a full CSV quote file. Any IO failure, missing column,
/// or unparseable cell fails the whole load.
pub fn load_quotes(path: &Path) -> anyhow::Result<Vec<StockPrice>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;

    // Skip the BOM if present
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

    let mut lines = content.lines();
    let header_line = match lines.next() {
        Some(line) => line,
        None => bail!("Empty CSV file: {}", path.display()),
    };

    let headers: Vec<String> = header_line
        .split(',')
        .map(|h| strip_quotes(h.trim()).to_string())
        .collect();

    let mut data = Vec::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }

        let mut row = HashMap::new();
        for (i, cell) in line.split(',').enumerate() {
            if let Some(header) = headers.get(i) {
                row.insert(header.clone(), cell.to_string());
            }
        }

        data.push(map_row(&row)?);
    }

    Ok(data)
}
