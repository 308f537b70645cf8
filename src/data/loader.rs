use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value as JsonValue;

use super::model::Sample;

// ---------------------------------------------------------------------------
// Channel selection
// ---------------------------------------------------------------------------

/// Which columns of the source table carry the test channels.
///
/// Test rigs name their channels freely, so the caller resolves the pair
/// before loading. A `None` time channel means the table has no time column
/// and the row index is used instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSelection {
    pub time: Option<String>,
    pub displacement: String,
    pub force: String,
}

impl Default for ChannelSelection {
    fn default() -> Self {
        Self {
            time: Some("t".to_string()),
            displacement: "d".to_string(),
            force: "f".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load one case's raw sample sequence from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row naming the channels, one sample per record
/// * `.json` – `[{ "<t>": 0.0, "<d>": 0.0, "<f>": 0.0 }, ...]`
pub fn load_file(path: &Path, channels: &ChannelSelection) -> Result<Vec<Sample>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path, channels),
        "json" => load_json(path, channels),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path, channels: &ChannelSelection) -> Result<Vec<Sample>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let d_idx = headers
        .iter()
        .position(|h| h == &channels.displacement)
        .with_context(|| format!("CSV missing displacement column '{}'", channels.displacement))?;
    let f_idx = headers
        .iter()
        .position(|h| h == &channels.force)
        .with_context(|| format!("CSV missing force column '{}'", channels.force))?;
    let t_idx = match &channels.time {
        Some(name) => Some(
            headers
                .iter()
                .position(|h| h == name)
                .with_context(|| format!("CSV missing time column '{name}'"))?,
        ),
        None => None,
    };

    let mut samples = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let d = parse_cell(record.get(d_idx), row_no, &channels.displacement)?;
        let f = parse_cell(record.get(f_idx), row_no, &channels.force)?;
        let t = match t_idx {
            Some(i) => parse_cell(record.get(i), row_no, channels.time.as_deref().unwrap_or("t"))?,
            None => row_no as f64,
        };

        samples.push(Sample { t, d, f });
    }
    Ok(samples)
}

fn parse_cell(cell: Option<&str>, row: usize, col: &str) -> Result<f64> {
    let tok = cell.unwrap_or("").trim();
    tok.parse::<f64>()
        .with_context(|| format!("Row {row}, column '{col}': '{tok}' is not a number"))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   { "t": 0.0, "d": 0.0,  "f": 0.0 },
///   { "t": 0.1, "d": 0.52, "f": 9.8 }
/// ]
/// ```
///
/// with the keys taken from the channel selection.
fn load_json(path: &Path, channels: &ChannelSelection) -> Result<Vec<Sample>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut samples = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let d = json_number(obj.get(channels.displacement.as_str()), i, &channels.displacement)?;
        let f = json_number(obj.get(channels.force.as_str()), i, &channels.force)?;
        let t = match &channels.time {
            Some(name) => json_number(obj.get(name.as_str()), i, name)?,
            None => i as f64,
        };

        samples.push(Sample { t, d, f });
    }
    Ok(samples)
}

fn json_number(val: Option<&JsonValue>, row: usize, col: &str) -> Result<f64> {
    val.and_then(|v| v.as_f64())
        .with_context(|| format!("Row {row}: missing or non-numeric '{col}'"))
}
