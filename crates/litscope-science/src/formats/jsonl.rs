use super::ExportRow;
use crate::error::Result;

/// One JSON object per line, every column present (absent values as `null`).
pub fn render(rows: &[ExportRow]) -> Result<String> {
    let mut out = String::new();
    for row in rows {
        out.push_str(&serde_json::to_string(row)?);
        out.push('\n');
    }
    Ok(out)
}
