use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::api::types::AnomalyRecord;

/// Default name offered in the save dialog.
pub const EXPORT_FILE_NAME: &str = "anomalies.csv";

/// Render flagged records as comma-separated text: a header built from the
/// keys of the first record, then one line per record. Fields are written
/// verbatim (no quoting) and there is no trailing newline.
pub fn anomalies_csv(records: &[AnomalyRecord]) -> Result<String> {
    let Some(first) = records.first() else {
        return Ok(String::new());
    };

    let mut out = Vec::new();
    write_line(&mut out, first.keys().cloned().collect())?;
    for record in records {
        write_line(&mut out, record.values().map(field_text).collect())?;
    }

    if out.last() == Some(&b'\n') {
        out.pop();
    }
    Ok(String::from_utf8(out)?)
}

/// csv quotes a line whose only field is empty; such lines are left blank.
fn write_line(out: &mut Vec<u8>, fields: Vec<String>) -> Result<()> {
    if fields.len() <= 1 && fields.iter().all(String::is_empty) {
        out.push(b'\n');
        return Ok(());
    }

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out);
    writer.write_record(&fields)?;
    writer.flush().context("flushing CSV line")?;
    Ok(())
}

/// Write [`anomalies_csv`] output to `path`.
pub fn save_anomalies_csv(path: &Path, records: &[AnomalyRecord]) -> Result<()> {
    let text = anomalies_csv(records)?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Exported {} anomalies to {}", records.len(), path.display());
    Ok(())
}

fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
