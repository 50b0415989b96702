//! CSV export of body-composition history.

use crate::{BodyComposition, Error, Result};
use std::path::Path;
use tempfile::NamedTempFile;

const HEADER: [&str; 9] = [
    "date", "weight", "waist", "neck", "height", "bmi", "body_fat", "sex", "notes",
];

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    date: String,
    weight: f64,
    waist: f64,
    neck: f64,
    height: f64,
    bmi: String,
    body_fat: String,
    sex: &'static str,
    notes: String,
}

impl From<&BodyComposition> for CsvRow {
    fn from(entry: &BodyComposition) -> Self {
        CsvRow {
            date: entry.date().format("%Y-%m-%d").to_string(),
            weight: entry.weight(),
            waist: entry.waist(),
            neck: entry.neck(),
            height: entry.height(),
            bmi: format!("{:.1}", entry.bmi()),
            body_fat: format!("{:.1}", entry.body_fat_percentage()),
            sex: if entry.sex().is_male() { "male" } else { "female" },
            notes: entry.notes().to_string(),
        }
    }
}

/// Write `entries` to `path` as CSV, replacing any existing file
///
/// Rows are written in the order given. Returns the number of rows.
pub fn export_body_composition_csv(entries: &[BodyComposition], path: &Path) -> Result<usize> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(temp.as_file());
        writer.write_record(HEADER)?;
        for entry in entries {
            writer.serialize(CsvRow::from(entry))?;
        }
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::info!("Exported {} body composition rows to {:?}", entries.len(), path);
    Ok(entries.len())
}
