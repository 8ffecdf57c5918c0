//! CSV and JSON export. CSV is write-only: there is no CSV import path.

use std::fs;
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, WriterBuilder};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::model::Item;
use crate::store::write_atomic;
use crate::time;

/// Fixed CSV column order. Reordering would break downstream spreadsheets.
pub const CSV_HEADER: [&str; 10] = [
    "title",
    "url",
    "price",
    "priority",
    "category",
    "targetDate",
    "notes",
    "purchased",
    "attributes",
    "imageUrl",
];

/// Render the whole collection as CSV. Every field is quoted and internal
/// quotes are doubled; newlines inside notes are flattened to spaces;
/// `purchased` renders as `"1"`/`"0"`; attributes are embedded as one
/// JSON-encoded field.
pub fn csv_string(items: &[Item]) -> AppResult<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for item in items {
        let attributes = serde_json::to_string(&item.attributes)?;
        writer.write_record([
            item.title.as_str(),
            item.url.as_str(),
            item.price.as_str(),
            item.priority.as_str(),
            item.category.as_str(),
            item.target_date.as_str(),
            item.notes.replace('\n', " ").as_str(),
            if item.purchased { "1" } else { "0" },
            attributes.as_str(),
            item.image_url.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| AppError::new("CSV/FLUSH", err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| AppError::new("CSV/ENCODING", err.to_string()))
}

/// Render the whole collection as pretty-printed JSON, verbatim.
pub fn json_string(items: &[Item]) -> AppResult<String> {
    serde_json::to_string_pretty(items).map_err(AppError::from)
}

/// Write `liste_achats_<ISO-date>.csv` under `out_dir`, atomically.
pub fn write_csv(items: &[Item], out_dir: &Path) -> AppResult<PathBuf> {
    let payload = csv_string(items)?;
    write_export_file(out_dir, "csv", payload.as_bytes(), items.len())
}

/// Write `liste_achats_<ISO-date>.json` under `out_dir`, atomically.
pub fn write_json(items: &[Item], out_dir: &Path) -> AppResult<PathBuf> {
    let payload = json_string(items)?;
    write_export_file(out_dir, "json", payload.as_bytes(), items.len())
}

fn write_export_file(
    out_dir: &Path,
    extension: &str,
    payload: &[u8],
    items: usize,
) -> AppResult<PathBuf> {
    fs::create_dir_all(out_dir).map_err(|err| {
        AppError::from(err)
            .with_context("operation", "create_out_dir")
            .with_context("path", out_dir.display().to_string())
    })?;

    let path = out_dir.join(format!("liste_achats_{}.{extension}", time::today_iso()));
    write_atomic(&path, payload).map_err(|err| {
        err.with_context("operation", "write_export")
            .with_context("path", path.display().to_string())
    })?;

    info!(
        target: "liste_achats",
        event = "export_written",
        format = extension,
        items,
        path = %path.display(),
    );
    Ok(path)
}
