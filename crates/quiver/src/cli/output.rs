//! Terminal output: tables, JSON, and the sink that collects panel frames.

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use quiver_protocol::Asset;
use quiver_sync::{StatusKind, StatusMessage, ViewSink, ViewUpdate};
use serde::Serialize;

/// Human-readable byte count, e.g. `1.5 MB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// Upload time as `YYYY-MM-DD HH:MM` when parseable, else the raw text.
pub fn format_uploaded(asset: &Asset) -> String {
    match asset.uploaded_at() {
        Some(at) => at.format("%Y-%m-%d %H:%M").to_string(),
        None => asset.upload_date.clone().unwrap_or_else(|| "-".to_string()),
    }
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| Cell::new(h).fg(Color::Cyan)));
    for row in rows {
        table.add_row(row);
    }
    println!("{}", table);
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to encode JSON output")?;
    println!("{}", json);
    Ok(())
}

pub fn print_json_error(err: &anyhow::Error) {
    let body = serde_json::json!({ "error": format!("{:#}", err) });
    println!("{}", body);
}

/// Keeps the latest frame for printing once the command is done. Status
/// messages go to stderr as they appear.
#[derive(Debug, Default)]
pub struct CliSink {
    latest: Option<ViewUpdate>,
    shown_status: Option<StatusMessage>,
    frames: usize,
}

impl CliSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<&ViewUpdate> {
        self.latest.as_ref()
    }

    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl ViewSink for CliSink {
    fn render(&mut self, update: &ViewUpdate) {
        if update.status != self.shown_status {
            if let Some(status) = &update.status {
                let label = match status.kind {
                    StatusKind::Info => "Note",
                    StatusKind::Error => "Warning",
                };
                eprintln!("{}: {}", label, status.text);
            }
            self.shown_status = update.status.clone();
        }
        self.latest = Some(update.clone());
        self.frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiver_sync::{FolderCounts, FolderSelector};
    use quiver_test_utils::asset;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1_572_864), "1.5 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn test_format_uploaded() {
        let mut a = asset("a", None);
        a.upload_date = Some("2024-05-01T08:30:00Z".to_string());
        assert_eq!(format_uploaded(&a), "2024-05-01 08:30");
        a.upload_date = Some("last week".to_string());
        assert_eq!(format_uploaded(&a), "last week");
        a.upload_date = None;
        assert_eq!(format_uploaded(&a), "-");
    }

    #[test]
    fn test_sink_keeps_latest_frame() {
        let mut sink = CliSink::new();
        let mut update = ViewUpdate {
            displayed: vec![asset("a", None)],
            selected_folder: FolderSelector::All,
            search_query: String::new(),
            has_more: false,
            total_matching: 1,
            counts: FolderCounts::default(),
            status: Some(StatusMessage::error("offline")),
        };
        sink.render(&update);
        update.status = None;
        sink.render(&update);

        assert_eq!(sink.frames(), 2);
        assert!(sink.latest().unwrap().status.is_none());
        assert_eq!(sink.latest().unwrap().displayed.len(), 1);
    }
}
