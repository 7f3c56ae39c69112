//! Command handlers for ingest, list and show

use anyhow::{Context, Result, anyhow};
use colored::Colorize;
use kdam::Animation;
use log::{info, warn};
use std::path::Path;

use crate::engine::progress::{
    ProgressBarConfig, create_progress_bar, finish_progress_bar, set_bar_total, update_progress_bar,
};
use crate::engine::tools::{canonicalize_existing, path_to_db_string};
use crate::pipeline::{IngestEvent, spawn_ingestion};
use crate::{CatalogStore, KindCounts, MediaKind, MediaRecord, Opts, SortColumn, SortOrder};

/// Ingest `dir` on a worker thread with a progress bar. Ctrl+C requests a cooperative stop; files
/// already ingested stay in the catalog.
pub fn handle_ingest(dir: &Path, opts: &Opts) -> Result<()> {
    let handle = spawn_ingestion(dir, opts.ingest.clone());
    let cancel = handle.cancel_flag();
    ctrlc::set_handler(move || {
        cancel.store(true, std::sync::atomic::Ordering::SeqCst);
    })
    .context("set Ctrl+C handler")?;

    let bar = create_progress_bar(ProgressBarConfig::new(0, "Ingesting", Animation::Classic));
    let mut bar_used = false;
    for event in handle.events().iter() {
        match event {
            IngestEvent::Progress(p) => {
                if !bar_used {
                    set_bar_total(&bar, p.total);
                    bar_used = true;
                }
                update_progress_bar(&bar, 1);
            }
            IngestEvent::Finished(_) | IngestEvent::Failed(_) => break,
        }
    }
    if bar_used {
        finish_progress_bar(&bar);
    }

    let outcome = handle.join()?;
    let counts: KindCounts = outcome.records.iter().collect();
    match counts.describe() {
        Some(summary) => info!("Loaded {}", summary),
        None => info!("No media files found in {}", dir.display()),
    }
    if outcome.cancelled {
        warn!(
            "Ingestion cancelled after {} of {} files; already ingested files were kept",
            outcome.records.len(),
            outcome.total
        );
    }
    Ok(())
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

fn print_table(records: &[MediaRecord]) {
    for r in records {
        let kind = match r.kind {
            MediaKind::Image => "image".green(),
            MediaKind::Video => "video".magenta(),
        };
        let captured = r
            .captured_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}  {:<16}  {:>10}  {:<9}  {}",
            kind,
            captured,
            format_size(r.file_size_bytes),
            r.resolution.as_deref().unwrap_or("-"),
            r.path
        );
    }
}

/// Print non-deleted records.
pub fn handle_list(
    opts: &Opts,
    sort: SortColumn,
    desc: bool,
    kind: Option<MediaKind>,
    json: bool,
) -> Result<()> {
    let store = CatalogStore::open(&opts.ingest.db_path())?;
    let order = if desc { SortOrder::Desc } else { SortOrder::Asc };
    let records = store.list_all(sort, order, kind)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }
    print_table(&records);
    let counts: KindCounts = records.iter().collect();
    if let Some(summary) = counts.describe() {
        info!("{}", summary);
    }
    Ok(())
}

fn opt_line(label: &str, value: Option<String>) {
    println!(
        "{:<14} {}",
        format!("{label}:").bold(),
        value.unwrap_or_else(|| "-".dimmed().to_string())
    );
}

/// Print one record. `path` is resolved the same way ingestion keys records.
pub fn handle_show(opts: &Opts, path: &Path, json: bool) -> Result<()> {
    let store = CatalogStore::open(&opts.ingest.db_path())?;
    let key = canonicalize_existing(path)
        .map(|p| path_to_db_string(&p))
        .unwrap_or_else(|| path_to_db_string(path));
    let record = store
        .get_by_path(&key)?
        .ok_or_else(|| anyhow!("not in catalog: {}", key))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }
    opt_line("path", Some(record.path.clone()));
    opt_line("kind", Some(record.kind.to_string()));
    opt_line("size", Some(format_size(record.file_size_bytes)));
    opt_line("resolution", record.resolution.clone());
    opt_line("duration", record.duration_label());
    opt_line("captured", record.captured_at.map(|t| t.to_string()));
    opt_line("modified", record.last_modified_at.map(|t| t.to_string()));
    opt_line("location", record.location.clone());
    opt_line("hash", record.content_hash.clone());
    opt_line("thumbnail", record.thumbnail_path.clone());
    opt_line("backup", Some(record.backup_status.clone()));
    if record.deleted {
        opt_line("deleted", Some("yes".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_are_human_readable() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KiB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MiB");
    }
}
