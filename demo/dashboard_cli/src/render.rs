//! Plain-text output for the terminal

use datadash_core::api::{Dataset, UserProfile};
use datadash_core::format::{format_file_size, format_upload_datetime};
use datadash_core::views::{
    ColumnStats, Confirm, DatasetDetail, DatasetRow, ListViewModel, PreviewTable,
};
use std::io::{self, BufRead, Write};

/// Asks on stderr and reads the answer from stdin; anything but y/yes declines
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        eprint!("{prompt} [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

/// Upload progress on a single, rewritten stderr line
pub fn progress(pct: u8) {
    eprint!("\rUploading... {pct:>3}%");
    if pct >= 100 {
        eprintln!();
    }
    let _ = io::stderr().flush();
}

pub fn list(model: &ListViewModel) {
    match model {
        ListViewModel::Loading => println!("Loading datasets..."),
        ListViewModel::Failed { message } => {
            println!("{message}");
            println!("Run `dashboard_cli list --refresh` to try again.");
        }
        ListViewModel::Empty { filtered: true } => {
            println!("No datasets match your search or filter.")
        }
        ListViewModel::Empty { filtered: false } => {
            println!("No datasets yet. Upload a CSV or Excel file to get started.")
        }
        ListViewModel::Rows { rows, summary } => {
            println!(
                "{:>6}  {:<32} {:<6} {:>11} {:>9} {:>5}  {:<10} {}",
                "ID", "NAME", "TYPE", "SIZE", "ROWS", "COLS", "STATUS", "UPLOADED"
            );
            for row in rows {
                println!("{}", row_line(row));
            }
            println!();
            println!(
                "{} datasets, {} rows, {} ({} processing, {} completed, {} failed)",
                summary.datasets,
                summary.total_rows,
                format_file_size(summary.total_bytes),
                summary.processing,
                summary.completed,
                summary.failed
            );
        }
    }
}

fn row_line(row: &DatasetRow) -> String {
    format!(
        "{:>6}  {:<32} {:<6} {:>11} {:>9} {:>5}  {:<10} {}",
        row.id,
        truncate(&row.name, 32),
        row.file_type,
        row.size,
        row.rows,
        row.columns,
        row.status.as_str(),
        row.uploaded
    )
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let head: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{head}...")
}

pub fn dataset_header(d: &Dataset) {
    println!("{} (#{})", d.name, d.id);
    println!(
        "  {} · {} · {} rows · {} columns · {}",
        d.file_type,
        format_file_size(d.file_size),
        d.total_rows,
        d.total_columns,
        d.status
    );
    println!("  Uploaded {}", format_upload_datetime(d.uploaded_at));
}

pub fn detail(detail: &DatasetDetail) {
    dataset_header(&detail.dataset);

    println!();
    println!("Columns");
    for stats in detail.columns.iter().map(ColumnStats::from) {
        print!(
            "  {:<24} {:<8} unique {:>6}  nulls {:>6}",
            truncate(&stats.name, 24),
            stats.data_type,
            stats.unique_values,
            stats.null_count
        );
        if let Some([mean, median, std_dev, min, max]) = &stats.numeric {
            print!("  mean {mean} median {median} sd {std_dev} min {min} max {max}");
        }
        println!();
    }

    let table = PreviewTable::from_rows(&detail.preview);
    println!();
    if table.rows.is_empty() {
        println!("No preview rows.");
        return;
    }
    println!("Preview ({} rows)", table.rows.len());
    println!("  {}", table.headers.join(" | "));
    for row in &table.rows {
        println!("  {}", row.join(" | "));
    }
}

pub fn profile(p: &UserProfile) {
    println!("{}", p.name);
    if let Some(email) = &p.email {
        println!("  Email: {email}");
    }
    if let Some(provider) = &p.provider {
        println!("  Sign-in provider: {provider}");
    }
    if let Some(prefs) = &p.dataset_prefs {
        println!(
            "  Datasets: auto-delete {} after {} days, max upload {} MB, default chart {}",
            on_off(prefs.auto_delete),
            prefs.auto_delete_days,
            prefs.max_file_size,
            prefs.default_chart_type
        );
    }
    if let Some(n) = &p.notification_prefs {
        println!(
            "  Notifications: upload complete {}, upload failed {}, weekly report {}, storage warning {}",
            on_off(n.upload_complete),
            on_off(n.upload_failed),
            on_off(n.weekly_report),
            on_off(n.storage_warning)
        );
    }
}

fn on_off(b: bool) -> &'static str {
    if b {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_long_names() {
        assert_eq!(truncate("short.csv", 32), "short.csv");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
    }
}
