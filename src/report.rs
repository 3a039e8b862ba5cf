//! Batch reports: structured rows first, text rendering second.
//!
//! [`StatsReport`] and [`ErrorReport`] are plain data built from
//! [`BatchResults`]. [`render_stats`] and [`render_errors`] turn them into
//! lines, optionally styled for a terminal, and [`log_stats`] /
//! [`log_errors`] send those lines to the logger.

use console::Style;
use tracing::{error, info};

use crate::process::BatchResults;

/// What happened to a successfully processed file, as shown in the report.
#[derive(Debug, Clone, PartialEq)]
pub enum RowStatus {
    /// The transformed file was not smaller; the original was kept.
    Skipped,
    /// The transformed bytes came from the cache.
    Cached,
    Resized { old_size: f64, size: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsRow {
    pub path: String,
    pub ratio: i64,
    pub status: RowStatus,
}

/// Overall savings across the batch, in KB.
#[derive(Debug, Clone, PartialEq)]
pub struct Savings {
    pub saved: f64,
    pub original: f64,
    pub percent: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsReport {
    pub rows: Vec<StatsRow>,
    /// Sum of original sizes over rows that were not skipped.
    pub total_original: f64,
    /// Sum of `old_size - size` over rows that were not skipped.
    pub total_saved: f64,
}

impl StatsReport {
    pub fn from_results(results: &BatchResults) -> Self {
        let mut report = StatsReport::default();
        for (path, record) in &results.successes {
            let status = if record.skip_write {
                RowStatus::Skipped
            } else if record.is_cached {
                RowStatus::Cached
            } else {
                RowStatus::Resized {
                    old_size: record.old_size,
                    size: record.size,
                }
            };
            if !record.skip_write {
                report.total_original += record.old_size;
                report.total_saved += record.old_size - record.size;
            }
            report.rows.push(StatsRow {
                path: path.clone(),
                ratio: record.ratio,
                status,
            });
        }
        report
    }

    /// Present only when something was actually saved.
    pub fn summary(&self) -> Option<Savings> {
        if self.total_saved <= 0.0 {
            return None;
        }
        Some(Savings {
            saved: self.total_saved,
            original: self.total_original,
            percent: (100.0 * self.total_saved / self.total_original).round() as i64,
        })
    }

    fn name_width(&self) -> usize {
        self.rows.iter().map(|r| r.path.chars().count()).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorRow {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorReport {
    pub rows: Vec<ErrorRow>,
}

impl ErrorReport {
    pub fn from_results(results: &BatchResults) -> Self {
        ErrorReport {
            rows: results
                .errors
                .iter()
                .map(|(path, message)| ErrorRow {
                    path: path.clone(),
                    message: message.clone(),
                })
                .collect(),
        }
    }

    /// Width of the longest path, used to line up the messages.
    pub fn name_width(&self) -> usize {
        self.rows.iter().map(|r| r.path.chars().count()).max().unwrap_or(0)
    }
}

/// Terminal styling for rendered reports.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub ansi_colors: bool,
}

impl RenderOptions {
    fn style(&self, style: Style) -> Style {
        if self.ansi_colors {
            style.force_styling(true)
        } else {
            Style::new()
        }
    }
}

pub const STATS_HEADER: &str = "optimized assets:";
pub const ERRORS_HEADER: &str = "failed to optimize assets:";

pub fn render_stats(report: &StatsReport, options: RenderOptions) -> Vec<String> {
    let width = report.name_width();
    let dim = options.style(Style::new().dim());
    let mut lines = Vec::with_capacity(report.rows.len() + 2);
    lines.push(STATS_HEADER.to_string());

    for row in &report.rows {
        let ratio_style = if row.ratio < 0 {
            options.style(Style::new().green())
        } else {
            options.style(Style::new().red())
        };
        let sign = if row.ratio > 0 { "+" } else { "" };
        let ratio = ratio_style.apply_to(format!("{sign}{}%", row.ratio));
        let status = match &row.status {
            RowStatus::Skipped => "skipped".to_string(),
            RowStatus::Cached => "cached".to_string(),
            RowStatus::Resized { old_size, size } => {
                format!("{old_size:.2} kB -> {size:.2} kB")
            }
        };
        lines.push(format!(
            "{}  {ratio}  {}",
            dim.apply_to(pad(&row.path, width)),
            dim.apply_to(status)
        ));
    }

    if let Some(savings) = report.summary() {
        lines.push(format!(
            "total savings = {:.2}kB/{:.2}kB ≈ {}%",
            savings.saved, savings.original, savings.percent
        ));
    }
    lines
}

pub fn render_errors(report: &ErrorReport, options: RenderOptions) -> Vec<String> {
    let width = report.name_width();
    let red = options.style(Style::new().red());
    let mut lines = Vec::with_capacity(report.rows.len() + 1);
    lines.push(ERRORS_HEADER.to_string());
    for row in &report.rows {
        lines.push(format!("{} {}", pad(&row.path, width), red.apply_to(&row.message)));
    }
    lines
}

/// Renders the success report and emits it at info level.
pub fn log_stats(results: &BatchResults, options: RenderOptions) -> StatsReport {
    let report = StatsReport::from_results(results);
    for line in render_stats(&report, options) {
        info!("{line}");
    }
    report
}

/// Renders the error report and emits it at error level.
pub fn log_errors(results: &BatchResults, options: RenderOptions) -> ErrorReport {
    let report = ErrorReport::from_results(results);
    for line in render_errors(&report, options) {
        error!("{line}");
    }
    report
}

fn pad(name: &str, width: usize) -> String {
    let len = name.chars().count();
    format!("{name}{}", " ".repeat(width.saturating_sub(len)))
}
