//! Report generation for scan results.
//!
//! Renders the ranked screener table in three formats:
//! - Markdown (for terminals and docs)
//! - HTML (self-contained daily report page)
//! - JSON (for programmatic use)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::data::PriceSeries;
use crate::screener::{ScanResult, ScreenResult};

// ============================================================================
// Report Format
// ============================================================================

/// Supported report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    /// Markdown format (human-readable)
    Markdown,
    /// Self-contained HTML page
    Html,
    /// JSON format (machine-readable)
    Json,
}

impl ReportFormat {
    fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Html => "html",
            Self::Json => "json",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Markdown => write!(f, "markdown"),
            Self::Html => write!(f, "html"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "html" => Ok(Self::Html),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown report format: {}", s)),
        }
    }
}

// ============================================================================
// Index Overview
// ============================================================================

/// Latest state of one reference index, for the report overview section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSnapshot {
    /// Display name (e.g., "NIFTY 50")
    pub name: String,
    /// Index symbol (e.g., "^NSEI")
    pub ticker: String,
    /// Latest close
    pub close: f64,
    /// Change over the last bar (%)
    pub change_pct: f64,
}

impl IndexSnapshot {
    /// Build a snapshot from an index series; `None` when the series is too
    /// short to show a change.
    pub fn from_series(name: &str, series: &PriceSeries) -> Option<Self> {
        let n = series.len();
        if n < 2 {
            return None;
        }
        let last = series.bars[n - 1].close;
        let prev = series.bars[n - 2].close;

        Some(Self {
            name: name.to_string(),
            ticker: series.ticker.clone(),
            close: last,
            change_pct: (last - prev) / prev * 100.0,
        })
    }
}

// ============================================================================
// Research Report
// ============================================================================

/// Report generator for a completed scan.
pub struct ResearchReport {
    scan: ScanResult,
    indices: Vec<IndexSnapshot>,
    top_n: usize,
}

impl ResearchReport {
    /// Create a report from a scan result.
    pub fn new(scan: ScanResult, indices: Vec<IndexSnapshot>, top_n: usize) -> Self {
        Self {
            scan,
            indices,
            top_n,
        }
    }

    /// Generate the report in the given format.
    pub fn generate(&self, format: ReportFormat) -> String {
        match format {
            ReportFormat::Markdown => self.to_markdown(),
            ReportFormat::Html => self.to_html(),
            ReportFormat::Json => self.to_json(),
        }
    }

    /// Save the report to a file, appending the format extension when the
    /// path has none. Parent directories are created as needed.
    pub fn save_to_file(&self, path: &Path, format: ReportFormat) -> Result<PathBuf> {
        let file_path = if path.extension().is_none() {
            path.with_extension(format.extension())
        } else {
            path.to_path_buf()
        };

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create report directory")?;
        }
        std::fs::write(&file_path, self.generate(format)).context("Failed to write report file")?;

        Ok(file_path)
    }

    /// Get the underlying scan result.
    pub fn scan(&self) -> &ScanResult {
        &self.scan
    }

    // ========================================================================
    // Markdown
    // ========================================================================

    /// Generate a markdown report.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        let date = self.scan.completed_at.format("%Y-%m-%d");

        md.push_str(&format!(
            "# Daily Market Report - {}\n\n**Scan**: {}\n**Duration**: {:.1}s\n\n",
            date, self.scan.id, self.scan.duration_secs
        ));

        md.push_str("## Summary\n\n");
        md.push_str(&format!(
            "- **Requested**: {} tickers\n- **Screened**: {} tickers\n\n",
            self.scan.total_requested, self.scan.total_screened
        ));

        if !self.indices.is_empty() {
            md.push_str("## Index Overview\n\n");
            md.push_str("| Index | Close | Change |\n|---|---|---|\n");
            for idx in &self.indices {
                md.push_str(&format!(
                    "| {} | {} | {:+.2}% |\n",
                    idx.name,
                    fmt_num(idx.close),
                    idx.change_pct
                ));
            }
            md.push('\n');
        }

        md.push_str(&format!("## Top Picks ({})\n\n", self.top_n));
        md.push_str(
            "| Ticker | Close | RSI_14 | MACD_HIST | SMA_50 | SMA_200 | Vol Spike | Signals | Score |\n",
        );
        md.push_str("|---|---|---|---|---|---|---|---|---|\n");
        for row in self.scan.top(self.top_n) {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} | {} | {:.0} |\n",
                row.ticker,
                fmt_num(row.close),
                fmt_num(row.rsi_14),
                fmt_num(row.macd_hist),
                fmt_num(row.sma_50),
                fmt_num(row.sma_200),
                row.vol_spike,
                if row.signals.is_empty() { "-" } else { &row.signals },
                row.score
            ));
        }
        md.push('\n');

        md.push_str("*Signals are heuristic and educational. Do your own due diligence.*\n");
        md
    }

    // ========================================================================
    // HTML
    // ========================================================================

    /// Generate a self-contained HTML report page.
    pub fn to_html(&self) -> String {
        let date = self.scan.completed_at.format("%Y-%m-%d");
        let mut html = String::new();

        html.push_str(&format!(
            r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Daily Market Report - {date}</title>
  <style>
    body {{ font-family: Arial, sans-serif; margin: 24px; }}
    h1 {{ margin-bottom: 0; }}
    .subtitle {{ color: #555; margin-top: 4px; }}
    table {{ border-collapse: collapse; width: 100%; margin: 16px 0; }}
    th, td {{ border: 1px solid #ccc; padding: 8px; text-align: left; font-size: 14px; }}
    th {{ background: #f3f3f3; }}
    .note {{ color: #666; font-size: 12px; }}
  </style>
</head>
<body>
  <h1>Daily Market Report</h1>
  <div class="subtitle">{date}</div>
"#
        ));

        if !self.indices.is_empty() {
            html.push_str("\n  <h2>Index Overview</h2>\n  <table>\n");
            html.push_str("    <tr><th>Index</th><th>Close</th><th>Change</th></tr>\n");
            for idx in &self.indices {
                html.push_str(&format!(
                    "    <tr><td>{}</td><td>{}</td><td>{:+.2}%</td></tr>\n",
                    escape_html(&idx.name),
                    fmt_num(idx.close),
                    idx.change_pct
                ));
            }
            html.push_str("  </table>\n");
        }

        html.push_str(&format!("\n  <h2>Top Picks ({})</h2>\n  <table>\n", self.top_n));
        html.push_str(
            "    <tr><th>Ticker</th><th>Close</th><th>RSI_14</th><th>MACD_HIST</th>\
<th>SMA_50</th><th>SMA_200</th><th>Vol Spike</th><th>Signals</th><th>Score</th></tr>\n",
        );
        for row in self.scan.top(self.top_n) {
            html.push_str(&render_html_row(row));
        }
        html.push_str("  </table>\n");

        html.push_str(
            "\n  <div class=\"note\">Signals are heuristic and educational. \
Do your own due diligence.</div>\n</body>\n</html>\n",
        );
        html
    }

    // ========================================================================
    // JSON
    // ========================================================================

    /// Generate a JSON report of the full scan.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.scan).unwrap_or_else(|_| "{}".to_string())
    }
}

fn render_html_row(row: &ScreenResult) -> String {
    format!(
        "    <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
<td>{}</td><td>{}</td><td>{}</td><td>{:.0}</td></tr>\n",
        escape_html(&row.ticker),
        fmt_num(row.close),
        fmt_num(row.rsi_14),
        fmt_num(row.macd_hist),
        fmt_num(row.sma_50),
        fmt_num(row.sma_200),
        row.vol_spike,
        escape_html(if row.signals.is_empty() { "-" } else { &row.signals }),
        row.score
    )
}

/// Format a display number; NaN (field absent from the source row) renders
/// as a dash.
fn fmt_num(v: f64) -> String {
    if v.is_nan() {
        "-".to_string()
    } else {
        format!("{:.2}", v)
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

// ============================================================================
// Tests
// ============================================================================
