//! End-of-run reporting: `summary.json`, `index.html` and the terminal summary.
mod html;
mod summary;
mod text;


use std::path::{Path, PathBuf};

use crate::error::ReportError;

pub use html::render_html;
pub use summary::{
    RateSummary, ReportContext, RunReport, TrendSummary, WorkloadRow, build_report, format_x100,
};
pub use text::render_text;

pub const SUMMARY_FILE: &str = "summary.json";
pub const HTML_FILE: &str = "index.html";

/// Writes `summary.json` and `index.html` into `dir`, creating it if needed,
/// and returns the paths written.
///
/// # Errors
///
/// Returns an error if the directory cannot be created, the summary cannot
/// be serialized, or either file cannot be written.
pub fn write_reports(report: &RunReport, dir: &Path) -> Result<Vec<PathBuf>, ReportError> {
    std::fs::create_dir_all(dir).map_err(|source| ReportError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let json = serde_json::to_string_pretty(report)
        .map_err(|source| ReportError::SerializeSummary { source })?;
    let summary_path = dir.join(SUMMARY_FILE);
    write_file(&summary_path, &json)?;

    let html = render_html(report)?;
    let html_path = dir.join(HTML_FILE);
    write_file(&html_path, &html)?;

    tracing::info!(
        "Reports written to {} and {}",
        summary_path.display(),
        html_path.display()
    );
    Ok(vec![summary_path, html_path])
}

/// Prints the text summary to stdout.
///
/// # Errors
///
/// Returns `ReportError::WriteLine` if the summary cannot be formatted.
pub fn print_summary(report: &RunReport) -> Result<(), ReportError> {
    let text = render_text(report)?;
    print!("{text}");
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<(), ReportError> {
    std::fs::write(path, contents).map_err(|source| ReportError::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}
