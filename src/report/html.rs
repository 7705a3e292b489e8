use std::fmt::Write as _;

use crate::error::ReportError;
use crate::journey::{JOURNEY_DURATION, Stage};
use crate::metrics::HTTP_REQ_DURATION;

use super::summary::RunReport;

const STYLE: &str = "body{font-family:sans-serif;margin:2rem;color:#0b0c0c}\
table{border-collapse:collapse;margin-bottom:2rem;min-width:32rem}\
th,td{border:1px solid #b1b4b6;padding:.4rem .8rem;text-align:left}\
th{background:#f3f2f1}.pass{color:#00703c;font-weight:bold}\
.fail{color:#d4351c;font-weight:bold}.cards{display:flex;gap:1rem;margin-bottom:2rem}\
.card{border:1px solid #b1b4b6;padding:1rem;min-width:10rem}";

fn write_line(output: &mut String, line: &str) -> Result<(), ReportError> {
    writeln!(output, "{line}").map_err(|source| ReportError::WriteLine { source })
}

/// Renders the standalone HTML report.
///
/// # Errors
///
/// Returns `ReportError::WriteLine` if formatting into the buffer fails.
pub fn render_html(report: &RunReport) -> Result<String, ReportError> {
    let mut out = String::new();
    write_line(&mut out, "<!DOCTYPE html>")?;
    write_line(&mut out, "<html lang=\"en\">")?;
    write_line(&mut out, "<head>")?;
    write_line(&mut out, "<meta charset=\"utf-8\">")?;
    write_line(&mut out, &format!("<title>{}</title>", escape(&report.title)))?;
    write_line(&mut out, &format!("<style>{STYLE}</style>"))?;
    write_line(&mut out, "</head>")?;
    write_line(&mut out, "<body>")?;
    write_line(&mut out, &format!("<h1>{}</h1>", escape(&report.title)))?;
    write_line(
        &mut out,
        &format!(
            "<p>Generated {} &middot; started {} &middot; ran for {}.{:03}s</p>",
            escape(&report.generated_at),
            escape(&report.started_at),
            report.duration_ms / 1000,
            report.duration_ms % 1000
        ),
    )?;

    cards(&mut out, report)?;
    workload_table(&mut out, report)?;
    journey_table(&mut out, report)?;
    threshold_table(&mut out, report)?;
    stage_failure_table(&mut out, report)?;
    counter_table(&mut out, report)?;

    write_line(&mut out, "</body>")?;
    write_line(&mut out, "</html>")?;
    Ok(out)
}

fn cards(out: &mut String, report: &RunReport) -> Result<(), ReportError> {
    let requests = report.counter(crate::metrics::HTTP_REQS);
    let error_rate = report
        .rates
        .get(crate::metrics::HTTP_REQ_FAILED)
        .map_or_else(|| "0.0000".to_owned(), |rate| rate.rate.clone());
    let verdict = if report.passed {
        "<span class=\"pass\">PASSED</span>"
    } else {
        "<span class=\"fail\">FAILED</span>"
    };

    write_line(out, "<div class=\"cards\">")?;
    write_line(
        out,
        &format!("<div class=\"card\"><h3>Max VUs</h3><p>{}</p></div>", report.vus_max),
    )?;
    write_line(
        out,
        &format!("<div class=\"card\"><h3>Total requests</h3><p>{requests}</p></div>"),
    )?;
    write_line(
        out,
        &format!(
            "<div class=\"card\"><h3>Error rate</h3><p>{}</p></div>",
            escape(&error_rate)
        ),
    )?;
    write_line(
        out,
        &format!("<div class=\"card\"><h3>Thresholds</h3><p>{verdict}</p></div>"),
    )?;
    write_line(out, "</div>")?;

    if let Some(abort) = &report.aborted_by {
        write_line(
            out,
            &format!(
                "<p class=\"fail\">Run aborted early: {} {}</p>",
                escape(&abort.metric),
                escape(&abort.expression)
            ),
        )?;
    }
    Ok(())
}

fn workload_table(out: &mut String, report: &RunReport) -> Result<(), ReportError> {
    write_line(out, "<h2>Workload</h2>")?;
    write_line(out, "<table>")?;
    write_line(out, "<tr><th>Setting</th><th>Value</th></tr>")?;
    write_line(
        out,
        &format!(
            "<tr><td>workload profile</td><td>{}</td></tr>",
            escape(&report.workload_profile)
        ),
    )?;
    write_line(
        out,
        &format!(
            "<tr><td>threshold profile</td><td>{}</td></tr>",
            escape(&report.threshold_profile)
        ),
    )?;
    for row in &report.workload {
        write_line(
            out,
            &format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                escape(&row.name),
                escape(&row.value)
            ),
        )?;
    }
    write_line(out, "</table>")
}

fn journey_table(out: &mut String, report: &RunReport) -> Result<(), ReportError> {
    write_line(out, "<h2>Journey metrics</h2>")?;
    write_line(out, "<table>")?;
    write_line(
        out,
        "<tr><th>Metric</th><th>Count</th><th>Avg (ms)</th><th>p95 (ms)</th><th>p99 (ms)</th><th>Max (ms)</th></tr>",
    )?;

    let names = std::iter::once(JOURNEY_DURATION)
        .chain(Stage::ALL.iter().map(|stage| stage.duration_metric()))
        .chain(std::iter::once(HTTP_REQ_DURATION));
    for name in names {
        let row = report.trend(name).map_or_else(
            || format!("<tr><td>{name}</td><td>0</td><td>-</td><td>-</td><td>-</td><td>-</td></tr>"),
            |trend| {
                format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    name, trend.count, trend.avg, trend.p95, trend.p99, trend.max
                )
            },
        );
        write_line(out, &row)?;
    }
    write_line(out, "</table>")
}

fn threshold_table(out: &mut String, report: &RunReport) -> Result<(), ReportError> {
    write_line(out, "<h2>Thresholds</h2>")?;
    if report.thresholds.is_empty() {
        return write_line(out, "<p>No thresholds configured.</p>");
    }
    write_line(out, "<table>")?;
    write_line(
        out,
        "<tr><th>Metric</th><th>Expression</th><th>Observed</th><th>Result</th></tr>",
    )?;
    for outcome in &report.thresholds {
        let observed = outcome.observed.as_deref().unwrap_or("n/a");
        let result = if outcome.passed {
            "<td class=\"pass\">PASS</td>"
        } else {
            "<td class=\"fail\">FAIL</td>"
        };
        write_line(
            out,
            &format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td>{}</tr>",
                escape(&outcome.metric),
                escape(&outcome.expression),
                escape(observed),
                result
            ),
        )?;
    }
    write_line(out, "</table>")
}

fn stage_failure_table(out: &mut String, report: &RunReport) -> Result<(), ReportError> {
    write_line(out, "<h2>Page failures</h2>")?;
    write_line(out, "<table>")?;
    write_line(out, "<tr><th>Stage</th><th>Failures</th></tr>")?;
    for stage in Stage::ALL {
        write_line(
            out,
            &format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                stage.as_str(),
                report.counter(stage.failure_counter())
            ),
        )?;
    }
    write_line(out, "</table>")
}

fn counter_table(out: &mut String, report: &RunReport) -> Result<(), ReportError> {
    write_line(out, "<h2>Counters</h2>")?;
    write_line(out, "<table>")?;
    write_line(out, "<tr><th>Counter</th><th>Value</th></tr>")?;
    for (name, value) in &report.counters {
        write_line(
            out,
            &format!("<tr><td>{}</td><td>{value}</td></tr>", escape(name)),
        )?;
    }
    for (name, rate) in &report.rates {
        write_line(
            out,
            &format!(
                "<tr><td>{} (rate)</td><td>{} ({} passes, {} fails)</td></tr>",
                escape(name),
                escape(&rate.rate),
                rate.passes,
                rate.fails
            ),
        )?;
    }
    write_line(out, "</table>")
}

pub(super) fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
