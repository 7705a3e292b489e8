use std::fmt::Write as _;

use crate::error::ReportError;
use crate::journey::{AUTH_FAILURE, FAILED_JOURNEY, JOURNEY_DURATION, SUCCESSFUL_JOURNEY, Stage};
use crate::metrics::{
    CHECKS, DROPPED_ITERATIONS, HTTP_REQ_DURATION, HTTP_REQ_FAILED, HTTP_REQS, ITERATIONS,
};

use super::summary::RunReport;

fn write_line(output: &mut String, line: &str) -> Result<(), ReportError> {
    writeln!(output, "{line}").map_err(|source| ReportError::WriteLine { source })
}

/// Plain-text end-of-run summary for the terminal.
///
/// # Errors
///
/// Returns `ReportError::WriteLine` if formatting into the buffer fails.
pub fn render_text(report: &RunReport) -> Result<String, ReportError> {
    let mut out = String::new();
    write_line(&mut out, &format!("=== {} ===", report.title))?;
    write_line(
        &mut out,
        &format!(
            "Workload: {} | Thresholds: {} | Max VUs: {}",
            report.workload_profile, report.threshold_profile, report.vus_max
        ),
    )?;
    write_line(
        &mut out,
        &format!(
            "Duration: {}.{:03}s",
            report.duration_ms / 1000,
            report.duration_ms % 1000
        ),
    )?;
    write_line(
        &mut out,
        &format!(
            "Iterations: {} (dropped {})",
            report.counter(ITERATIONS),
            report.counter(DROPPED_ITERATIONS)
        ),
    )?;
    write_line(
        &mut out,
        &format!(
            "Journeys: {} ok, {} failed, {} auth failures",
            report.counter(SUCCESSFUL_JOURNEY),
            report.counter(FAILED_JOURNEY),
            report.counter(AUTH_FAILURE)
        ),
    )?;
    write_line(
        &mut out,
        &format!("Requests: {}", report.counter(HTTP_REQS)),
    )?;
    for name in [HTTP_REQ_FAILED, CHECKS] {
        if let Some(rate) = report.rates.get(name) {
            write_line(
                &mut out,
                &format!(
                    "{name}: {} ({} passes, {} fails)",
                    rate.rate, rate.passes, rate.fails
                ),
            )?;
        }
    }

    for name in [JOURNEY_DURATION, HTTP_REQ_DURATION] {
        if let Some(trend) = report.trend(name) {
            write_line(
                &mut out,
                &format!(
                    "{name}: avg={}ms min={}ms med={}ms p90={}ms p95={}ms p99={}ms max={}ms",
                    trend.avg, trend.min, trend.med, trend.p90, trend.p95, trend.p99, trend.max
                ),
            )?;
        }
    }

    let failing_stages: Vec<String> = Stage::ALL
        .iter()
        .filter_map(|stage| {
            let count = report.counter(stage.failure_counter());
            (count > 0).then(|| format!("{}={count}", stage.as_str()))
        })
        .collect();
    if !failing_stages.is_empty() {
        write_line(
            &mut out,
            &format!("Stage failures: {}", failing_stages.join(", ")),
        )?;
    }

    if !report.thresholds.is_empty() {
        write_line(&mut out, "Thresholds:")?;
        for outcome in &report.thresholds {
            let mark = if outcome.passed { "PASS" } else { "FAIL" };
            write_line(
                &mut out,
                &format!(
                    "  [{mark}] {} {} (observed {})",
                    outcome.metric,
                    outcome.expression,
                    outcome.observed.as_deref().unwrap_or("n/a")
                ),
            )?;
        }
    }
    if let Some(abort) = &report.aborted_by {
        write_line(
            &mut out,
            &format!("Aborted early by {} {}", abort.metric, abort.expression),
        )?;
    }
    write_line(
        &mut out,
        if report.passed {
            "Result: PASSED"
        } else {
            "Result: FAILED"
        },
    )?;
    Ok(out)
}
