use clap::{Args, Parser, Subcommand};
use reqwest::Url;
use std::time::Duration;

use crate::identity::{DEFAULT_DOMAIN, DEFAULT_PREFIX, POOL_FILE};
use crate::journey::ThinkTime;
use crate::runner::WorkloadProfile;
use crate::thresholds::ThresholdProfile;

use super::defaults::{
    DEFAULT_REPORT_DIR, DEFAULT_REQUEST_TIMEOUT, DEFAULT_STUB_URL, DEFAULT_TARGET_URL,
};
use super::parsers::{
    parse_base_url, parse_duration, parse_positive_u64, parse_rate, parse_think_time,
    parse_threshold_profile, parse_workload,
};

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the notification journey under the selected workload (default)
    Run,
    /// Manage the identity-stub user pool
    #[command(subcommand)]
    Pool(PoolCommand),
    /// Print the CHED reference for a notification id (e.g. CDP.2025.12.05.6)
    ChedReference(ChedReferenceArgs),
}

#[derive(Debug, Subcommand, Clone)]
pub enum PoolCommand {
    /// Register one user per VU with the identity stub and write the pool file
    Create,
    /// Expire every user listed in the pool file, then remove it
    Cleanup,
}

#[derive(Debug, Args, Clone)]
pub struct ChedReferenceArgs {
    /// Notification id in CDP.YYYY.MM.DD.N form
    pub notification_id: String,
}

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Load-testing harness for the trade import notification journey: virtual users authenticate through the identity stub, walk the multi-page notification flow and submit it, under smoke/load/stress/spike workloads with latency thresholds and HTML/JSON reports."
)]
pub struct TradePerfArgs {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Config file (TOML or JSON); defaults to trade-perf.toml or trade-perf.json when present
    #[arg(long, short = 'c')]
    pub config: Option<String>,

    /// Base URL of the application under test
    #[arg(
        long = "target-url",
        env = "TARGET_URL",
        default_value = DEFAULT_TARGET_URL,
        value_parser = parse_base_url
    )]
    pub target_url: Url,

    /// Base URL of the identity stub
    #[arg(
        long = "stub-url",
        env = "DEFRA_ID_STUB_URL",
        default_value = DEFAULT_STUB_URL,
        value_parser = parse_base_url
    )]
    pub stub_url: Url,

    /// Prefix of pool user emails (<prefix>-<vu>@<domain>)
    #[arg(long = "user-prefix", env = "USER_POOL_PREFIX", default_value = DEFAULT_PREFIX)]
    pub user_prefix: String,

    /// Domain of pool user emails
    #[arg(long = "user-domain", env = "USER_POOL_DOMAIN", default_value = DEFAULT_DOMAIN)]
    pub user_domain: String,

    /// Pool file written by `pool create` and read by runs and `pool cleanup`
    #[arg(long = "pool-file", default_value = POOL_FILE)]
    pub pool_file: String,

    /// Workload profile (smoke, load, stress, spike)
    #[arg(
        long,
        short = 'w',
        env = "K6_WORKLOAD",
        default_value = "smoke",
        value_parser = parse_workload
    )]
    pub workload: WorkloadProfile,

    /// Threshold profile (low, medium, high)
    #[arg(
        long,
        env = "K6_THRESHOLD",
        default_value = "low",
        value_parser = parse_threshold_profile
    )]
    pub threshold: ThresholdProfile,

    /// Peak virtual users; switches to a manual ramp
    #[arg(long = "vus-max", env = "VUS_MAX", value_parser = parse_positive_u64)]
    pub vus_max: Option<u64>,

    /// Manual ramp-up duration (supports ms/s/m/h)
    #[arg(long = "ramp-up", env = "RAMP_UP_DURATION", value_parser = parse_duration)]
    pub ramp_up: Option<Duration>,

    /// Manual hold duration (supports ms/s/m/h)
    #[arg(long = "hold", env = "HOLD_DURATION", value_parser = parse_duration)]
    pub hold: Option<Duration>,

    /// Manual ramp-down duration (supports ms/s/m/h)
    #[arg(long = "ramp-down", env = "RAMP_DOWN_DURATION", value_parser = parse_duration)]
    pub ramp_down: Option<Duration>,

    /// Manual p95 limit for http_req_duration in ms; replaces the threshold profile
    #[arg(long = "threshold-p95-ms", env = "THRESHOLD_P95_MS", value_parser = parse_positive_u64)]
    pub threshold_p95_ms: Option<u64>,

    /// Manual p99 limit for http_req_duration in ms; replaces the threshold profile
    #[arg(long = "threshold-p99-ms", env = "THRESHOLD_P99_MS", value_parser = parse_positive_u64)]
    pub threshold_p99_ms: Option<u64>,

    /// Manual http_req_failed rate limit (e.g. 0.01); replaces the threshold profile
    #[arg(long = "threshold-error-rate", env = "THRESHOLD_ERROR_RATE", value_parser = parse_rate)]
    pub threshold_error_rate: Option<u64>,

    /// Random pause between journey stages, e.g. 1s..3s
    #[arg(long = "think-time", value_parser = parse_think_time)]
    pub think_time: Option<ThinkTime>,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(
        long = "request-timeout",
        default_value = DEFAULT_REQUEST_TIMEOUT,
        value_parser = parse_duration
    )]
    pub request_timeout: Duration,

    /// Draw origin countries using trade-volume weights
    #[arg(long = "weighted-countries")]
    pub weighted_countries: bool,

    /// Always use this commodity code instead of drawing one (e.g. 0102)
    #[arg(long = "commodity")]
    pub commodity: Option<String>,

    /// Directory for summary.json and index.html
    #[arg(long = "report-dir", default_value = DEFAULT_REPORT_DIR)]
    pub report_dir: String,

    /// Skip writing report files (text summary is still printed)
    #[arg(long = "no-report")]
    pub no_report: bool,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable ANSI colours in log output
    #[arg(long = "no-color")]
    pub no_color: bool,
}
