use std::path::PathBuf;

use reqwest::Url;

use crate::args::TradePerfArgs;
use crate::data::{DraftOptions, commodity_by_code};
use crate::error::{AppError, AppResult, ConfigError, ValidationError};
use crate::http::ClientSettings;
use crate::identity::UserPoolSettings;
use crate::journey::ThinkTime;
use crate::runner::{ManualOverrides, WorkloadPlan, WorkloadProfile};
use crate::thresholds::{
    ManualThresholds, ThresholdProfile, ThresholdRule, ThresholdSet, manual_thresholds,
    profile_thresholds,
};

use super::types::ConfigFile;

/// Fully resolved inputs for one invocation. Built once from CLI, environment
/// and config file, then handed to the constructors that need it.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub target_url: Url,
    pub stub_url: Url,
    pub users: UserPoolSettings,
    pub pool_file: PathBuf,
    pub workload_profile: WorkloadProfile,
    pub threshold_profile: ThresholdProfile,
    pub manual_thresholds: Option<ManualThresholds>,
    pub plan: WorkloadPlan,
    pub vus_max: u64,
    pub thresholds: ThresholdSet,
    pub think_time: Option<ThinkTime>,
    pub draft: DraftOptions,
    pub client: ClientSettings,
    pub report_dir: Option<PathBuf>,
}

impl RunSettings {
    /// # Errors
    ///
    /// Returns an error for an unknown commodity code or a malformed
    /// threshold expression.
    pub fn resolve(args: &TradePerfArgs, config: Option<&ConfigFile>) -> AppResult<Self> {
        let overrides = ManualOverrides {
            vus_max: args.vus_max,
            ramp_up: args.ramp_up,
            hold: args.hold,
            ramp_down: args.ramp_down,
        };
        let plan = WorkloadPlan::resolve(args.workload, &overrides);
        let vus_max = plan.vus_max(args.vus_max);

        let manual = manual_limits(args);
        let mut thresholds = manual.as_ref().map_or_else(
            || profile_thresholds(args.threshold, vus_max),
            |limits| manual_thresholds(limits, vus_max),
        )?;
        if let Some(custom) = config.and_then(|file| file.thresholds.as_ref()) {
            for (metric, entries) in custom {
                let mut rules = Vec::with_capacity(entries.len());
                for entry in entries {
                    let rule =
                        ThresholdRule::parse(metric, entry.expression(), entry.abort_on_fail())
                            .map_err(|source| {
                                AppError::config(ConfigError::InvalidThreshold {
                                    metric: metric.clone(),
                                    source,
                                })
                            })?;
                    rules.push(rule);
                }
                thresholds.replace_metric(metric, rules);
            }
        }

        let commodity = args
            .commodity
            .as_deref()
            .map(|code| {
                commodity_by_code(code.trim()).ok_or_else(|| {
                    AppError::validation(ValidationError::UnknownCommodity {
                        code: code.to_owned(),
                    })
                })
            })
            .transpose()?;

        Ok(Self {
            target_url: args.target_url.clone(),
            stub_url: args.stub_url.clone(),
            users: UserPoolSettings {
                prefix: args.user_prefix.clone(),
                domain: args.user_domain.clone(),
            },
            pool_file: PathBuf::from(&args.pool_file),
            workload_profile: args.workload,
            threshold_profile: args.threshold,
            manual_thresholds: manual,
            plan,
            vus_max,
            thresholds,
            think_time: args.think_time,
            draft: DraftOptions {
                weighted_countries: args.weighted_countries,
                commodity,
            },
            client: ClientSettings {
                request_timeout: args.request_timeout,
                ..ClientSettings::default()
            },
            report_dir: (!args.no_report).then(|| PathBuf::from(&args.report_dir)),
        })
    }

    /// Name shown for the threshold set in reports.
    #[must_use]
    pub const fn threshold_label(&self) -> &'static str {
        if self.manual_thresholds.is_some() {
            "manual"
        } else {
            self.threshold_profile.as_str()
        }
    }

    /// Identity stub base without a trailing slash, as the login links use it.
    #[must_use]
    pub fn stub_base(&self) -> String {
        self.stub_url.as_str().trim_end_matches('/').to_owned()
    }
}

/// Manual limits apply when any of the three is set; unset ones take the
/// defaults (p95 3000ms, p99 5000ms, error rate 0.01).
fn manual_limits(args: &TradePerfArgs) -> Option<ManualThresholds> {
    if args.threshold_p95_ms.is_none()
        && args.threshold_p99_ms.is_none()
        && args.threshold_error_rate.is_none()
    {
        return None;
    }
    let defaults = ManualThresholds::default();
    Some(ManualThresholds {
        p95_ms: args.threshold_p95_ms.unwrap_or(defaults.p95_ms),
        p99_ms: args.threshold_p99_ms.unwrap_or(defaults.p99_ms),
        error_rate: args.threshold_error_rate.unwrap_or(defaults.error_rate),
    })
}
