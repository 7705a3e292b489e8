use std::fmt;

/// A timed section of the journey. Each has its own duration trend and
/// failure counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Authenticate,
    Home,
    Dashboard,
    Origin,
    Commodity,
    Purpose,
    Transport,
    Review,
    SaveDraft,
    ChangeFlow,
    Submit,
}

impl Stage {
    pub const ALL: [Stage; 11] = [
        Stage::Authenticate,
        Stage::Home,
        Stage::Dashboard,
        Stage::Origin,
        Stage::Commodity,
        Stage::Purpose,
        Stage::Transport,
        Stage::Review,
        Stage::SaveDraft,
        Stage::ChangeFlow,
        Stage::Submit,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Stage::Authenticate => "auth",
            Stage::Home => "home_page",
            Stage::Dashboard => "dashboard",
            Stage::Origin => "origin",
            Stage::Commodity => "commodity",
            Stage::Purpose => "purpose",
            Stage::Transport => "transport",
            Stage::Review => "review",
            Stage::SaveDraft => "save",
            Stage::ChangeFlow => "change_flow",
            Stage::Submit => "submit",
        }
    }

    #[must_use]
    pub const fn duration_metric(self) -> &'static str {
        match self {
            Stage::Authenticate => "auth_duration",
            Stage::Home => "home_page_duration",
            Stage::Dashboard => "dashboard_duration",
            Stage::Origin => "origin_step_duration",
            Stage::Commodity => "commodity_step_duration",
            Stage::Purpose => "purpose_step_duration",
            Stage::Transport => "transport_step_duration",
            Stage::Review => "review_step_duration",
            Stage::SaveDraft => "save_step_duration",
            Stage::ChangeFlow => "change_flow_duration",
            Stage::Submit => "submit_duration",
        }
    }

    #[must_use]
    pub const fn failure_counter(self) -> &'static str {
        match self {
            Stage::Authenticate => "auth_stage_failure",
            Stage::Home => "home_page_stage_failure",
            Stage::Dashboard => "dashboard_stage_failure",
            Stage::Origin => "origin_stage_failure",
            Stage::Commodity => "commodity_stage_failure",
            Stage::Purpose => "purpose_stage_failure",
            Stage::Transport => "transport_stage_failure",
            Stage::Review => "review_stage_failure",
            Stage::SaveDraft => "save_stage_failure",
            Stage::ChangeFlow => "change_flow_stage_failure",
            Stage::Submit => "submit_stage_failure",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
