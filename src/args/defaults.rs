pub(crate) const DEFAULT_TARGET_URL: &str = "http://localhost:3000";
pub(crate) const DEFAULT_STUB_URL: &str = "http://localhost:3200";
pub(crate) const DEFAULT_REPORT_DIR: &str = "reports";
pub(crate) const DEFAULT_REQUEST_TIMEOUT: &str = "60s";
