use std::time::Duration;

use tracing::info;

use crate::config::RunSettings;
use crate::data::NotificationReference;
use crate::error::{AppError, AppResult, PoolError};
use crate::http::Transport;
use crate::identity::{
    CleanupSummary, PoolSettings, RetryPolicy, StubAdminClient, UserPoolFile, cleanup_pool,
    create_pool,
};

/// Pause between stub calls for consecutive users.
pub(crate) const POOL_PAUSE: Duration = Duration::from_millis(100);

fn admin_client(
    settings: &RunSettings,
    transport: Box<dyn Transport>,
    retry: RetryPolicy,
) -> StubAdminClient {
    StubAdminClient::new(transport, &settings.stub_base(), retry)
}

/// Registers one stub user per VU and writes the pool file.
///
/// # Errors
///
/// Returns an error when the pool file cannot be written or any user could
/// not be registered.
pub(crate) async fn run_pool_create(
    settings: &RunSettings,
    transport: Box<dyn Transport>,
    retry: RetryPolicy,
    pause: Duration,
) -> AppResult<UserPoolFile> {
    let client = admin_client(settings, transport, retry);
    let pool_settings = PoolSettings {
        users: settings.users.clone(),
        vus_max: settings.vus_max,
        path: settings.pool_file.clone(),
        pause,
    };
    create_pool(&client, &pool_settings)
        .await
        .map_err(AppError::pool::<PoolError>)
}

/// Expires every pooled user. Never fails; problems are logged.
pub(crate) async fn run_pool_cleanup(
    settings: &RunSettings,
    transport: Box<dyn Transport>,
    retry: RetryPolicy,
    pause: Duration,
) -> CleanupSummary {
    let client = admin_client(settings, transport, retry);
    cleanup_pool(&client, &settings.pool_file, pause).await
}

/// Prints `<notification id> -> <CHED reference>`.
///
/// # Errors
///
/// Returns an error when the id is not a `CDP.YYYY.MM.DD.N` reference.
pub(crate) fn print_ched_reference(notification_id: &str) -> AppResult<String> {
    let reference = NotificationReference::parse(notification_id.trim())?;
    let ched = reference.to_ched_reference()?;
    info!("{} -> {}", reference.as_str(), ched);
    println!("{}", ched);
    Ok(ched)
}
