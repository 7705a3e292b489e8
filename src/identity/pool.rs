use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::PoolError;

use super::{StubAdminClient, UserPoolSettings};

pub const POOL_FILE: &str = "users-pool.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolUser {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolFailure {
    pub email: String,
    pub error: String,
}

/// Contents of `users-pool.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPoolFile {
    pub created_at: String,
    pub vus_max: u64,
    #[serde(default)]
    pub users: Vec<PoolUser>,
    #[serde(default)]
    pub errors: Vec<PoolFailure>,
}

#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub users: UserPoolSettings,
    pub vus_max: u64,
    pub path: PathBuf,
    /// Pause between users so the stub is not flooded.
    pub pause: Duration,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    pub expired: usize,
    pub failed: usize,
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Register `vus_max` users and write the pool file.
///
/// The file is written even when some registrations failed.
///
/// # Errors
///
/// Returns an error when the pool file cannot be written, or
/// `RegistrationsFailed` when any user could not be registered.
pub async fn create_pool(
    client: &StubAdminClient,
    settings: &PoolSettings,
) -> Result<UserPoolFile, PoolError> {
    info!("Creating user pool with {} users...", settings.vus_max);
    let mut pool = UserPoolFile {
        created_at: String::new(),
        vus_max: settings.vus_max,
        users: Vec::new(),
        errors: Vec::new(),
    };

    for vu in 1..=settings.vus_max {
        let email = settings.users.email_for(vu);
        info!("[{}/{}] Creating user: {}", vu, settings.vus_max, email);
        match client.register(&email, &format!("PerfUser{}", vu)).await {
            Ok(user_id) => {
                pool.users.push(PoolUser {
                    email,
                    user_id,
                    created_at: timestamp(),
                });
                tokio::time::sleep(settings.pause).await;
            }
            Err(err) => {
                error!("Failed to create user {}: {}", email, err);
                pool.errors.push(PoolFailure {
                    email,
                    error: err.to_string(),
                });
            }
        }
    }

    pool.created_at = timestamp();
    write_pool_file(&settings.path, &pool)?;
    info!("User pool saved to {}", settings.path.display());

    if !pool.errors.is_empty() {
        return Err(PoolError::RegistrationsFailed {
            count: pool.errors.len(),
        });
    }
    info!("Successfully created {} users", pool.users.len());
    Ok(pool)
}

/// Expire every user listed in the pool file, then remove it.
///
/// Best effort: a missing or unreadable file, users without an id and
/// failed expiries are logged and counted, never returned as errors.
pub async fn cleanup_pool(client: &StubAdminClient, path: &Path, pause: Duration) -> CleanupSummary {
    info!("Cleaning up user pool...");
    let users = match read_pool_file(path) {
        Ok(pool) => {
            info!("Found {} users in {}", pool.users.len(), path.display());
            pool.users
        }
        Err(err) => {
            warn!("Could not read {}: {}", path.display(), err);
            Vec::new()
        }
    };

    let mut summary = CleanupSummary::default();
    let total = users.len();
    for (index, user) in users.iter().enumerate() {
        info!(
            "[{}/{}] Expiring user: {}",
            index.saturating_add(1),
            total,
            user.email
        );
        let Some(user_id) = user.user_id.as_deref() else {
            warn!("  No userId found for {} - cannot expire", user.email);
            summary.failed = summary.failed.saturating_add(1);
            continue;
        };
        match client.expire(user_id).await {
            Ok(()) => {
                info!("  Expired {}", user.email);
                summary.expired = summary.expired.saturating_add(1);
            }
            Err(err) => {
                warn!("  Could not expire {}: {}", user.email, err);
                summary.failed = summary.failed.saturating_add(1);
            }
        }
        tokio::time::sleep(pause).await;
    }

    if path.exists() {
        match std::fs::remove_file(path) {
            Ok(()) => info!("Removed {}", path.display()),
            Err(err) => warn!("Could not remove {}: {}", path.display(), err),
        }
    }

    info!(
        "Cleanup complete: expired {}, failed {}",
        summary.expired, summary.failed
    );
    if summary.failed > 0 {
        warn!("Some users could not be expired. Manual cleanup may be required.");
    }
    summary
}

/// # Errors
///
/// Returns an error when the file cannot be read or is not a pool file.
pub fn read_pool_file(path: &Path) -> Result<UserPoolFile, PoolError> {
    let content = std::fs::read_to_string(path).map_err(|source| PoolError::ReadPoolFile {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| PoolError::ParsePoolFile {
        path: path.to_path_buf(),
        source,
    })
}

fn write_pool_file(path: &Path, pool: &UserPoolFile) -> Result<(), PoolError> {
    let content =
        serde_json::to_string_pretty(pool).map_err(|source| PoolError::SerializePool { source })?;
    std::fs::write(path, content).map_err(|source| PoolError::WritePoolFile {
        path: path.to_path_buf(),
        source,
    })
}
