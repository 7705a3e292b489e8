use std::collections::HashMap;

use super::UserPoolFile;

pub const DEFAULT_PREFIX: &str = "k6-perf-user";
pub const DEFAULT_DOMAIN: &str = "example.com";

/// How pool emails are formed: `<prefix>-<n>@<domain>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPoolSettings {
    pub prefix: String,
    pub domain: String,
}

impl Default for UserPoolSettings {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_owned(),
            domain: DEFAULT_DOMAIN.to_owned(),
        }
    }
}

impl UserPoolSettings {
    #[must_use]
    pub fn email_for(&self, vu: u64) -> String {
        format!("{}-{}@{}", self.prefix, vu, self.domain)
    }
}

/// A virtual user: one concurrent actor, bound to one pool identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualUser {
    pub id: u64,
    pub email: String,
    pub user_id: Option<String>,
}

/// Maps VU numbers to pool identities, with stub user ids when a pool file was read.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    settings: UserPoolSettings,
    user_ids: HashMap<String, String>,
}

impl UserDirectory {
    #[must_use]
    pub fn new(settings: UserPoolSettings, pool: Option<&UserPoolFile>) -> Self {
        let user_ids = pool
            .map(|file| {
                file.users
                    .iter()
                    .filter_map(|user| {
                        user.user_id
                            .as_ref()
                            .map(|id| (user.email.clone(), id.clone()))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { settings, user_ids }
    }

    #[must_use]
    pub fn user(&self, vu: u64) -> VirtualUser {
        let email = self.settings.email_for(vu);
        let user_id = self.user_ids.get(&email).cloned();
        VirtualUser {
            id: vu,
            email,
            user_id,
        }
    }
}
