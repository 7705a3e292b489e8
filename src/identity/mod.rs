//! Sign-in through the identity stub, and provisioning of the stub's user pool.
mod bootstrap;
mod pool;
mod stub_admin;
mod user;


pub use bootstrap::{IdentityBootstrap, find_login_link, resolve_login_url};
pub use pool::{
    CleanupSummary, POOL_FILE, PoolFailure, PoolSettings, PoolUser, UserPoolFile, cleanup_pool,
    create_pool, read_pool_file,
};
pub use stub_admin::{RetryPolicy, StubAdminClient};
pub use user::{DEFAULT_DOMAIN, DEFAULT_PREFIX, UserDirectory, UserPoolSettings, VirtualUser};
