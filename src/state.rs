use std::sync::Arc;
use std::time::Instant;

use crate::auth::resolver::IdentityResolver;
use crate::config::Config;
use crate::policy::AccessPolicy;
use crate::rate_limit::LoginRateLimiter;
use crate::store::{SubmissionStore, UserDirectory};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub identity: IdentityResolver,
    pub policy: AccessPolicy,
    pub users: UserDirectory,
    pub submissions: SubmissionStore,
    pub login_limiter: LoginRateLimiter,
    pub started_at: Instant,
}
