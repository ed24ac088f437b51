use std::sync::Arc;

use ipnet::IpNet;

use crate::config::AppConfig;
use crate::middlewares::rate_limiter::RateLimiter;
use crate::services::RegistrationService;
use crate::store::RegistrantStore;

/// Shared per-process state handed to handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub registration: RegistrationService,
    pub store: Arc<dyn RegistrantStore>,
    pub rate_limiter: Arc<RateLimiter>,
    pub trusted_proxies: Arc<Vec<IpNet>>,
}

impl AppState {
    pub fn new(config: &AppConfig, store: Arc<dyn RegistrantStore>) -> Self {
        Self {
            registration: RegistrationService::new(store.clone(), config.uniqueness_scope()),
            store,
            rate_limiter: Arc::new(RateLimiter::new(config.rate_limit)),
            trusted_proxies: Arc::new(config.trusted_proxies.clone()),
        }
    }
}
