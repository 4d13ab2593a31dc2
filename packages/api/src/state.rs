use std::sync::Arc;

use store::RecordStore;

use crate::auth::IdentityService;

/// Shared handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub identity: Arc<dyn IdentityService>,
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn RecordStore>,
        identity: Arc<dyn IdentityService>,
        auth: AuthConfig,
    ) -> Self {
        Self {
            store,
            identity,
            auth: Arc::new(auth),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Public client key that must never authenticate a request. Empty disables the check.
    pub anon_key: String,
}

impl AuthConfig {
    pub fn is_anonymous_key(&self, token: &str) -> bool {
        !self.anon_key.is_empty() && token == self.anon_key
    }
}
