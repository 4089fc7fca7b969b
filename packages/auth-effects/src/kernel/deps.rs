//! Dependencies for auth effects (using traits for testability)

use std::sync::Arc;

use super::traits::{BaseAppStore, BaseAuthService, BaseNotifier, BaseRouter};

/// Collaborators accessible to auth effects.
#[derive(Clone)]
pub struct AuthDeps {
    pub auth: Arc<dyn BaseAuthService>,
    pub router: Arc<dyn BaseRouter>,
    pub notifier: Arc<dyn BaseNotifier>,
    pub store: Arc<dyn BaseAppStore>,
}

impl AuthDeps {
    pub fn new(
        auth: Arc<dyn BaseAuthService>,
        router: Arc<dyn BaseRouter>,
        notifier: Arc<dyn BaseNotifier>,
        store: Arc<dyn BaseAppStore>,
    ) -> Self {
        Self {
            auth,
            router,
            notifier,
            store,
        }
    }
}

impl std::fmt::Debug for AuthDeps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthDeps").finish_non_exhaustive()
    }
}
