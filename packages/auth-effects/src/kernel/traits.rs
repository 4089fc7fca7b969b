// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (what to do after a login, which message to show) lives in
// the domain modules that use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseAuthService, BaseRouter)

use async_trait::async_trait;

use super::app_store::QueryParams;
use crate::domains::auth::AuthError;

// =============================================================================
// Auth Service Trait (Infrastructure - admin API calls)
// =============================================================================

/// Registration payload sent by `sign_up`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub allow_statistics: bool,
}

/// What the registration endpoint answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignUpResponse {
    pub status: u16,
}

impl SignUpResponse {
    /// The server answers 200 when the account still has to confirm its
    /// email, and 201 when it is active immediately.
    pub fn confirmation_needed(&self) -> bool {
        self.status == 200
    }
}

#[async_trait]
pub trait BaseAuthService: Send + Sync {
    /// Exchange credentials for a token and keep it for later calls.
    async fn log_in(&self, email: &str, password: &str) -> Result<(), AuthError>;

    async fn sign_up(&self, form: &SignUpForm) -> Result<SignUpResponse, AuthError>;

    async fn change_password(&self, old_password: &str, new_password: &str)
        -> Result<(), AuthError>;

    /// Forget the held token (and revoke it server side when there was one).
    async fn clear_user_token(&self) -> Result<(), AuthError>;
}

// =============================================================================
// Router Trait (Infrastructure - client side navigation)
// =============================================================================

pub trait BaseRouter: Send + Sync {
    fn navigate_by_url(&self, url: &str);
}

// =============================================================================
// Notifier Trait (Infrastructure - toasts)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Error,
}

/// A toast. `message_text` is a translation key, not display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message_text: String,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn info(message_text: impl Into<String>) -> Self {
        Self {
            message_text: message_text.into(),
            kind: NotificationKind::Info,
        }
    }

    pub fn error(message_text: impl Into<String>) -> Self {
        Self {
            message_text: message_text.into(),
            kind: NotificationKind::Error,
        }
    }
}

pub trait BaseNotifier: Send + Sync {
    fn open_notification(&self, notification: Notification);

    /// Generic display for an error nobody recognised.
    fn open_http_error(&self, error: &AuthError);
}

// =============================================================================
// App Store Trait (Infrastructure - read-only view of client state)
// =============================================================================

pub trait BaseAppStore: Send + Sync {
    /// Query parameters of the current URL.
    fn query_params(&self) -> QueryParams;

    fn demo_page_available(&self) -> bool;
}
