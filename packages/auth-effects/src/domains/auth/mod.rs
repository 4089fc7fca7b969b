//! Auth domain - login, signup, logout and password change against the
//! admin API, plus the navigation and notifications that follow them.
//!
//! Architecture:
//!   edge → emit(AuthEvent::*Requested) → auth effect calls the service
//!        → emits the outcome → auth effect reacts (navigate / notify)

pub mod actions;
pub mod effects;
pub mod error;
pub mod events;
pub mod notifications;
pub mod routes;

pub use effects::auth_effect;
pub use error::{AuthError, ErrorBody};
pub use events::AuthEvent;
pub use notifications::{display_for_failure, FailureDisplay};
pub use routes::{login_redirect_target, Route};
