//! Auth actions - one service call each, answered with the outcome event.
//!
//! Failures never escape: the service error is carried by the failure event.

use tracing::{debug, info, warn};

use super::events::AuthEvent;
use crate::kernel::{BaseAuthService, SignUpForm};

pub async fn log_in(email: &str, password: &str, auth: &dyn BaseAuthService) -> AuthEvent {
    debug!(email, "logging in");

    match auth.log_in(email, password).await {
        Ok(()) => {
            info!(email, "login succeeded");
            AuthEvent::LogInSucceeded
        }
        Err(error) => {
            warn!(email, error = %error, "login failed");
            AuthEvent::LogInFailed { error }
        }
    }
}

pub async fn sign_up(form: SignUpForm, auth: &dyn BaseAuthService) -> AuthEvent {
    debug!(email = %form.email, "signing up");

    match auth.sign_up(&form).await {
        Ok(response) => {
            let confirmation_needed = response.confirmation_needed();
            info!(
                email = %form.email,
                status = response.status,
                confirmation_needed,
                "signup succeeded"
            );
            AuthEvent::SignUpSucceeded {
                confirmation_needed,
                email: form.email,
                password: form.password,
            }
        }
        Err(error) => {
            warn!(email = %form.email, error = %error, "signup failed");
            AuthEvent::SignUpFailed { error }
        }
    }
}

pub async fn change_password(
    old_password: &str,
    new_password: &str,
    auth: &dyn BaseAuthService,
) -> AuthEvent {
    debug!("changing password");

    match auth.change_password(old_password, new_password).await {
        Ok(()) => {
            info!("password changed");
            AuthEvent::ChangePasswordSucceeded
        }
        Err(error) => {
            warn!(error = %error, "password change failed");
            AuthEvent::ChangePasswordFailed { error }
        }
    }
}
