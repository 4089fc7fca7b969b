//! Auth domain effect - service calls and the reactions to their outcomes.
//!
//! Effects use `.then()` and return `Emit::none()` for terminal.
//!
//! Cascade flow:
//!   LogInRequested → LogInSucceeded | LogInFailed
//!   LogInSucceeded → navigate (terminal)
//!   LogInFailed | SignUpFailed → notification or HTTP error (terminal)
//!   SignUpRequested → SignUpSucceeded | SignUpFailed
//!   SignUpSucceeded → notification, LogInRequested
//!   ChangePasswordRequested → ChangePasswordSucceeded | ChangePasswordFailed
//!   ChangePasswordSucceeded | ChangePasswordFailed → notification (terminal)
//!   LogOutRequested → navigate, ClearUserToken + UserInfoEvent::Reset
//!   ClearUserToken → clear token (terminal)

use anyhow::{Context, Result};
use seesaw::{effect, Effect, EffectContext, Emit};
use tracing::{debug, info};

use super::actions;
use super::events::AuthEvent;
use super::notifications::{self, FailureDisplay};
use super::routes::{login_redirect_target, Route};
use crate::domains::user_info::UserInfoEvent;
use crate::kernel::{AuthDeps, Notification, SignUpForm};

/// Build the auth effect handler.
pub fn auth_effect() -> Effect<AuthDeps> {
    effect::on::<AuthEvent>().id("auth").then(
        |event, ctx: EffectContext<AuthDeps>| async move {
            debug!(event = event.name(), cid = %ctx.correlation_id(), "auth effect");
            handle(&event, ctx.deps()).await
        },
    )
}

async fn handle(event: &AuthEvent, deps: &AuthDeps) -> Result<Emit> {
    match event {
        // =================================================================
        // Login
        // =================================================================
        AuthEvent::LogInRequested { email, password } => {
            let outcome = actions::log_in(email, password, deps.auth.as_ref()).await;
            Ok(Emit::event(outcome))
        }

        AuthEvent::LogInSucceeded => {
            let target = login_redirect_target(
                &deps.store.query_params(),
                deps.store.demo_page_available(),
            );
            info!(url = %target, "navigating after login");
            deps.router.navigate_by_url(&target);
            Ok(Emit::none())
        }

        AuthEvent::LogInFailed { error } | AuthEvent::SignUpFailed { error } => {
            match notifications::display_for_failure(error) {
                FailureDisplay::Notification(notification) => {
                    deps.notifier.open_notification(notification);
                }
                FailureDisplay::HttpError => deps.notifier.open_http_error(error),
            }
            Ok(Emit::none())
        }

        // =================================================================
        // Signup
        // =================================================================
        AuthEvent::SignUpRequested {
            first_name,
            last_name,
            email,
            password,
            allow_statistics,
        } => {
            let form = SignUpForm {
                first_name: first_name.clone(),
                last_name: last_name.clone(),
                email: email.clone(),
                password: password.clone(),
                allow_statistics: *allow_statistics,
            };
            let outcome = actions::sign_up(form, deps.auth.as_ref()).await;
            Ok(Emit::event(outcome))
        }

        // Show the message, then log the new account in.
        AuthEvent::SignUpSucceeded {
            confirmation_needed,
            email,
            password,
        } => {
            deps.notifier
                .open_notification(notifications::sign_up_notification(*confirmation_needed));
            Ok(Emit::event(AuthEvent::LogInRequested {
                email: email.clone(),
                password: password.clone(),
            }))
        }

        // =================================================================
        // Change password
        // =================================================================
        AuthEvent::ChangePasswordRequested {
            old_password,
            new_password,
        } => {
            let outcome =
                actions::change_password(old_password, new_password, deps.auth.as_ref())
                    .await;
            Ok(Emit::event(outcome))
        }

        AuthEvent::ChangePasswordSucceeded => {
            deps.notifier
                .open_notification(Notification::info(notifications::CHANGE_PASSWORD_SUCCESS));
            Ok(Emit::none())
        }

        AuthEvent::ChangePasswordFailed { error } => {
            deps.notifier.open_http_error(error);
            Ok(Emit::none())
        }

        // =================================================================
        // Logout
        // =================================================================
        AuthEvent::LogOutRequested => {
            deps.router.navigate_by_url(Route::Login.path());
            Ok(Emit::event(AuthEvent::ClearUserToken).and(UserInfoEvent::Reset))
        }

        AuthEvent::ClearUserToken => {
            deps.auth
                .clear_user_token()
                .await
                .context("clearing user token")?;
            info!("user token cleared");
            Ok(Emit::none())
        }
    }
}
