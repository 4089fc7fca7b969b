//! Notification keys and the rules picking them.

use super::error::AuthError;
use crate::kernel::Notification;

pub const INCORRECT_CREDENTIALS: &str = "auth.incorrect_credentials";
pub const ALREADY_IN_USE: &str = "auth.already_in_use";
pub const NEW_ACCOUNT_CONFIRM_EMAIL: &str = "auth.new_account_confirm_email";
pub const NEW_ACCOUNT_LOGIN: &str = "auth.new_account_login";
pub const CHANGE_PASSWORD_SUCCESS: &str = "auth.change_password_success";

/// `error_description` the token endpoint sends for a wrong email/password.
pub const BAD_CREDENTIALS: &str = "Bad credentials";

/// Error code the registration endpoint sends for a taken email.
pub const ALREADY_IN_USE_CODE: i64 = 4;

/// How a login or signup failure is shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureDisplay {
    Notification(Notification),
    /// Hand the error to the generic HTTP error display.
    HttpError,
}

pub fn display_for_failure(error: &AuthError) -> FailureDisplay {
    if error.error_description() == Some(BAD_CREDENTIALS) {
        return FailureDisplay::Notification(Notification::error(INCORRECT_CREDENTIALS));
    }
    if error.code() == Some(ALREADY_IN_USE_CODE) {
        return FailureDisplay::Notification(Notification::error(ALREADY_IN_USE));
    }
    FailureDisplay::HttpError
}

pub fn sign_up_notification(confirmation_needed: bool) -> Notification {
    if confirmation_needed {
        Notification::info(NEW_ACCOUNT_CONFIRM_EMAIL)
    } else {
        Notification::info(NEW_ACCOUNT_LOGIN)
    }
}
