use super::error::AuthError;

/// Auth events - intents dispatched by the edge and the outcomes the auth
/// effect answers them with.
///
/// Every `*Requested` intent is answered by exactly one `*Succeeded` or
/// `*Failed` outcome carrying the service error untouched.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    LogInRequested {
        email: String,
        password: String,
    },
    LogInSucceeded,
    LogInFailed {
        error: AuthError,
    },

    SignUpRequested {
        first_name: String,
        last_name: String,
        email: String,
        password: String,
        allow_statistics: bool,
    },
    /// Credentials are carried along so the account can be logged in right away.
    SignUpSucceeded {
        confirmation_needed: bool,
        email: String,
        password: String,
    },
    SignUpFailed {
        error: AuthError,
    },

    ChangePasswordRequested {
        old_password: String,
        new_password: String,
    },
    ChangePasswordSucceeded,
    ChangePasswordFailed {
        error: AuthError,
    },

    LogOutRequested,
    ClearUserToken,
}

impl AuthEvent {
    /// Variant name, safe to log (payloads may hold passwords).
    pub fn name(&self) -> &'static str {
        match self {
            Self::LogInRequested { .. } => "LogInRequested",
            Self::LogInSucceeded => "LogInSucceeded",
            Self::LogInFailed { .. } => "LogInFailed",
            Self::SignUpRequested { .. } => "SignUpRequested",
            Self::SignUpSucceeded { .. } => "SignUpSucceeded",
            Self::SignUpFailed { .. } => "SignUpFailed",
            Self::ChangePasswordRequested { .. } => "ChangePasswordRequested",
            Self::ChangePasswordSucceeded => "ChangePasswordSucceeded",
            Self::ChangePasswordFailed { .. } => "ChangePasswordFailed",
            Self::LogOutRequested => "LogOutRequested",
            Self::ClearUserToken => "ClearUserToken",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::LogInFailed { .. } | Self::SignUpFailed { .. } | Self::ChangePasswordFailed { .. }
        )
    }
}
