//! Structured error types for seesaw.
//!
//! `SeesawError` provides pattern-matchable errors instead of generic
//! `anyhow::Error`. Effect handlers still use `anyhow` internally; when a
//! handler fails the runtime wraps the error in
//! [`SeesawError::EffectFailed`] before reporting it to awaiting callers.
//!
//! ```ignore
//! match handle.emit_and_await(event).await {
//!     Ok(()) => {}
//!     Err(e) => match e.downcast_ref::<SeesawError>() {
//!         Some(SeesawError::Timeout { duration }) => warn!(?duration, "still running"),
//!         Some(SeesawError::EffectFailed { effect, .. }) => warn!(effect, "effect failed"),
//!         None => return Err(e),
//!     },
//! }
//! ```

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeesawError {
    /// `emit_and_await` gave up before the cascade finished.
    #[error("timed out after {duration:?} waiting for correlated work")]
    Timeout { duration: Duration },

    /// An effect handler returned an error.
    #[error("effect '{effect}' failed: {message}")]
    EffectFailed {
        effect: &'static str,
        message: String,
    },

    /// An effect handler panicked.
    #[error("effect '{effect}' panicked")]
    EffectPanicked { effect: &'static str },
}

impl SeesawError {
    pub(crate) fn effect_failed(effect: &'static str, err: &anyhow::Error) -> Self {
        Self::EffectFailed {
            effect,
            message: format!("{:#}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effect_failed_keeps_context_chain() {
        let err = anyhow::anyhow!("connection refused").context("calling token endpoint");
        let wrapped = SeesawError::effect_failed("log_in", &err);

        assert_eq!(
            wrapped.to_string(),
            "effect 'log_in' failed: calling token endpoint: connection refused"
        );
    }

    #[test]
    fn timeout_mentions_duration() {
        let err = SeesawError::Timeout {
            duration: Duration::from_secs(2),
        };
        assert!(err.to_string().contains("2s"));
    }
}
