//! Test harness running the auth engine against mock collaborators.

use auth_effects::domains::auth::{AuthError, ErrorBody};
use auth_effects::kernel::TestDependencies;
use auth_effects::AuthEvent;
use seesaw::testing::EventRecorder;
use seesaw::EngineHandle;
use test_context::AsyncTestContext;

pub struct TestHarness {
    pub mocks: TestDependencies,
    pub handle: EngineHandle,
    pub recorder: EventRecorder,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new(TestDependencies::new())
    }

    async fn teardown(self) {
        self.handle.abort();
    }
}

impl TestHarness {
    /// Start the engine and record everything dispatched from now on.
    pub fn new(mocks: TestDependencies) -> Self {
        let handle = mocks.start();
        let recorder = EventRecorder::attach(handle.bus());
        Self {
            mocks,
            handle,
            recorder,
        }
    }

    pub fn auth_events(&self) -> Vec<AuthEvent> {
        self.recorder.events_of::<AuthEvent>()
    }

    /// Names of the recorded auth events, in dispatch order.
    pub fn auth_event_names(&self) -> Vec<&'static str> {
        self.auth_events().iter().map(AuthEvent::name).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.auth_event_names()
            .into_iter()
            .filter(|n| *n == name)
            .count()
    }
}

pub fn bad_credentials() -> AuthError {
    AuthError::Http {
        status: 400,
        body: ErrorBody {
            error: Some("invalid_grant".to_string()),
            error_description: Some("Bad credentials".to_string()),
            ..ErrorBody::default()
        },
    }
}

pub fn already_in_use() -> AuthError {
    AuthError::Http {
        status: 400,
        body: ErrorBody {
            code: Some(4),
            message: Some("Email is already in use".to_string()),
            ..ErrorBody::default()
        },
    }
}

pub fn server_error() -> AuthError {
    AuthError::Http {
        status: 500,
        body: ErrorBody::from_text("Internal Server Error"),
    }
}

pub fn log_in(email: &str, password: &str) -> AuthEvent {
    AuthEvent::LogInRequested {
        email: email.to_string(),
        password: password.to_string(),
    }
}

pub fn sign_up(email: &str, password: &str) -> AuthEvent {
    AuthEvent::SignUpRequested {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: email.to_string(),
        password: password.to_string(),
        allow_statistics: true,
    }
}
