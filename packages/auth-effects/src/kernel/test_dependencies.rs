// TestDependencies - mock implementations for testing
//
// Provides scripted and recording collaborators that can be injected into
// AuthDeps for tests.

use async_trait::async_trait;
use seesaw::EngineHandle;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{
    AuthDeps, BaseAuthService, BaseNotifier, BaseRouter, MemoryStore, Notification, SignUpForm,
    SignUpResponse,
};
use crate::domains::auth::AuthError;

// =============================================================================
// Mock Auth Service
// =============================================================================

/// A call received by `MockAuthService`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCall {
    LogIn { email: String, password: String },
    SignUp(SignUpForm),
    ChangePassword {
        old_password: String,
        new_password: String,
    },
    ClearUserToken,
}

/// Auth service answering from scripted results.
///
/// Each method pops the next scripted result and falls back to success
/// (status 201 for signup) once the script is exhausted.
pub struct MockAuthService {
    log_in_results: Arc<Mutex<VecDeque<Result<(), AuthError>>>>,
    sign_up_results: Arc<Mutex<VecDeque<Result<SignUpResponse, AuthError>>>>,
    change_password_results: Arc<Mutex<VecDeque<Result<(), AuthError>>>>,
    clear_token_results: Arc<Mutex<VecDeque<Result<(), AuthError>>>>,
    calls: Arc<Mutex<Vec<AuthCall>>>,
    delay: Option<Duration>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl MockAuthService {
    pub fn new() -> Self {
        Self {
            log_in_results: Arc::new(Mutex::new(VecDeque::new())),
            sign_up_results: Arc::new(Mutex::new(VecDeque::new())),
            change_password_results: Arc::new(Mutex::new(VecDeque::new())),
            clear_token_results: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            delay: None,
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    pub fn with_log_in_result(self, result: Result<(), AuthError>) -> Self {
        self.log_in_results.lock().unwrap().push_back(result);
        self
    }

    pub fn with_sign_up_result(self, result: Result<SignUpResponse, AuthError>) -> Self {
        self.sign_up_results.lock().unwrap().push_back(result);
        self
    }

    pub fn with_change_password_result(self, result: Result<(), AuthError>) -> Self {
        self.change_password_results
            .lock()
            .unwrap()
            .push_back(result);
        self
    }

    pub fn with_clear_token_result(self, result: Result<(), AuthError>) -> Self {
        self.clear_token_results.lock().unwrap().push_back(result);
        self
    }

    /// Make every call take at least `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get all calls in the order they were received
    pub fn calls(&self) -> Vec<AuthCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn log_in_calls(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                AuthCall::LogIn { email, password } => Some((email, password)),
                _ => None,
            })
            .collect()
    }

    /// Highest number of calls that were in progress at the same time
    pub fn max_concurrent_calls(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    async fn record<T>(&self, call: AuthCall, script: &Mutex<VecDeque<T>>, fallback: T) -> T {
        self.calls.lock().unwrap().push(call);

        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        script.lock().unwrap().pop_front().unwrap_or(fallback)
    }
}

impl Default for MockAuthService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseAuthService for MockAuthService {
    async fn log_in(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let call = AuthCall::LogIn {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.record(call, &self.log_in_results, Ok(())).await
    }

    async fn sign_up(&self, form: &SignUpForm) -> Result<SignUpResponse, AuthError> {
        let call = AuthCall::SignUp(form.clone());
        self.record(call, &self.sign_up_results, Ok(SignUpResponse { status: 201 }))
            .await
    }

    async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let call = AuthCall::ChangePassword {
            old_password: old_password.to_string(),
            new_password: new_password.to_string(),
        };
        self.record(call, &self.change_password_results, Ok(())).await
    }

    async fn clear_user_token(&self) -> Result<(), AuthError> {
        self.record(AuthCall::ClearUserToken, &self.clear_token_results, Ok(()))
            .await
    }
}

// =============================================================================
// Recording Router
// =============================================================================

pub struct RecordingRouter {
    urls: Arc<Mutex<Vec<String>>>,
}

impl RecordingRouter {
    pub fn new() -> Self {
        Self {
            urls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get every URL navigated to, in order
    pub fn navigations(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }

    pub fn last_url(&self) -> Option<String> {
        self.urls.lock().unwrap().last().cloned()
    }
}

impl Default for RecordingRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl BaseRouter for RecordingRouter {
    fn navigate_by_url(&self, url: &str) {
        self.urls.lock().unwrap().push(url.to_string());
    }
}

// =============================================================================
// Recording Notifier
// =============================================================================

/// Something shown by `RecordingNotifier`
#[derive(Debug, Clone, PartialEq)]
pub enum Shown {
    Notification(Notification),
    HttpError(AuthError),
}

pub struct RecordingNotifier {
    shown: Arc<Mutex<Vec<Shown>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            shown: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn shown(&self) -> Vec<Shown> {
        self.shown.lock().unwrap().clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.shown()
            .into_iter()
            .filter_map(|s| match s {
                Shown::Notification(n) => Some(n),
                Shown::HttpError(_) => None,
            })
            .collect()
    }

    pub fn http_errors(&self) -> Vec<AuthError> {
        self.shown()
            .into_iter()
            .filter_map(|s| match s {
                Shown::HttpError(e) => Some(e),
                Shown::Notification(_) => None,
            })
            .collect()
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl BaseNotifier for RecordingNotifier {
    fn open_notification(&self, notification: Notification) {
        self.shown
            .lock()
            .unwrap()
            .push(Shown::Notification(notification));
    }

    fn open_http_error(&self, error: &AuthError) {
        self.shown
            .lock()
            .unwrap()
            .push(Shown::HttpError(error.clone()));
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Mock collaborators plus a memory store, kept so tests can inspect them
pub struct TestDependencies {
    pub auth: Arc<MockAuthService>,
    pub router: Arc<RecordingRouter>,
    pub notifier: Arc<RecordingNotifier>,
    pub store: Arc<MemoryStore>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            auth: Arc::new(MockAuthService::new()),
            router: Arc::new(RecordingRouter::new()),
            notifier: Arc::new(RecordingNotifier::new()),
            store: Arc::new(MemoryStore::default()),
        }
    }

    pub fn with_auth(mut self, auth: MockAuthService) -> Self {
        self.auth = Arc::new(auth);
        self
    }

    /// Start from `url` with the given demo-page flag
    pub fn with_store(mut self, url: &str, demo_page_available: bool) -> Self {
        self.store = Arc::new(MemoryStore::new(url, demo_page_available));
        self
    }

    pub fn deps(&self) -> AuthDeps {
        AuthDeps::new(
            self.auth.clone(),
            self.router.clone(),
            self.notifier.clone(),
            self.store.clone(),
        )
    }

    /// Start an engine running every domain effect against these mocks
    pub fn start(&self) -> EngineHandle {
        crate::domains::engine(self.deps()).start()
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
