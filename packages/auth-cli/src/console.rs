//! Console router and notifier.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use auth_effects::domains::auth::notifications::{
    ALREADY_IN_USE, CHANGE_PASSWORD_SUCCESS, INCORRECT_CREDENTIALS, NEW_ACCOUNT_CONFIRM_EMAIL,
    NEW_ACCOUNT_LOGIN,
};
use auth_effects::kernel::{BaseNotifier, BaseRouter, MemoryStore, Notification, NotificationKind};
use auth_effects::AuthError;
use colored::Colorize;

/// English text for a notification key. Unknown keys are shown as is.
pub fn translate(key: &str) -> &str {
    match key {
        INCORRECT_CREDENTIALS => "Incorrect email or password",
        ALREADY_IN_USE => "This email is already in use",
        NEW_ACCOUNT_CONFIRM_EMAIL => "Account created. Check your inbox to confirm your email.",
        NEW_ACCOUNT_LOGIN => "Account created. Logging you in.",
        CHANGE_PASSWORD_SUCCESS => "Password changed",
        other => other,
    }
}

/// Prints navigations and keeps the store's URL in step.
pub struct ConsoleRouter {
    store: Arc<MemoryStore>,
}

impl ConsoleRouter {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

impl BaseRouter for ConsoleRouter {
    fn navigate_by_url(&self, url: &str) {
        println!("{} {}", "→".bright_blue(), url.bright_blue().bold());
        self.store.navigate_by_url(url);
    }
}

/// Prints notifications, remembering whether any error was shown.
#[derive(Default)]
pub struct ConsoleNotifier {
    failed: AtomicBool,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }
}

impl BaseNotifier for ConsoleNotifier {
    fn open_notification(&self, notification: Notification) {
        let text = translate(&notification.message_text);
        match notification.kind {
            NotificationKind::Info => println!("{} {}", "✓".green(), text.green()),
            NotificationKind::Error => {
                self.failed.store(true, Ordering::SeqCst);
                println!("{} {}", "✗".red(), text.red().bold());
            }
        }
    }

    fn open_http_error(&self, error: &AuthError) {
        self.failed.store(true, Ordering::SeqCst);
        println!("{} {}", "✗".red(), error.to_string().red().bold());
    }
}
