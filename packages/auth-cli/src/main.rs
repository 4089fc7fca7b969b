//! CLI driving the auth effects against the admin API.
//!
//! Every command runs in a fresh session: the token only lives for the
//! duration of the process, so `change-password` and `logout` log in first.

mod console;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use auth_effects::domains;
use auth_effects::kernel::{HttpAuthService, MemoryStore};
use auth_effects::{AuthDeps, AuthEvent, Config, Route};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::Password;
use seesaw::EngineHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use console::{ConsoleNotifier, ConsoleRouter};

#[derive(Parser)]
#[command(name = "auth")]
#[command(about = "Log in, sign up and manage the password of an admin account")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and report where the client would navigate
    Login {
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
        /// Path to return to after login
        #[arg(long)]
        redirect: Option<String>,
    },

    /// Create an account, then log in with it
    Signup {
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        allow_statistics: bool,
    },

    /// Log in and change the account password
    ChangePassword {
        email: String,
        #[arg(long)]
        old_password: Option<String>,
        #[arg(long)]
        new_password: Option<String>,
    },

    /// Log in, then log out again revoking the token
    Logout {
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,auth_effects=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::debug!(api_url = %config.api_url, "configuration loaded");

    let session = Session::start(&config)?;
    match cli.command {
        Commands::Login {
            email,
            password,
            redirect,
        } => {
            if let Some(redirect) = redirect {
                session
                    .store
                    .set_url(format!("{}?redirect={}", Route::Login, redirect));
            }
            let password = password_or_prompt(password, "Password")?;
            session.run(AuthEvent::LogInRequested { email, password }).await
        }

        Commands::Signup {
            email,
            first_name,
            last_name,
            password,
            allow_statistics,
        } => {
            let password = password_or_prompt(password, "Password")?;
            session
                .run(AuthEvent::SignUpRequested {
                    first_name,
                    last_name,
                    email,
                    password,
                    allow_statistics,
                })
                .await
        }

        Commands::ChangePassword {
            email,
            old_password,
            new_password,
        } => {
            let old_password = password_or_prompt(old_password, "Current password")?;
            let new_password = password_or_prompt(new_password, "New password")?;
            session
                .run(AuthEvent::LogInRequested {
                    email,
                    password: old_password.clone(),
                })
                .await?;
            session
                .run(AuthEvent::ChangePasswordRequested {
                    old_password,
                    new_password,
                })
                .await
        }

        Commands::Logout { email, password } => {
            let password = password_or_prompt(password, "Password")?;
            session
                .run(AuthEvent::LogInRequested { email, password })
                .await?;
            session.run(AuthEvent::LogOutRequested).await
        }
    }
}

/// A running engine plus the console collaborators it reports through.
struct Session {
    handle: EngineHandle,
    store: Arc<MemoryStore>,
    notifier: Arc<ConsoleNotifier>,
}

impl Session {
    fn start(config: &Config) -> Result<Self> {
        let auth = Arc::new(HttpAuthService::new(config)?);
        let store = Arc::new(MemoryStore::new(
            Route::Login.path(),
            config.demo_page_available,
        ));
        let notifier = Arc::new(ConsoleNotifier::new());
        let router = Arc::new(ConsoleRouter::new(store.clone()));

        let deps = AuthDeps::new(auth, router, notifier.clone(), store.clone());
        let handle = domains::engine(deps).start();

        Ok(Self {
            handle,
            store,
            notifier,
        })
    }

    /// Dispatch an intent and wait for its whole cascade.
    async fn run(&self, event: AuthEvent) -> Result<()> {
        let name = event.name();
        self.handle
            .emit_and_await(event)
            .await
            .with_context(|| format!("{} did not complete", name))?;

        if self.notifier.failed() {
            bail!("{} failed", name);
        }
        println!("{} {}", "done:".dimmed(), name.dimmed());
        Ok(())
    }
}

fn password_or_prompt(given: Option<String>, prompt: &str) -> Result<String> {
    match given {
        Some(password) => Ok(password),
        None => Password::new()
            .with_prompt(prompt)
            .interact()
            .context("Failed to read password"),
    }
}
