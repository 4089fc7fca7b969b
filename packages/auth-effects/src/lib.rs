//! Auth effects for the admin client.
//!
//! Intents (`AuthEvent::*Requested`) are dispatched on a seesaw engine. The
//! auth effect calls the admin API, dispatches the outcome and reacts to it
//! with navigation and notifications.
//!
//! ```ignore
//! let config = Config::from_env()?;
//! let store = Arc::new(MemoryStore::new("/login", config.demo_page_available));
//! let deps = AuthDeps::new(
//!     Arc::new(HttpAuthService::new(&config)?),
//!     store.clone(),
//!     notifier,
//!     store,
//! );
//!
//! let handle = domains::engine(deps).start();
//! handle
//!     .emit_and_await(AuthEvent::LogInRequested { email, password })
//!     .await?;
//! ```

pub mod config;
pub mod domains;
pub mod kernel;

pub use config::Config;
pub use domains::auth::{AuthError, AuthEvent, Route};
pub use domains::user_info::UserInfoEvent;
pub use kernel::AuthDeps;
