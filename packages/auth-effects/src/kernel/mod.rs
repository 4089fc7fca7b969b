//! Kernel module - infrastructure the domains run on.

pub mod app_store;
pub mod deps;
pub mod http_auth;
pub mod test_dependencies;
pub mod traits;

pub use app_store::{MemoryStore, QueryParams};
pub use deps::AuthDeps;
pub use http_auth::HttpAuthService;
pub use test_dependencies::TestDependencies;
pub use traits::*;
