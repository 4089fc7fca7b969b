pub mod auth;
pub mod user_info;

use seesaw::{Engine, EngineBuilder};

use crate::kernel::AuthDeps;

/// Engine running every domain effect against `deps`.
pub fn engine(deps: AuthDeps) -> Engine<AuthDeps> {
    EngineBuilder::new(deps)
        .with_effect(auth::auth_effect())
        .build()
}
