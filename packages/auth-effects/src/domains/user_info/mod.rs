//! User-info domain - state about the signed-in user.
//!
//! Nothing in this crate reacts to these events; logout only dispatches
//! `Reset` for whoever owns the user-info state.

pub mod events;

pub use events::UserInfoEvent;
