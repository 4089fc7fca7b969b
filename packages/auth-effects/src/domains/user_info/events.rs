/// User-info events, owned by the user-info slice of the client state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInfoEvent {
    /// Forget everything known about the signed-in user.
    Reset,
}
