use std::fmt;

use crate::kernel::QueryParams;

/// Client routes the auth flow navigates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    CreateApplication,
}

impl Route {
    pub const fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::CreateApplication => "/create-application",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Where to go after a successful login.
///
/// An explicit `redirect` query parameter wins. Without one, accounts that
/// can see the demo page land on application creation, everyone else on home.
pub fn login_redirect_target(query: &QueryParams, demo_page_available: bool) -> String {
    if let Some(redirect) = query.redirect() {
        return redirect.to_string();
    }
    if demo_page_available {
        Route::CreateApplication.path().to_string()
    } else {
        Route::Home.path().to_string()
    }
}
