//! Route surface the guard cares about.
//!
//! The routing table itself lives with the UI; the guard only needs to know
//! which prefix is protected and where to send users it turns away.

/// Prefix of routes that require authentication and an admin role.
pub const ADMIN_PREFIX: &str = "/admin";

/// Target for unauthorized users on protected routes.
pub const LOGIN_ROUTE: &str = "/login";

/// Target for authorized users without the admin role.
pub const HOME_ROUTE: &str = "/";

/// Whether `path` falls under the protected prefix.
///
/// Plain prefix match, exactly as the portal's router treats it.
#[must_use]
pub fn is_protected(path: &str) -> bool {
    path.starts_with(ADMIN_PREFIX)
}

/// Where a denied navigation is redirected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    /// Not authorized at all: send to the login page.
    Login,
    /// Authorized but not an admin: send to the public home page.
    Home,
}

impl RedirectTarget {
    /// Path the router should navigate to.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => LOGIN_ROUTE,
            Self::Home => HOME_ROUTE,
        }
    }
}

/// Settled result of a guard check.
///
/// While a check is in flight the caller shows its loading state; this enum
/// only exists once the check has settled, so there is no redirect flicker
/// to represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Render the requested route's content.
    Render,
    /// Navigate away instead of rendering.
    Redirect(RedirectTarget),
}
