//! Route Table
//!
//! A static two-level gate: is the session authenticated, and does its role
//! match the route. Unknown or unauthorized paths redirect; there is no error
//! page.

use crate::session::Session;
use licensify_core::Role;

/// Pages reachable in the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppRoute {
    Login,
    Licenses,
    MyLicenses,
    Requests,
    AdminRequests,
}

impl AppRoute {
    pub fn path(&self) -> &'static str {
        match self {
            AppRoute::Login => "/login",
            AppRoute::Licenses => "/licenses",
            AppRoute::MyLicenses => "/my-licenses",
            AppRoute::Requests => "/requests",
            AppRoute::AdminRequests => "/admin-requests",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AppRoute::Login => "Login",
            AppRoute::Licenses => "Licenses",
            AppRoute::MyLicenses => "My Licenses",
            AppRoute::Requests | AppRoute::AdminRequests => "Requests",
        }
    }
}

impl std::fmt::Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Outcome of resolving a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Render(AppRoute),
    Redirect(AppRoute),
}

impl RouteDecision {
    /// The page that ends up mounted
    pub fn route(&self) -> AppRoute {
        match self {
            RouteDecision::Render(route) | RouteDecision::Redirect(route) => *route,
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, RouteDecision::Redirect(_))
    }
}

#[derive(Debug, Clone, Copy)]
enum Gate {
    Anonymous,
    AnyRole,
    Role(Role),
}

impl Gate {
    fn admits(&self, session: &Session) -> bool {
        match self {
            Gate::Anonymous => !session.is_logged_in,
            Gate::AnyRole => session.active_role().is_some(),
            Gate::Role(role) => session.active_role() == Some(*role),
        }
    }
}

const ROUTES: &[(AppRoute, Gate)] = &[
    (AppRoute::Login, Gate::Anonymous),
    (AppRoute::Licenses, Gate::AnyRole),
    (AppRoute::MyLicenses, Gate::Role(Role::User)),
    (AppRoute::Requests, Gate::Role(Role::User)),
    (AppRoute::AdminRequests, Gate::Role(Role::Admin)),
];

/// Sidebar entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub route: AppRoute,
}

pub struct RouteTable;

impl RouteTable {
    /// Landing page for an authenticated session
    pub const HOME: AppRoute = AppRoute::Licenses;

    pub fn resolve(path: &str, session: &Session) -> RouteDecision {
        let path = normalize(path);
        let matched = ROUTES
            .iter()
            .find(|(route, gate)| route.path() == path && gate.admits(session));

        match matched {
            Some((route, _)) => RouteDecision::Render(*route),
            None if session.active_role().is_some() => RouteDecision::Redirect(Self::HOME),
            None => RouteDecision::Redirect(AppRoute::Login),
        }
    }

    /// Navigation chrome for a role
    pub fn navigation(role: Option<Role>) -> Vec<NavItem> {
        let licenses = NavItem {
            label: "Licenses",
            route: AppRoute::Licenses,
        };
        match role {
            None => Vec::new(),
            Some(Role::Admin) => vec![
                licenses,
                NavItem {
                    label: "Requests",
                    route: AppRoute::AdminRequests,
                },
            ],
            Some(Role::User) => vec![
                licenses,
                NavItem {
                    label: "My Licenses",
                    route: AppRoute::MyLicenses,
                },
                NavItem {
                    label: "Requests",
                    route: AppRoute::Requests,
                },
            ],
        }
    }
}

/// Strip query and fragment, collapse trailing slashes, default to `/`
fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default().trim();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: Option<Role>) -> Session {
        match role {
            None => Session::default(),
            Some(role) => Session {
                is_logged_in: true,
                user_id: "u1".into(),
                token: Some("tok".into()),
                role: Some(role),
                ..Session::default()
            },
        }
    }

    #[test]
    fn test_anonymous_is_sent_to_login() {
        let anon = session(None);
        for path in ["/", "/licenses", "/admin-requests", "/nope"] {
            assert_eq!(
                RouteTable::resolve(path, &anon),
                RouteDecision::Redirect(AppRoute::Login),
                "path {path}"
            );
        }
        assert_eq!(
            RouteTable::resolve("/login", &anon),
            RouteDecision::Render(AppRoute::Login)
        );
    }

    #[test]
    fn test_user_routes() {
        let user = session(Some(Role::User));
        for route in [AppRoute::Licenses, AppRoute::MyLicenses, AppRoute::Requests] {
            assert_eq!(
                RouteTable::resolve(route.path(), &user),
                RouteDecision::Render(route)
            );
        }
        assert_eq!(
            RouteTable::resolve("/admin-requests", &user),
            RouteDecision::Redirect(AppRoute::Licenses)
        );
    }

    #[test]
    fn test_admin_routes() {
        let admin = session(Some(Role::Admin));
        assert_eq!(
            RouteTable::resolve("/admin-requests", &admin),
            RouteDecision::Render(AppRoute::AdminRequests)
        );
        assert_eq!(
            RouteTable::resolve("/licenses", &admin),
            RouteDecision::Render(AppRoute::Licenses)
        );
        for path in ["/my-licenses", "/requests"] {
            assert_eq!(
                RouteTable::resolve(path, &admin),
                RouteDecision::Redirect(AppRoute::Licenses)
            );
        }
    }

    #[test]
    fn test_authenticated_unknown_and_login_paths_go_home() {
        let user = session(Some(Role::User));
        for path in ["/", "", "/login", "/settings"] {
            assert_eq!(
                RouteTable::resolve(path, &user),
                RouteDecision::Redirect(AppRoute::Licenses),
                "path {path}"
            );
        }
    }

    #[test]
    fn test_path_normalization() {
        let user = session(Some(Role::User));
        assert_eq!(
            RouteTable::resolve("requests/?page=2", &user),
            RouteDecision::Render(AppRoute::Requests)
        );
        assert_eq!(
            RouteTable::resolve("/my-licenses#top", &user),
            RouteDecision::Render(AppRoute::MyLicenses)
        );
    }

    #[test]
    fn test_navigation_per_role() {
        assert!(RouteTable::navigation(None).is_empty());

        let admin: Vec<_> = RouteTable::navigation(Some(Role::Admin))
            .into_iter()
            .map(|item| item.route)
            .collect();
        assert_eq!(admin, vec![AppRoute::Licenses, AppRoute::AdminRequests]);

        let user = RouteTable::navigation(Some(Role::User));
        assert_eq!(user.len(), 3);
        assert!(user
            .iter()
            .all(|item| RouteTable::resolve(item.route.path(), &session(Some(Role::User)))
                == RouteDecision::Render(item.route)));
    }
}
