//! Navigation guard.
//!
//! Decides, for a requested page path and the current session, which page is actually shown and
//! what its title is. The decision is made by a fixed sequence of independent policies:
//!
//! 1. [`TitlePolicy`] resolves the document title of the target route.
//! 2. [`AuthenticationPolicy`] sends anonymous visitors to `/login` and logged-in visitors away
//!    from it.
//! 3. [`AuthorizationPolicy`] keeps non-administrators out of the `/admin` section.
//!
//! The first policy that asks for a redirect wins.

use crate::constants::APP_TITLE;
use crate::session::{Role, Session};

pub const LOGIN_PATH: &str = "/login";
pub const ADMIN_HOME: &str = "/admin";
pub const USER_HOME: &str = "/user";

/// Which part of the application a route belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    Admin,
    User,
    Public,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub name: &'static str,
    pub title: Option<&'static str>,
    pub section: Section,
}

const ROUTES: &[Route] = &[
    Route { path: "/admin", name: "template-management", title: Some("模板管理"), section: Section::Admin },
    Route { path: "/admin/template", name: "template", title: Some("模板"), section: Section::Admin },
    Route { path: "/admin/user-management", name: "user-management", title: Some("用户管理"), section: Section::Admin },
    Route { path: "/admin/task-board", name: "task-board", title: Some("任务看板"), section: Section::Admin },
    Route { path: "/admin/application-management", name: "application-management", title: Some("申请管理"), section: Section::Admin },
    Route { path: "/admin/content-review", name: "content-review", title: Some("内容审核"), section: Section::Admin },
    Route { path: "/admin/application-review", name: "application-review", title: Some("申请审核"), section: Section::Admin },
    Route { path: "/user", name: "filing-application", title: Some("备案申请"), section: Section::User },
    Route { path: "/user/filing-center", name: "filing-center", title: Some("备案中心"), section: Section::User },
    Route { path: "/user/filing-edit", name: "filing-edit", title: Some("编辑备案"), section: Section::User },
    Route { path: "/login", name: "login", title: Some("登录"), section: Section::Public },
];

const NOT_FOUND: Route = Route {
    path: "/:pathMatch(.*)*",
    name: "not-found",
    title: Some("页面未找到"),
    section: Section::Public,
};

/// Static page table.
#[derive(Clone, Copy, Debug, Default)]
pub struct RouteTable;

impl RouteTable {
    pub fn routes(&self) -> &'static [Route] {
        ROUTES
    }

    /// Normalise a requested path: drop any query or fragment and trailing slashes, and apply
    /// the root redirect (`/` -> `/admin`).
    pub fn normalize(&self, path: &str) -> String {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            return ADMIN_HOME.to_string();
        }
        if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        }
    }

    /// The route for a normalised path; unknown paths map to the not-found page.
    pub fn resolve(&self, path: &str) -> &'static Route {
        ROUTES
            .iter()
            .find(|route| route.path == path)
            .unwrap_or(&NOT_FOUND)
    }
}

/// Navigation request as seen by the policies.
#[derive(Clone, Copy, Debug)]
pub struct NavigationRequest<'a> {
    /// Normalised target path.
    pub path: &'a str,
    pub route: &'a Route,
    pub session: Option<&'a Session>,
}

impl NavigationRequest<'_> {
    fn role(&self) -> Option<Role> {
        self.session.map(|s| s.role)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PolicyOutcome {
    Proceed,
    Redirect(String),
}

/// One independent access rule.
pub trait AccessPolicy: Send + Sync {
    fn name(&self) -> &'static str;
    fn check(&self, request: &NavigationRequest<'_>) -> PolicyOutcome;
}

/// Document title for a route.
#[derive(Clone, Copy, Debug, Default)]
pub struct TitlePolicy;

impl TitlePolicy {
    pub fn resolve(&self, route: &Route) -> String {
        match route.title {
            Some(title) => format!("{title} - {APP_TITLE}"),
            None => APP_TITLE.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AuthenticationPolicy;

impl AccessPolicy for AuthenticationPolicy {
    fn name(&self) -> &'static str {
        "authentication"
    }

    fn check(&self, request: &NavigationRequest<'_>) -> PolicyOutcome {
        if request.path == LOGIN_PATH {
            return match request.role() {
                Some(role) => PolicyOutcome::Redirect(home_for(role).to_string()),
                None => PolicyOutcome::Proceed,
            };
        }
        if request.session.is_none() {
            return PolicyOutcome::Redirect(LOGIN_PATH.to_string());
        }
        PolicyOutcome::Proceed
    }
}

/// Administrators may visit every section; everyone else is kept out of `/admin`.
#[derive(Clone, Copy, Debug, Default)]
pub struct AuthorizationPolicy;

impl AccessPolicy for AuthorizationPolicy {
    fn name(&self) -> &'static str {
        "authorization"
    }

    fn check(&self, request: &NavigationRequest<'_>) -> PolicyOutcome {
        if request.path.starts_with(ADMIN_HOME) && request.role() != Some(Role::Admin) {
            return PolicyOutcome::Redirect(USER_HOME.to_string());
        }
        PolicyOutcome::Proceed
    }
}

/// Landing page after login.
pub fn home_for(role: Role) -> &'static str {
    match role {
        Role::Admin => ADMIN_HOME,
        Role::User => USER_HOME,
    }
}

/// Result of a navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Navigation {
    /// Title of the requested route.
    pub title: String,
    pub route_name: &'static str,
    pub outcome: PolicyOutcome,
}

/// Runs the title policy and then the access policies in order.
pub struct NavigationGuard {
    table: RouteTable,
    title: TitlePolicy,
    policies: Vec<Box<dyn AccessPolicy>>,
}

impl Default for NavigationGuard {
    fn default() -> Self {
        Self::new(vec![
            Box::new(AuthenticationPolicy),
            Box::new(AuthorizationPolicy),
        ])
    }
}

impl NavigationGuard {
    pub fn new(policies: Vec<Box<dyn AccessPolicy>>) -> Self {
        Self {
            table: RouteTable,
            title: TitlePolicy,
            policies,
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn evaluate(&self, path: &str, session: Option<&Session>) -> Navigation {
        let path = self.table.normalize(path);
        let route = self.table.resolve(&path);
        let request = NavigationRequest {
            path: &path,
            route,
            session,
        };

        let outcome = self
            .policies
            .iter()
            .map(|policy| (policy.name(), policy.check(&request)))
            .find(|(_, outcome)| *outcome != PolicyOutcome::Proceed)
            .map(|(name, outcome)| {
                tracing::debug!("navigation to {} redirected by {} policy", path, name);
                outcome
            })
            .unwrap_or(PolicyOutcome::Proceed);

        Navigation {
            title: self.title.resolve(route),
            route_name: route.name,
            outcome,
        }
    }
}
