//! Route Guard
//!
//! Decides whether a dashboard view may be rendered for the current session:
//!
//! 1. No session → `/login`
//! 2. No profile role for the user (or the lookup failed) → `/login`
//! 3. Path outside the role's prefixes → the role's landing path
//! 4. Route requires roles the user lacks → the role's landing path
//! 5. Otherwise render
//!
//! Decisions are recomputed on every request.

use serde::Serialize;

use super::access::{is_allowed, landing_path_for, LOGIN_PATH};
use super::roles::Role;
use crate::backend::{records, AuthProvider, AuthUser, DataSource, Table};
use crate::models::Profile;

/// A dashboard view and the roles it is restricted to, if any
#[derive(Debug, Clone, Copy)]
pub struct ViewRoute {
    pub path: &'static str,
    pub required_roles: Option<&'static [Role]>,
}

/// Every guarded view
pub const VIEW_ROUTES: &[ViewRoute] = &[
    ViewRoute { path: "/dashboard/investor", required_roles: None },
    ViewRoute { path: "/dashboard/investor/investments", required_roles: None },
    ViewRoute { path: "/dashboard/investor/icds", required_roles: None },
    ViewRoute { path: "/dashboard/investor/bonds", required_roles: None },
    ViewRoute { path: "/dashboard/investor/kyc", required_roles: None },
    ViewRoute { path: "/dashboard/partner", required_roles: None },
    ViewRoute { path: "/dashboard/partner/referrals", required_roles: None },
    ViewRoute { path: "/dashboard/admin", required_roles: None },
    ViewRoute { path: "/dashboard/admin/investments", required_roles: None },
    ViewRoute { path: "/dashboard/admin/referrals", required_roles: None },
    ViewRoute { path: "/dashboard/admin/kyc", required_roles: None },
    ViewRoute { path: "/dashboard/admin/users", required_roles: None },
    ViewRoute {
        path: "/dashboard/admin/approvals",
        required_roles: Some(&[Role::AdminChecker]),
    },
    ViewRoute {
        path: "/dashboard/admin/invites",
        required_roles: Some(&[Role::AdminMaker]),
    },
];

/// Roles required by the view at `path`
pub fn required_roles_for(path: &str) -> Option<&'static [Role]> {
    let path = normalize(path);
    VIEW_ROUTES
        .iter()
        .find(|route| route.path == path)
        .and_then(|route| route.required_roles)
}

fn normalize(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

/// The signed-in user a view is rendered for
#[derive(Debug, Clone, Serialize)]
pub struct Viewer {
    pub user_id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: Role,
}

/// Outcome of the guard
#[derive(Debug, Clone)]
pub enum AccessDecision {
    Render(Viewer),
    Redirect(&'static str),
}

impl AccessDecision {
    pub fn redirect_target(&self) -> Option<&'static str> {
        match self {
            AccessDecision::Redirect(target) => Some(target),
            AccessDecision::Render(_) => None,
        }
    }
}

/// Look up the profile for a user. Fetch errors count as "no profile".
pub async fn load_profile(data: &dyn DataSource, user_id: &str) -> Option<Profile> {
    match records::fetch_one::<Profile>(data, Table::Profiles, user_id).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(user_id = %user_id, error = %e, "Profile lookup failed");
            None
        }
    }
}

/// Resolve a session token to its user. Lookup errors count as "no session".
pub async fn resolve_session(auth: &dyn AuthProvider, token: Option<&str>) -> Option<AuthUser> {
    let token = token.filter(|t| !t.is_empty())?;
    match auth.current_user(token).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(error = %e, "Session lookup failed");
            None
        }
    }
}

/// Decide whether `path` may be rendered for `user`
pub async fn authorize(
    data: &dyn DataSource,
    user: Option<&AuthUser>,
    path: &str,
    required_roles: Option<&[Role]>,
) -> AccessDecision {
    let Some(user) = user else {
        tracing::debug!(path = %path, "No session, redirecting to login");
        return AccessDecision::Redirect(LOGIN_PATH);
    };

    let Some(profile) = load_profile(data, &user.id).await else {
        tracing::debug!(user_id = %user.id, path = %path, "No profile role, redirecting to login");
        return AccessDecision::Redirect(LOGIN_PATH);
    };

    let role = profile.role;
    let landing = landing_path_for(role);

    if !is_allowed(role, path) {
        tracing::debug!(user_id = %user.id, role = %role, path = %path, "Path not permitted for role");
        return AccessDecision::Redirect(landing);
    }

    if let Some(required) = required_roles {
        if !required.contains(&role) {
            tracing::debug!(user_id = %user.id, role = %role, path = %path, "Role not in route allow-list");
            return AccessDecision::Redirect(landing);
        }
    }

    AccessDecision::Render(Viewer {
        user_id: user.id.clone(),
        email: profile.email.or_else(|| user.email.clone()),
        full_name: profile.full_name,
        role,
    })
}

/// Full guard: session token → user → role → decision
pub async fn guard_view(
    auth: &dyn AuthProvider,
    data: &dyn DataSource,
    token: Option<&str>,
    path: &str,
) -> AccessDecision {
    let user = resolve_session(auth, token).await;
    authorize(data, user.as_ref(), path, required_roles_for(path)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{records::to_row, FixtureBackend};
    use chrono::Utc;

    async fn backend_with(role: Option<Role>) -> (FixtureBackend, AuthUser) {
        let backend = FixtureBackend::empty();
        let user = AuthUser {
            id: "user-1".to_string(),
            email: Some("user@example.com".to_string()),
        };
        if let Some(role) = role {
            let profile = Profile {
                id: user.id.clone(),
                email: user.email.clone(),
                full_name: None,
                role,
                created_at: Utc::now(),
            };
            backend
                .insert(Table::Profiles, to_row(&profile).unwrap())
                .await
                .unwrap();
        }
        (backend, user)
    }

    #[tokio::test]
    async fn test_no_session_goes_to_login() {
        let (backend, _) = backend_with(Some(Role::Investor)).await;
        let decision = authorize(&backend, None, "/dashboard/investor", None).await;
        assert_eq!(decision.redirect_target(), Some("/login"));
    }

    #[tokio::test]
    async fn test_missing_profile_goes_to_login() {
        let (backend, user) = backend_with(None).await;
        let decision = authorize(&backend, Some(&user), "/dashboard/investor", None).await;
        assert_eq!(decision.redirect_target(), Some("/login"));
    }

    #[tokio::test]
    async fn test_fetch_error_goes_to_login() {
        let (backend, user) = backend_with(Some(Role::Investor)).await;
        backend.set_offline(true);
        let decision = authorize(&backend, Some(&user), "/dashboard/investor", None).await;
        assert_eq!(decision.redirect_target(), Some("/login"));
    }

    #[tokio::test]
    async fn test_wrong_prefix_goes_to_landing() {
        let (backend, user) = backend_with(Some(Role::WealthPartner)).await;
        let decision = authorize(&backend, Some(&user), "/dashboard/admin", None).await;
        assert_eq!(decision.redirect_target(), Some("/dashboard/partner"));
    }

    #[tokio::test]
    async fn test_required_roles_enforced() {
        let (backend, user) = backend_with(Some(Role::AdminMaker)).await;
        let path = "/dashboard/admin/approvals";
        let decision = authorize(&backend, Some(&user), path, required_roles_for(path)).await;
        assert_eq!(decision.redirect_target(), Some("/dashboard/admin"));
    }

    #[tokio::test]
    async fn test_render_carries_viewer() {
        let (backend, user) = backend_with(Some(Role::Investor)).await;
        let decision = authorize(&backend, Some(&user), "/dashboard/investor/bonds", None).await;
        match decision {
            AccessDecision::Render(viewer) => {
                assert_eq!(viewer.role, Role::Investor);
                assert_eq!(viewer.email.as_deref(), Some("user@example.com"));
            }
            AccessDecision::Redirect(to) => panic!("unexpected redirect to {}", to),
        }
    }

    #[test]
    fn test_required_roles_lookup() {
        assert_eq!(
            required_roles_for("/dashboard/admin/approvals/"),
            Some(&[Role::AdminChecker][..])
        );
        assert_eq!(required_roles_for("/dashboard/admin"), None);
        assert_eq!(required_roles_for("/nowhere"), None);
    }

    #[test]
    fn test_every_view_route_has_an_owner() {
        for route in VIEW_ROUTES {
            assert!(
                Role::all().iter().any(|r| is_allowed(*r, route.path)),
                "{} is unreachable",
                route.path
            );
        }
    }
}
