//! Authorization
//!
//! Role strings, the permission table, path access rules and the route guard.
//! Every page guard and handler permission check goes through this module.

pub mod access;
pub mod guard;
pub mod roles;

pub use access::{
    get_redirect_path, is_allowed, landing_path_for, validate_role_access, ADMIN_HOME,
    INVESTOR_HOME, LOGIN_PATH, PARTNER_HOME,
};
pub use guard::{
    authorize, guard_view, load_profile, required_roles_for, resolve_session, AccessDecision,
    ViewRoute, Viewer, VIEW_ROUTES,
};
pub use roles::{role_has_permission, Permission, Role};
