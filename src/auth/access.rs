//! Path access rules
//!
//! Static map from role to the path prefixes it may open, plus each role's
//! landing path. Every guard goes through [`is_allowed`] and
//! [`landing_path_for`].

use super::roles::Role;

pub const LOGIN_PATH: &str = "/login";
pub const INVESTOR_HOME: &str = "/dashboard/investor";
pub const PARTNER_HOME: &str = "/dashboard/partner";
pub const ADMIN_HOME: &str = "/dashboard/admin";

/// Path prefixes a role may open
pub fn allowed_prefixes(role: Role) -> &'static [&'static str] {
    match role {
        Role::Investor => &[INVESTOR_HOME],
        Role::WealthPartner => &[PARTNER_HOME],
        Role::AdminMaker | Role::AdminChecker => &[ADMIN_HOME],
    }
}

/// True iff `path` starts with one of the role's prefixes
pub fn is_allowed(role: Role, path: &str) -> bool {
    allowed_prefixes(role)
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

/// Canonical landing path for a role
pub fn landing_path_for(role: Role) -> &'static str {
    match role {
        Role::Investor => INVESTOR_HOME,
        Role::WealthPartner => PARTNER_HOME,
        Role::AdminMaker | Role::AdminChecker => ADMIN_HOME,
    }
}

/// [`is_allowed`] over a raw role string; unknown roles open nothing
pub fn validate_role_access(role: &str, path: &str) -> bool {
    role.parse::<Role>()
        .map(|r| is_allowed(r, path))
        .unwrap_or(false)
}

/// [`landing_path_for`] over a raw role string; unknown roles go to login
pub fn get_redirect_path(role: &str) -> &'static str {
    role.parse::<Role>()
        .map(landing_path_for)
        .unwrap_or(LOGIN_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_role_access() {
        assert!(validate_role_access("Investor", "/dashboard/investor/icds"));
        assert!(validate_role_access("Investor", "/dashboard/investor"));
        assert!(!validate_role_access("Investor", "/dashboard/admin"));
        assert!(!validate_role_access("Investor", "/dashboard/partner"));
        assert!(validate_role_access("Wealth Partner", "/dashboard/partner/referrals"));
        assert!(validate_role_access("Admin Maker", "/dashboard/admin/kyc"));
        assert!(validate_role_access("Admin Checker", "/dashboard/admin"));
        assert!(!validate_role_access("Admin Checker", "/dashboard/investor"));
        assert!(!validate_role_access("Unknown", "/dashboard/investor"));
    }

    #[test]
    fn test_access_is_prefix_match_for_every_role() {
        let paths = [
            "/dashboard/investor",
            "/dashboard/investor/bonds",
            "/dashboard/partner",
            "/dashboard/admin/approvals",
            "/login",
            "/",
        ];
        for role in Role::all() {
            for path in paths {
                let expected = allowed_prefixes(*role).iter().any(|p| path.starts_with(p));
                assert_eq!(is_allowed(*role, path), expected, "{} {}", role, path);
            }
        }
    }

    #[test]
    fn test_get_redirect_path() {
        assert_eq!(get_redirect_path("Investor"), "/dashboard/investor");
        assert_eq!(get_redirect_path("Wealth Partner"), "/dashboard/partner");
        assert_eq!(get_redirect_path("Admin Maker"), "/dashboard/admin");
        assert_eq!(get_redirect_path("Admin Checker"), "/dashboard/admin");
        assert_eq!(get_redirect_path(""), "/login");
        assert_eq!(get_redirect_path("wealth partner"), "/login");
    }

    #[test]
    fn test_landing_path_is_always_allowed() {
        for role in Role::all() {
            assert!(is_allowed(*role, landing_path_for(*role)));
        }
    }
}
