//! Roles and permission strings

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Role stored on a profile row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Investor")]
    Investor,
    #[serde(rename = "Wealth Partner")]
    WealthPartner,
    #[serde(rename = "Admin Maker")]
    AdminMaker,
    #[serde(rename = "Admin Checker")]
    AdminChecker,
}

impl Role {
    pub fn all() -> &'static [Role] {
        &[
            Role::Investor,
            Role::WealthPartner,
            Role::AdminMaker,
            Role::AdminChecker,
        ]
    }

    /// Role string exactly as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Investor => "Investor",
            Role::WealthPartner => "Wealth Partner",
            Role::AdminMaker => "Admin Maker",
            Role::AdminChecker => "Admin Checker",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::AdminMaker | Role::AdminChecker)
    }

    /// Permission strings granted to this role
    pub fn permissions(&self) -> &'static [Permission] {
        use Permission::*;
        match self {
            Role::Investor => &[
                ViewInvestments,
                CreateInvestmentRequest,
                SubmitKyc,
                ViewBonds,
            ],
            Role::WealthPartner => &[ViewReferrals, CreateReferral, ViewBonds],
            Role::AdminMaker => &[ViewAll, CreateInvite, UpdateInvestmentStatus, ViewBonds],
            Role::AdminChecker => &[
                ViewAll,
                UpdateInvestmentStatus,
                UpdateKycStatus,
                UpdateReferralStatus,
                ViewBonds,
            ],
        }
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    /// Exact match on the stored role string
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::all()
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("Unknown role: {}", s))
    }
}

/// Permission strings checked by the admin handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ViewInvestments,
    CreateInvestmentRequest,
    SubmitKyc,
    ViewBonds,
    ViewReferrals,
    CreateReferral,
    ViewAll,
    CreateInvite,
    UpdateInvestmentStatus,
    UpdateKycStatus,
    UpdateReferralStatus,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ViewInvestments => "view_investments",
            Permission::CreateInvestmentRequest => "create_investment_request",
            Permission::SubmitKyc => "submit_kyc",
            Permission::ViewBonds => "view_bonds",
            Permission::ViewReferrals => "view_referrals",
            Permission::CreateReferral => "create_referral",
            Permission::ViewAll => "view_all",
            Permission::CreateInvite => "create_invite",
            Permission::UpdateInvestmentStatus => "update_investment_status",
            Permission::UpdateKycStatus => "update_kyc_status",
            Permission::UpdateReferralStatus => "update_referral_status",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permission check on a raw role string, as sent in the role header.
/// Unknown roles have no permissions.
pub fn role_has_permission(role: &str, permission: Permission) -> bool {
    role.parse::<Role>()
        .map(|r| r.has_permission(permission))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_through_strings() {
        for role in Role::all() {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), *role);
        }
        assert!("investor".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_uses_display_names() {
        let json = serde_json::to_string(&Role::WealthPartner).unwrap();
        assert_eq!(json, "\"Wealth Partner\"");
        let role: Role = serde_json::from_str("\"Admin Checker\"").unwrap();
        assert_eq!(role, Role::AdminChecker);
    }

    #[test]
    fn test_maker_checker_split() {
        assert!(role_has_permission("Admin Checker", Permission::UpdateKycStatus));
        assert!(!role_has_permission("Admin Maker", Permission::UpdateKycStatus));
        assert!(role_has_permission("Admin Maker", Permission::CreateInvite));
        assert!(!role_has_permission("Admin Checker", Permission::CreateInvite));
    }

    #[test]
    fn test_unknown_role_has_no_permissions() {
        assert!(!role_has_permission("Superuser", Permission::ViewBonds));
        assert!(!role_has_permission("", Permission::ViewBonds));
    }

    #[test]
    fn test_investor_cannot_refer() {
        assert!(!Role::Investor.has_permission(Permission::CreateReferral));
        assert!(Role::WealthPartner.has_permission(Permission::CreateReferral));
    }
}
