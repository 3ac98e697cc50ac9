//! Dashboard Views
//!
//! JSON view models for the role dashboards. Every route here sits behind
//! [`view_guard`](crate::api::session::view_guard), which has already
//! resolved the [`Viewer`] or redirected.
//!
//! A backend failure while loading a view does not fail the page: the
//! affected listing is rendered empty and a `notice` names what is missing.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Redirect,
    Extension, Json,
};
use serde::Serialize;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use crate::api::dto::{
    AdminOverview, ApprovalsView, BondsView, InvestmentsView, InvestorOverview, InvitesView,
    KycView, ListFilter, LoginView, ReferralsView, UsersView, ViewResponse,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::auth::{Role, Viewer, LOGIN_PATH};
use crate::backend::{demo_logins, records, Query as RowQuery, Table};
use crate::config::BackendMode;
use crate::models::{
    InvestmentKind, InvestmentRequest, InvestmentStatus, KycRequest, KycStatus, Notification,
    Profile, Referral, ReferralStatus, UserRecord,
};
use crate::services::{InvestmentEntry, PortfolioSummary, ReferralSummary};

const RECENT_ITEMS: usize = 5;

/// Collects the parts of a view that could not be loaded
#[derive(Default)]
struct Degraded {
    missing: Vec<&'static str>,
}

impl Degraded {
    fn take<T: Default, E: Display>(&mut self, what: &'static str, result: Result<T, E>) -> T {
        match result {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(part = what, error = %e, "View data unavailable");
                self.missing.push(what);
                T::default()
            }
        }
    }

    fn respond<T: Serialize>(self, view: &'static str, viewer: Viewer, data: T) -> Json<ViewResponse<T>> {
        let notice = (!self.missing.is_empty()).then(|| {
            format!(
                "Some information could not be loaded right now: {}",
                self.missing.join(", ")
            )
        });
        Json(ViewResponse {
            view,
            viewer,
            data,
            notice,
        })
    }
}

fn parse_filter<T>(value: Option<String>) -> ApiResult<Option<T>>
where
    T: FromStr<Err = String>,
{
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.parse::<T>())
        .transpose()
        .map_err(ApiError::Validation)
}

fn filter_params(params: Result<Query<ListFilter>, QueryRejection>) -> ApiResult<ListFilter> {
    params
        .map(|Query(filter)| filter)
        .map_err(|e| ApiError::Validation(e.body_text()))
}

// ============================================
// LOGIN & ROOT
// ============================================

/// GET /login
pub async fn login_view(State(state): State<Arc<AppState>>) -> Json<LoginView> {
    let demo_accounts = match state.backend.mode {
        BackendMode::Fixture => demo_logins(),
        BackendMode::Remote => Vec::new(),
    };
    Json(LoginView {
        view: "login",
        signup_roles: Role::all().iter().map(|r| r.as_str()).collect(),
        demo_accounts,
    })
}

/// GET /dashboard
///
/// The guard sends every visitor on to their landing path, so this only
/// answers if routing changes.
pub async fn dashboard_root() -> Redirect {
    Redirect::to(LOGIN_PATH)
}

// ============================================
// INVESTOR
// ============================================

/// GET /dashboard/investor
pub async fn investor_overview(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
) -> Json<ViewResponse<InvestorOverview>> {
    let mut degraded = Degraded::default();

    let requests = degraded.take(
        "investments",
        state.investments.list_for_investor(&viewer.user_id).await,
    );
    let holdings = degraded.take("holdings", state.investments.holdings(&viewer.user_id).await);
    let kyc = degraded.take("kyc", state.kyc.latest_for_user(&viewer.user_id).await);
    let notifications: Vec<Notification> = degraded.take(
        "notifications",
        records::fetch_all(
            state.backend.data.as_ref(),
            &RowQuery::table(Table::Notifications).eq("user_id", viewer.user_id.as_str()),
        )
        .await,
    );

    let data = InvestorOverview {
        portfolio: PortfolioSummary::from_entries(&requests),
        recent_requests: requests.into_iter().take(RECENT_ITEMS).collect(),
        holdings,
        kyc_status: kyc.map(|k| k.status),
        unread_notifications: notifications.iter().filter(|n| !n.read).count(),
    };
    degraded.respond("investor_overview", viewer, data)
}

/// GET /dashboard/investor/investments
pub async fn investor_investments(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
) -> Json<ViewResponse<InvestmentsView>> {
    let mut degraded = Degraded::default();
    let requests = degraded.take(
        "investments",
        state.investments.list_for_investor(&viewer.user_id).await,
    );
    let data = InvestmentsView {
        summary: PortfolioSummary::from_entries(&requests),
        requests,
    };
    degraded.respond("investor_investments", viewer, data)
}

/// GET /dashboard/investor/icds
pub async fn investor_icds(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
) -> Json<ViewResponse<InvestmentsView>> {
    let mut degraded = Degraded::default();
    let requests: Vec<InvestmentRequest> = degraded.take(
        "icds",
        records::fetch_all(
            state.backend.data.as_ref(),
            &RowQuery::table(Table::Icds)
                .eq("investor_id", viewer.user_id.as_str())
                .order_desc("created_at"),
        )
        .await,
    );
    let requests: Vec<InvestmentEntry> = requests
        .into_iter()
        .map(|request| InvestmentEntry {
            kind: InvestmentKind::Icd,
            request,
        })
        .collect();
    let data = InvestmentsView {
        summary: PortfolioSummary::from_entries(&requests),
        requests,
    };
    degraded.respond("investor_icds", viewer, data)
}

/// GET /dashboard/investor/bonds
pub async fn investor_bonds(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
) -> Json<ViewResponse<BondsView>> {
    let mut degraded = Degraded::default();
    let bonds = degraded.take("bonds", state.investments.list_bonds().await);
    let requests: Vec<InvestmentEntry> = degraded.take(
        "bond requests",
        state.investments.list_for_investor(&viewer.user_id).await,
    );
    let data = BondsView {
        bonds,
        requests: requests
            .into_iter()
            .filter(|e| e.kind == InvestmentKind::Bond)
            .collect(),
    };
    degraded.respond("investor_bonds", viewer, data)
}

/// GET /dashboard/investor/kyc
pub async fn investor_kyc(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
) -> Json<ViewResponse<KycView>> {
    let mut degraded = Degraded::default();
    let latest = degraded.take("kyc", state.kyc.latest_for_user(&viewer.user_id).await);
    degraded.respond("investor_kyc", viewer, KycView { latest })
}

// ============================================
// PARTNER
// ============================================

async fn partner_referrals_for(
    state: &AppState,
    viewer: &Viewer,
    degraded: &mut Degraded,
) -> Vec<Referral> {
    match viewer.email.as_deref() {
        Some(email) => degraded.take("referrals", state.referrals.list_for_partner(email).await),
        None => Vec::new(),
    }
}

/// GET /dashboard/partner
pub async fn partner_overview(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
) -> Json<ViewResponse<ReferralsView>> {
    let mut degraded = Degraded::default();
    let referrals = partner_referrals_for(&state, &viewer, &mut degraded).await;
    let data = ReferralsView {
        summary: ReferralSummary::from_referrals(&referrals),
        referrals: referrals.into_iter().take(RECENT_ITEMS).collect(),
    };
    degraded.respond("partner_overview", viewer, data)
}

/// GET /dashboard/partner/referrals
pub async fn partner_referrals(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
) -> Json<ViewResponse<ReferralsView>> {
    let mut degraded = Degraded::default();
    let referrals = partner_referrals_for(&state, &viewer, &mut degraded).await;
    let data = ReferralsView {
        summary: ReferralSummary::from_referrals(&referrals),
        referrals,
    };
    degraded.respond("partner_referrals", viewer, data)
}

// ============================================
// ADMIN
// ============================================

/// GET /dashboard/admin
pub async fn admin_overview(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
) -> Json<ViewResponse<AdminOverview>> {
    let mut degraded = Degraded::default();

    let pending_investments = degraded.take(
        "investments",
        state
            .investments
            .list(None, Some(InvestmentStatus::Pending))
            .await,
    );
    let kyc = degraded.take("kyc", state.kyc.list(Some(KycStatus::Submitted)).await);
    let referrals = degraded.take(
        "referrals",
        state.referrals.list(Some(ReferralStatus::Pending)).await,
    );
    let users: Vec<UserRecord> = degraded.take(
        "users",
        records::fetch_all(state.backend.data.as_ref(), &RowQuery::table(Table::Users)).await,
    );

    let data = AdminOverview {
        pending_investments: pending_investments.len(),
        kyc_awaiting_review: kyc.len(),
        pending_referrals: referrals.len(),
        users: users.len(),
        permissions: viewer.role.permissions().iter().map(|p| p.as_str()).collect(),
    };
    degraded.respond("admin_overview", viewer, data)
}

/// GET /dashboard/admin/investments?kind=&status=
pub async fn admin_investments(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
    params: Result<Query<ListFilter>, QueryRejection>,
) -> ApiResult<Json<ViewResponse<Vec<InvestmentEntry>>>> {
    let filter = filter_params(params)?;
    let kind = parse_filter::<InvestmentKind>(filter.kind)?;
    let status = parse_filter::<InvestmentStatus>(filter.status)?;

    let mut degraded = Degraded::default();
    let entries = degraded.take("investments", state.investments.list(kind, status).await);
    Ok(degraded.respond("admin_investments", viewer, entries))
}

/// GET /dashboard/admin/referrals?status=
pub async fn admin_referrals(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
    params: Result<Query<ListFilter>, QueryRejection>,
) -> ApiResult<Json<ViewResponse<ReferralsView>>> {
    let status = parse_filter::<ReferralStatus>(filter_params(params)?.status)?;

    let mut degraded = Degraded::default();
    let referrals = degraded.take("referrals", state.referrals.list(status).await);
    let data = ReferralsView {
        summary: ReferralSummary::from_referrals(&referrals),
        referrals,
    };
    Ok(degraded.respond("admin_referrals", viewer, data))
}

/// GET /dashboard/admin/kyc?status=
pub async fn admin_kyc(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
    params: Result<Query<ListFilter>, QueryRejection>,
) -> ApiResult<Json<ViewResponse<Vec<KycRequest>>>> {
    let status = parse_filter::<KycStatus>(filter_params(params)?.status)?;

    let mut degraded = Degraded::default();
    let requests = degraded.take("kyc", state.kyc.list(status).await);
    Ok(degraded.respond("admin_kyc", viewer, requests))
}

/// GET /dashboard/admin/users
pub async fn admin_users(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
) -> Json<ViewResponse<UsersView>> {
    let data_source = state.backend.data.as_ref();
    let mut degraded = Degraded::default();

    let users: Vec<UserRecord> = degraded.take(
        "users",
        records::fetch_all(data_source, &RowQuery::table(Table::Users).order_desc("created_at"))
            .await,
    );
    let profiles: Vec<Profile> = degraded.take(
        "profiles",
        records::fetch_all(
            data_source,
            &RowQuery::table(Table::Profiles).order_desc("created_at"),
        )
        .await,
    );
    degraded.respond("admin_users", viewer, UsersView { users, profiles })
}

/// GET /dashboard/admin/approvals (Admin Checker)
pub async fn admin_approvals(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
) -> Json<ViewResponse<ApprovalsView>> {
    let mut degraded = Degraded::default();
    let data = ApprovalsView {
        investments: degraded.take(
            "investments",
            state
                .investments
                .list(None, Some(InvestmentStatus::Pending))
                .await,
        ),
        kyc: degraded.take("kyc", state.kyc.list(Some(KycStatus::Submitted)).await),
        referrals: degraded.take(
            "referrals",
            state.referrals.list(Some(ReferralStatus::Pending)).await,
        ),
    };
    degraded.respond("admin_approvals", viewer, data)
}

/// GET /dashboard/admin/invites (Admin Maker)
pub async fn admin_invites(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
) -> Json<ViewResponse<InvitesView>> {
    let mut degraded = Degraded::default();
    let invites = degraded.take("invites", state.invites.list().await);
    degraded.respond("admin_invites", viewer, InvitesView { invites })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degraded_notice() {
        let mut degraded = Degraded::default();
        let ok: Vec<u32> = degraded.take("a", Ok::<_, String>(vec![1]));
        let failed: Vec<u32> = degraded.take("bonds", Err::<Vec<u32>, _>("down"));
        assert_eq!(ok, vec![1]);
        assert!(failed.is_empty());

        let viewer = Viewer {
            user_id: "u".into(),
            email: None,
            full_name: None,
            role: Role::Investor,
        };
        let Json(response) = degraded.respond("test", viewer, ());
        assert!(response.notice.unwrap().contains("bonds"));
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_filter::<KycStatus>(Some("submitted".into())).unwrap(),
            Some(KycStatus::Submitted)
        );
        assert_eq!(parse_filter::<KycStatus>(Some(" ".into())).unwrap(), None);
        assert!(parse_filter::<KycStatus>(Some("bogus".into())).is_err());
    }
}
