//! WealthDesk HTTP API
//!
//! HTTP layer built with Axum.
//!
//! # Endpoints
//!
//! ## Auth
//! - `POST /api/v1/auth/signup` - Create an account with a role
//! - `POST /api/v1/auth/login` - Sign in, sets the session cookie
//! - `POST /api/v1/auth/logout` - Clear the session cookie
//! - `GET /api/v1/auth/me` - Current user
//!
//! ## Investor & Partner
//! - `GET|POST /api/v1/investments` - Own investment requests
//! - `GET /api/v1/bonds` - Bonds on offer
//! - `GET /api/v1/kyc`, `POST /api/v1/kyc/documents` - KYC
//! - `GET|POST /api/v1/referrals` - Partner referrals
//!
//! ## Internal admin handlers (role in `x-user-role`)
//! - `POST /api/admin/investments/status`
//! - `POST /api/admin/kyc/status`
//! - `POST /api/admin/referrals/status`
//! - `POST /api/admin/invites`
//!
//! ## Views
//! - `GET /login`
//! - `GET /dashboard/...` - Guarded dashboard views, see [`VIEW_ROUTES`](crate::auth::VIEW_ROUTES)
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status

pub mod dto;
pub mod error;
pub mod routes;
pub mod session;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use routes::{admin, views};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    // Create shared state
    let shared_state = Arc::new(state);
    let upload_limit = shared_state.config.api.max_upload_bytes;
    let cors = cors_layer(&shared_state.config.api.cors_origins);

    let api_routes = Router::new()
        .route("/auth/signup", post(routes::auth::signup))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/logout", post(routes::auth::logout))
        .route("/auth/me", get(routes::auth::me))
        .route(
            "/investments",
            get(routes::investments::list_investments).post(routes::investments::create_investment),
        )
        .route("/bonds", get(routes::investments::list_bonds))
        .route(
            "/referrals",
            get(routes::referrals::list_referrals).post(routes::referrals::create_referral),
        )
        .route("/kyc", get(routes::kyc::latest_kyc))
        .route(
            "/kyc/documents",
            post(routes::kyc::upload_document).layer(DefaultBodyLimit::max(upload_limit)),
        );

    let admin_routes = Router::new()
        .route(
            "/investments/status",
            post(admin::update_investment_status).fallback(admin::method_not_allowed),
        )
        .route(
            "/kyc/status",
            post(admin::update_kyc_status).fallback(admin::method_not_allowed),
        )
        .route(
            "/referrals/status",
            post(admin::update_referral_status).fallback(admin::method_not_allowed),
        )
        .route(
            "/invites",
            post(admin::create_invite).fallback(admin::method_not_allowed),
        );

    // Paths here must match VIEW_ROUTES
    let view_routes = Router::new()
        .route("/dashboard", get(views::dashboard_root))
        .route("/dashboard/investor", get(views::investor_overview))
        .route("/dashboard/investor/investments", get(views::investor_investments))
        .route("/dashboard/investor/icds", get(views::investor_icds))
        .route("/dashboard/investor/bonds", get(views::investor_bonds))
        .route("/dashboard/investor/kyc", get(views::investor_kyc))
        .route("/dashboard/partner", get(views::partner_overview))
        .route("/dashboard/partner/referrals", get(views::partner_referrals))
        .route("/dashboard/admin", get(views::admin_overview))
        .route("/dashboard/admin/investments", get(views::admin_investments))
        .route("/dashboard/admin/referrals", get(views::admin_referrals))
        .route("/dashboard/admin/kyc", get(views::admin_kyc))
        .route("/dashboard/admin/users", get(views::admin_users))
        .route("/dashboard/admin/approvals", get(views::admin_approvals))
        .route("/dashboard/admin/invites", get(views::admin_invites))
        .route_layer(middleware::from_fn_with_state(
            shared_state.clone(),
            session::view_guard,
        ));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/api/admin", admin_routes)
        .nest("/health", health_routes)
        .route("/login", get(views::login_view))
        .merge(view_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// Permissive when no origins are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Start the API server
pub async fn serve(state: AppState) -> Result<(), ApiError> {
    let addr = state.config.api.addr();
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("WealthDesk API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("WealthDesk API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Role, VIEW_ROUTES};
    use crate::backend::{Backend, FixtureBackend, Table};
    use crate::config::Config;
    use axum::{
        body::Body,
        http::{header, Request, Response, StatusCode},
    };
    use serde_json::Value;
    use tower::util::ServiceExt;

    const INVESTOR_ID: &str = "00000000-0000-4000-8000-000000000001";
    const PARTNER_ID: &str = "00000000-0000-4000-8000-000000000002";
    const MAKER_ID: &str = "00000000-0000-4000-8000-000000000003";
    const CHECKER_ID: &str = "00000000-0000-4000-8000-000000000004";

    fn create_test_app() -> (Router, Arc<FixtureBackend>) {
        let fixture = Arc::new(FixtureBackend::seeded());
        let mut config = Config::default();
        config.registration.profile_fetch_delay_ms = 0;

        let state = AppState::new(Backend::fixture(fixture.clone()), config);
        (build_router(state), fixture)
    }

    fn get_with_token(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str) -> axum::http::request::Builder {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
    }

    fn location(response: &Response<Body>) -> Option<&str> {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    async fn json_body(response: Response<Body>) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_live() {
        let (app, _fixture) = create_test_app();

        let response = app.oneshot(get_with_token("/health/live", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready_follows_backend() {
        let (app, fixture) = create_test_app();

        let response = app
            .clone()
            .oneshot(get_with_token("/health/ready", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        fixture.set_offline(true);
        let response = app.oneshot(get_with_token("/health/ready", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_health_full() {
        let (app, _fixture) = create_test_app();

        let response = app.oneshot(get_with_token("/health", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["backend_mode"], "fixture");
    }

    #[tokio::test]
    async fn test_unauthenticated_view_redirects_to_login() {
        let (app, _fixture) = create_test_app();

        let response = app
            .oneshot(get_with_token("/dashboard/investor", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/login"));
    }

    #[tokio::test]
    async fn test_partner_on_admin_view_redirects_home() {
        let (app, fixture) = create_test_app();
        let token = fixture.issue_session(PARTNER_ID).await;

        let response = app
            .oneshot(get_with_token("/dashboard/admin", Some(&token)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/dashboard/partner"));
    }

    #[tokio::test]
    async fn test_unknown_token_redirects_to_login() {
        let (app, _fixture) = create_test_app();

        let response = app
            .oneshot(get_with_token("/dashboard/partner", Some("stale-token")))
            .await
            .unwrap();

        assert_eq!(location(&response), Some("/login"));
    }

    #[tokio::test]
    async fn test_backend_down_redirects_to_login() {
        let (app, fixture) = create_test_app();
        let token = fixture.issue_session(INVESTOR_ID).await;
        fixture.set_offline(true);

        let response = app
            .oneshot(get_with_token("/dashboard/investor", Some(&token)))
            .await
            .unwrap();

        assert_eq!(location(&response), Some("/login"));
    }

    #[tokio::test]
    async fn test_investor_overview_renders() {
        let (app, fixture) = create_test_app();
        let token = fixture.issue_session(INVESTOR_ID).await;

        let response = app
            .oneshot(get_with_token("/dashboard/investor", Some(&token)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["view"], "investor_overview");
        assert_eq!(body["viewer"]["role"], "Investor");
        assert_eq!(body["data"]["portfolio"]["active"], 1);
        assert_eq!(body["data"]["kyc_status"], "Submitted");
        assert!(body.get("notice").is_none());
    }

    #[tokio::test]
    async fn test_dashboard_root_sends_to_landing() {
        let (app, fixture) = create_test_app();
        let token = fixture.issue_session(CHECKER_ID).await;

        let response = app
            .oneshot(get_with_token("/dashboard", Some(&token)))
            .await
            .unwrap();

        assert_eq!(location(&response), Some("/dashboard/admin"));
    }

    #[tokio::test]
    async fn test_role_restricted_admin_views() {
        let (app, fixture) = create_test_app();
        let maker = fixture.issue_session(MAKER_ID).await;
        let checker = fixture.issue_session(CHECKER_ID).await;

        let response = app
            .clone()
            .oneshot(get_with_token("/dashboard/admin/approvals", Some(&maker)))
            .await
            .unwrap();
        assert_eq!(location(&response), Some("/dashboard/admin"));

        let response = app
            .clone()
            .oneshot(get_with_token("/dashboard/admin/approvals", Some(&checker)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["investments"].as_array().unwrap().len(), 2);
        assert_eq!(body["data"]["kyc"].as_array().unwrap().len(), 1);

        let response = app
            .oneshot(get_with_token("/dashboard/admin/invites", Some(&checker)))
            .await
            .unwrap();
        assert_eq!(location(&response), Some("/dashboard/admin"));
    }

    #[tokio::test]
    async fn test_every_view_route_renders_for_its_owner() {
        let (app, fixture) = create_test_app();
        let ids = [
            (Role::Investor, INVESTOR_ID),
            (Role::WealthPartner, PARTNER_ID),
            (Role::AdminMaker, MAKER_ID),
            (Role::AdminChecker, CHECKER_ID),
        ];

        for route in VIEW_ROUTES {
            let (_, id) = ids
                .iter()
                .find(|(role, _)| {
                    crate::auth::is_allowed(*role, route.path)
                        && route.required_roles.map_or(true, |r| r.contains(role))
                })
                .unwrap();
            let token = fixture.issue_session(id).await;

            let response = app
                .clone()
                .oneshot(get_with_token(route.path, Some(&token)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{}", route.path);
        }
    }

    #[tokio::test]
    async fn test_admin_view_rejects_bad_filter() {
        let (app, fixture) = create_test_app();
        let token = fixture.issue_session(CHECKER_ID).await;

        let response = app
            .oneshot(get_with_token(
                "/dashboard/admin/investments?status=Bogus",
                Some(&token),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_view_lists_demo_accounts() {
        let (app, _fixture) = create_test_app();

        let response = app.oneshot(get_with_token("/login", None)).await.unwrap();

        let body = json_body(response).await;
        assert_eq!(body["view"], "login");
        assert_eq!(body["demo_accounts"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_login_sets_cookie_used_by_views() {
        let (app, _fixture) = create_test_app();

        let response = app
            .clone()
            .oneshot(
                post_json("/api/v1/auth/login")
                    .body(Body::from(
                        r#"{"email": "partner@demo.wealthdesk.in", "password": "demo1234"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .unwrap()
            .to_string();
        let body = json_body(response).await;
        assert_eq!(body["landing_path"], "/dashboard/partner");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/dashboard/partner")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["summary"]["total"], 3);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let (app, _fixture) = create_test_app();

        let response = app
            .oneshot(
                post_json("/api/v1/auth/login")
                    .body(Body::from(
                        r#"{"email": "partner@demo.wealthdesk.in", "password": "nope"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
        assert!(body["request_id"].is_string());
    }

    #[tokio::test]
    async fn test_signup_returns_landing_path() {
        let (app, _fixture) = create_test_app();

        let response = app
            .oneshot(
                post_json("/api/v1/auth/signup")
                    .body(Body::from(
                        r#"{"email": "new@example.com", "password": "secret1", "role": "Wealth Partner"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["landing_path"], "/dashboard/partner");
        assert_eq!(body["profile"]["role"], "Wealth Partner");
    }

    #[tokio::test]
    async fn test_signup_unknown_role() {
        let (app, _fixture) = create_test_app();

        let response = app
            .oneshot(
                post_json("/api/v1/auth/signup")
                    .body(Body::from(
                        r#"{"email": "new@example.com", "password": "secret1", "role": "Superuser"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_me_requires_session() {
        let (app, _fixture) = create_test_app();

        let response = app
            .oneshot(get_with_token("/api/v1/auth/me", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_referral_submission_over_http() {
        let (app, fixture) = create_test_app();
        let token = fixture.issue_session(PARTNER_ID).await;
        let submit = |email: &str| {
            post_json("/api/v1/referrals")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::from(format!(r#"{{"investor_email": "{}"}}"#, email)))
                .unwrap()
        };

        let response = app.clone().oneshot(submit("neha@example.com")).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = json_body(response).await;
        assert_eq!(
            body["error"]["message"],
            "This investor is already assigned to you"
        );

        let response = app.oneshot(submit("fresh@example.com")).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["status"], "pending");
        assert_eq!(fixture.row_count(Table::Referrals).await, 4);
    }

    #[tokio::test]
    async fn test_investor_cannot_create_referral() {
        let (app, fixture) = create_test_app();
        let token = fixture.issue_session(INVESTOR_ID).await;

        let response = app
            .oneshot(
                post_json("/api/v1/referrals")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::from(r#"{"investor_email": "x@example.com"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(fixture.row_count(Table::Referrals).await, 3);
    }

    #[tokio::test]
    async fn test_create_investment_request() {
        let (app, fixture) = create_test_app();
        let token = fixture.issue_session(INVESTOR_ID).await;

        let response = app
            .oneshot(
                post_json("/api/v1/investments")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::from(
                        r#"{"kind": "reit", "amount": 75000, "rate": 8.1, "tenure_months": 24}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["kind"], "reit");
        assert_eq!(body["status"], "Pending");
        assert_eq!(fixture.row_count(Table::ReitRequests).await, 1);
    }

    #[tokio::test]
    async fn test_kyc_document_upload() {
        let (app, fixture) = create_test_app();
        let token = fixture.issue_session(INVESTOR_ID).await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/kyc/documents?file_name=aadhaar.png&document_type=Aadhaar")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .header(header::CONTENT_TYPE, "image/png")
                    .body(Body::from(vec![0x89, b'P', b'N', b'G']))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["status"], "Submitted");
        let key = body["document_path"].as_str().unwrap();
        assert!(fixture.blob(key).await.is_some());
    }

    #[tokio::test]
    async fn test_admin_handler_rejects_other_methods() {
        let (app, _fixture) = create_test_app();

        let response = app
            .oneshot(get_with_token("/api/admin/kyc/status", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "METHOD_NOT_ALLOWED");
    }

    #[tokio::test]
    async fn test_admin_handler_checks_role_header() {
        let (app, _fixture) = create_test_app();
        let body = r#"{"id": "kyc-1", "status": "Approved"}"#;

        let response = app
            .clone()
            .oneshot(
                post_json("/api/admin/kyc/status")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .oneshot(
                post_json("/api/admin/kyc/status")
                    .header(admin::ROLE_HEADER, "Admin Maker")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_handler_presence_checks() {
        let (app, _fixture) = create_test_app();

        let response = app
            .oneshot(
                post_json("/api/admin/referrals/status")
                    .header(admin::ROLE_HEADER, "Admin Checker")
                    .body(Body::from(r#"{"id": "ref-2"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["message"], "Missing required fields: status");
    }

    #[tokio::test]
    async fn test_admin_handler_updates_status() {
        let (app, _fixture) = create_test_app();

        let response = app
            .clone()
            .oneshot(
                post_json("/api/admin/referrals/status")
                    .header(admin::ROLE_HEADER, "Admin Checker")
                    .body(Body::from(
                        r#"{"id": "ref-2", "status": "approved", "commission": 5000}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "approved");

        let response = app
            .oneshot(
                post_json("/api/admin/investments/status")
                    .header(admin::ROLE_HEADER, "Admin Maker")
                    .body(Body::from(
                        r#"{"kind": "icd", "id": "icd-1002", "status": "Active"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_admin_invite() {
        let (app, fixture) = create_test_app();

        let response = app
            .oneshot(
                post_json("/api/admin/invites")
                    .header(admin::ROLE_HEADER, "Admin Maker")
                    .body(Body::from(
                        r#"{"email": "prospect@example.com", "role": "Investor"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(fixture.row_count(Table::Invites).await, 1);
    }

    #[tokio::test]
    async fn test_admin_handler_status_set() {
        let (app, fixture) = create_test_app();
        let checker_post = |uri: &str, body: &'static str| {
            post_json(uri)
                .header(admin::ROLE_HEADER, "Admin Checker")
                .body(Body::from(body))
                .unwrap()
        };

        let response = app
            .clone()
            .oneshot(checker_post(
                "/api/admin/kyc/status",
                r#"{"id": "kyc-unknown", "status": "Approved"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let invite = r#"{"email": "prospect@example.com", "role": "Investor"}"#;
        for expected in [StatusCode::OK, StatusCode::BAD_REQUEST] {
            let response = app
                .clone()
                .oneshot(
                    post_json("/api/admin/invites")
                        .header(admin::ROLE_HEADER, "Admin Maker")
                        .body(Body::from(invite))
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), expected);
        }

        fixture.set_offline(true);
        let response = app
            .oneshot(checker_post(
                "/api/admin/referrals/status",
                r#"{"id": "ref-2", "status": "approved"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
