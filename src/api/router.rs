//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Middleware stack (outermost → innermost):
//! 1. Trace + CORS → 2. Rate limiter → 3. Auth validator → 4. Audit logger

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

/// Build router from a pre-constructed `ApiContext`.
pub fn api_router_with_ctx(ctx: ApiContext) -> Router {
    build_router(ctx)
}

fn build_router(ctx: ApiContext) -> Router {
    // Layers are applied from bottom (innermost) to top (outermost):
    //   Extension (outermost) → Rate limit → Auth → Audit (innermost) → Handler
    //
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/auth/logout", post(endpoints::auth::logout))
        .route("/auth/me", get(endpoints::auth::me))
        .route("/triage/classify", post(endpoints::triage::classify))
        .route(
            "/reports",
            get(endpoints::reports::list).post(endpoints::reports::create),
        )
        .route(
            "/reports/:id",
            get(endpoints::reports::detail).delete(endpoints::reports::delete),
        )
        .route(
            "/reports/:id/transitions",
            post(endpoints::reports::transition),
        )
        .route(
            "/users",
            get(endpoints::users::list).post(endpoints::users::create),
        )
        .route("/users/response-teams", get(endpoints::users::response_teams))
        .route("/users/:id/status", put(endpoints::users::set_status))
        .route("/analytics/summary", get(endpoints::analytics::summary))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(axum::middleware::from_fn(middleware::rate::limit))
        .layer(axum::Extension(ctx.clone()));

    // Unprotected routes (rate-limited only, no auth required)
    let unprotected = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/auth/login", post(endpoints::auth::login))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::rate::limit))
        .layer(axum::Extension(ctx));

    Router::new()
        .nest("/api", protected)
        .nest("/api", unprotected)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::api::types::RateLimiter;
    use crate::models::enums::Role;
    use crate::models::User;
    use crate::notification::LogNotifier;
    use crate::users::{register_user, NewUser};

    const PASSWORD: &str = "ambulans-siaga";

    struct TestApp {
        app: Router,
        core: Arc<CoreState>,
    }

    impl TestApp {
        fn new() -> Self {
            let core = Arc::new(CoreState::in_memory(Arc::new(LogNotifier)).unwrap());
            Self {
                app: api_router(core.clone()),
                core,
            }
        }

        fn with_ctx(ctx: ApiContext) -> Self {
            Self {
                core: ctx.core.clone(),
                app: api_router_with_ctx(ctx),
            }
        }

        fn user(&self, name: &str, role: Role) -> User {
            register_user(
                self.core.store(),
                NewUser {
                    name: name.into(),
                    email: format!("{}@dinkes.test", name.to_lowercase()),
                    phone: "0812-3456-7890".into(),
                    role,
                    expertise: None,
                    address: None,
                    password: PASSWORD.into(),
                },
            )
            .unwrap()
        }

        async fn send(
            &self,
            method: &str,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            self.send_raw(method, uri, token, body.map(|json| json.to_string()))
                .await
        }

        async fn send_raw(
            &self,
            method: &str,
            uri: &str,
            token: Option<&str>,
            body: Option<String>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(t) = token {
                builder = builder.header("Authorization", format!("Bearer {t}"));
            }
            let req = match body {
                Some(text) => builder
                    .header("Content-Type", "application/json")
                    .body(Body::from(text))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.app.clone().oneshot(req).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
                .await
                .unwrap();
            let json = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, json)
        }

        async fn login(&self, user: &User) -> String {
            let (status, body) = self
                .send(
                    "POST",
                    "/api/auth/login",
                    None,
                    Some(json!({ "email": user.email, "password": PASSWORD })),
                )
                .await;
            assert_eq!(status, StatusCode::OK, "{body}");
            body["token"].as_str().unwrap().to_string()
        }

        async fn transition(&self, token: &str, id: &str, body: Value) -> (StatusCode, Value) {
            self.send(
                "POST",
                &format!("/api/reports/{id}/transitions"),
                Some(token),
                Some(body),
            )
            .await
        }
    }

    fn report_form(description: &str) -> Value {
        json!({
            "patient_name": "Ny. Siti Aminah",
            "patient_age": 65,
            "location": "Jl. Melati No. 45",
            "description": description,
            "urgent_needs": ["Oksigen"]
        })
    }

    #[tokio::test]
    async fn health_is_public() {
        let t = TestApp::new();
        let (status, body) = t.send("GET", "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], crate::config::APP_VERSION);
    }

    #[tokio::test]
    async fn protected_routes_require_token() {
        let t = TestApp::new();
        let (status, body) = t.send("GET", "/api/reports", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "AUTH_REQUIRED");

        let (status, _) = t.send("GET", "/api/reports", Some("bogus"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let t = TestApp::new();
        let user = t.user("Budi", Role::Citizen);
        let (status, body) = t
            .send(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": user.email, "password": "salah" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn login_me_logout() {
        let t = TestApp::new();
        let user = t.user("Budi", Role::Citizen);
        let token = t.login(&user).await;

        let (status, body) = t.send("GET", "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "citizen");
        assert!(body.get("credential_hash").is_none());

        let (status, _) = t.send("POST", "/api/auth/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = t.send("GET", "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn classify_endpoint() {
        let t = TestApp::new();
        let user = t.user("Budi", Role::Citizen);
        let token = t.login(&user).await;

        let (status, body) = t
            .send(
                "POST",
                "/api/triage/classify",
                Some(&token),
                Some(json!({ "description": "ibu hamil mau melahirkan" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["category"], "pregnancy_childbirth");
        assert_eq!(body["category_label"], "Pregnancy/Childbirth");
        assert_eq!(body["urgency"], "urgent");
        assert_eq!(body["classified"], true);

        let (_, body) = t
            .send(
                "POST",
                "/api/triage/classify",
                Some(&token),
                Some(json!({ "description": "luka" })),
            )
            .await;
        assert_eq!(body["classified"], false);
        assert_eq!(body["urgency"], "stable");
    }

    #[tokio::test]
    async fn report_lifecycle_over_http() {
        let t = TestApp::new();
        let citizen = t.user("Budi", Role::Citizen);
        let dispatcher = t.user("Admin", Role::Dispatcher);
        let team = t.user("Alpha", Role::ResponseTeam);
        let other_team = t.user("Bravo", Role::ResponseTeam);

        let citizen_token = t.login(&citizen).await;
        let dispatcher_token = t.login(&dispatcher).await;
        let team_token = t.login(&team).await;
        let other_token = t.login(&other_team).await;

        let (status, report) = t
            .send(
                "POST",
                "/api/reports",
                Some(&citizen_token),
                Some(report_form("pasien sesak napas dan tidak sadar")),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{report}");
        assert_eq!(report["status"], "awaiting_triage");
        assert_eq!(report["urgency"], "critical");
        assert_eq!(report["category"], "general_emergency");
        let id = report["id"].as_str().unwrap().to_string();

        // Citizens hold no transition rights.
        let (status, _) = t
            .transition(
                &citizen_token,
                &id,
                json!({ "transition": "cancel", "expected_status": "awaiting_triage" }),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        // Approve without a volunteer.
        let (status, body) = t
            .transition(
                &dispatcher_token,
                &id,
                json!({ "transition": "approve", "expected_status": "awaiting_triage" }),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "MISSING_REQUIRED_FIELD");

        let (status, approved) = t
            .transition(
                &dispatcher_token,
                &id,
                json!({
                    "transition": "approve",
                    "expected_status": "awaiting_triage",
                    "volunteer_id": team.id,
                    "note": "Tim Alpha terdekat"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{approved}");
        assert_eq!(approved["status"], "approved");
        assert_eq!(approved["assigned_volunteer_id"], team.id.to_string());

        // Same call again with the now-stale status.
        let (status, body) = t
            .transition(
                &dispatcher_token,
                &id,
                json!({
                    "transition": "approve",
                    "expected_status": "awaiting_triage",
                    "volunteer_id": team.id
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "INVALID_TRANSITION");

        let (status, _) = t
            .transition(
                &other_token,
                &id,
                json!({ "transition": "depart_to_scene", "expected_status": "approved" }),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        for (transition, from) in [
            ("depart_to_scene", "approved"),
            ("arrive_on_scene", "en_route_to_scene"),
            ("depart_to_hospital", "on_scene"),
        ] {
            let (status, body) = t
                .transition(
                    &team_token,
                    &id,
                    json!({ "transition": transition, "expected_status": from }),
                )
                .await;
            assert_eq!(status, StatusCode::OK, "{transition}: {body}");
        }

        let (_, detail) = t
            .send("GET", &format!("/api/reports/{id}"), Some(&team_token), None)
            .await;
        assert_eq!(detail["status"], "en_route_to_hospital");
        assert_eq!(detail["allowed_transitions"], json!(["complete", "cancel"]));

        // Hand-over without a photo: rights first, then the payload.
        let no_photo = json!({
            "transition": "complete",
            "expected_status": "en_route_to_hospital",
            "volunteer_report": { "action_taken": "Oksigen diberikan" }
        });
        let (status, _) = t.transition(&other_token, &id, no_photo.clone()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, body) = t.transition(&team_token, &id, no_photo).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "MISSING_REQUIRED_FIELD");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("volunteer_report.photo"));

        let (status, body) = t
            .transition(
                &team_token,
                &id,
                json!({ "transition": "teleport", "expected_status": "en_route_to_hospital" }),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "INVALID_TRANSITION");

        let (status, completed) = t
            .transition(
                &team_token,
                &id,
                json!({
                    "transition": "complete",
                    "expected_status": "en_route_to_hospital",
                    "volunteer_report": {
                        "action_taken": "Oksigen diberikan, diserahkan ke IGD",
                        "hospital_name": "RSUD Kota",
                        "photo": "upload://handover-1.jpg"
                    }
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{completed}");
        assert_eq!(completed["status"], "completed");
        assert_eq!(
            completed["admin_notes"].as_str().unwrap().lines().count(),
            6
        );

        let (status, body) = t
            .transition(
                &dispatcher_token,
                &id,
                json!({ "transition": "cancel", "expected_status": "completed" }),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "TERMINAL_STATE");

        let (status, body) = t
            .transition(
                &dispatcher_token,
                &id,
                json!({ "transition": "teleport", "expected_status": "completed" }),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "TERMINAL_STATE");

        // Reporter still sees the finished report.
        let (status, body) = t
            .send("GET", &format!("/api/reports/{id}"), Some(&citizen_token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["volunteer_report"]["hospital_name"], "RSUD Kota");
        assert_eq!(body["allowed_transitions"], json!([]));
    }

    #[tokio::test]
    async fn malformed_bodies_keep_error_shape() {
        let t = TestApp::new();
        let budi = t.user("Budi", Role::Citizen);
        let token = t.login(&budi).await;

        let (status, body) = t
            .send_raw("POST", "/api/auth/login", None, Some("{not json".into()))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");

        let (status, body) = t
            .send("POST", "/api/triage/classify", Some(&token), Some(json!({})))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "INVALID_BODY");

        let (status, body) = t
            .send(
                "POST",
                "/api/reports/MED-20260320-0001/transitions",
                Some(&token),
                Some(json!({ "transition": "cancel", "expected_status": "lost" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "INVALID_BODY");

        let (status, body) = t
            .send("GET", "/api/reports?status=lost", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn unknown_transition_on_missing_report_is_not_found() {
        let t = TestApp::new();
        let dispatcher = t.user("Admin", Role::Dispatcher);
        let token = t.login(&dispatcher).await;

        let (status, body) = t
            .transition(
                &token,
                "MED-00000000-0000",
                json!({ "transition": "teleport", "expected_status": "approved" }),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn visibility_and_roles() {
        let t = TestApp::new();
        let budi = t.user("Budi", Role::Citizen);
        let sari = t.user("Sari", Role::Citizen);
        let dispatcher = t.user("Admin", Role::Dispatcher);
        let leader = t.user("Kadinkes", Role::Leadership);

        let budi_token = t.login(&budi).await;
        let sari_token = t.login(&sari).await;
        let dispatcher_token = t.login(&dispatcher).await;
        let leader_token = t.login(&leader).await;

        let (_, report) = t
            .send(
                "POST",
                "/api/reports",
                Some(&budi_token),
                Some(report_form("kaki patah jatuh dari motor")),
            )
            .await;
        let id = report["id"].as_str().unwrap().to_string();

        let (status, _) = t
            .send("GET", &format!("/api/reports/{id}"), Some(&sari_token), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, list) = t.send("GET", "/api/reports", Some(&sari_token), None).await;
        assert_eq!(list.as_array().unwrap().len(), 0);

        let (_, list) = t
            .send("GET", "/api/reports?category=accident", Some(&leader_token), None)
            .await;
        assert_eq!(list.as_array().unwrap().len(), 1);

        // Dispatchers cannot submit; leadership cannot delete.
        let (status, _) = t
            .send(
                "POST",
                "/api/reports",
                Some(&dispatcher_token),
                Some(report_form("pasien tidak sadar")),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = t
            .send("DELETE", &format!("/api/reports/{id}"), Some(&leader_token), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, summary) = t
            .send("GET", "/api/analytics/summary", Some(&leader_token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["total_reports"], 1);
        assert_eq!(summary["by_category"]["accident"], 1);

        let (status, _) = t
            .send("GET", "/api/analytics/summary", Some(&budi_token), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = t
            .send("DELETE", &format!("/api/reports/{id}"), Some(&dispatcher_token), None)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = t
            .send("GET", &format!("/api/reports/{id}"), Some(&dispatcher_token), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_required_field_on_submit() {
        let t = TestApp::new();
        let budi = t.user("Budi", Role::Citizen);
        let token = t.login(&budi).await;

        let mut form = report_form("pasien tidak sadar");
        form["location"] = json!("  ");
        let (status, body) = t.send("POST", "/api/reports", Some(&token), Some(form)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "MISSING_REQUIRED_FIELD");
    }

    #[tokio::test]
    async fn user_admin_and_deactivation() {
        let t = TestApp::new();
        let dispatcher = t.user("Admin", Role::Dispatcher);
        let token = t.login(&dispatcher).await;

        let (status, created) = t
            .send(
                "POST",
                "/api/users",
                Some(&token),
                Some(json!({
                    "name": "Tim Charlie",
                    "email": "charlie@dinkes.test",
                    "phone": "0813-0000-1111",
                    "role": "response_team",
                    "expertise": "Advanced Life Support (ALS)",
                    "password": PASSWORD
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{created}");
        let team_id = created["id"].as_str().unwrap().to_string();

        let (status, _) = t
            .send(
                "POST",
                "/api/users",
                Some(&token),
                Some(json!({
                    "name": "Duplikat",
                    "email": "CHARLIE@dinkes.test",
                    "role": "citizen",
                    "password": PASSWORD
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, teams) = t
            .send("GET", "/api/users/response-teams", Some(&token), None)
            .await;
        assert_eq!(teams.as_array().unwrap().len(), 1);

        // Team logs in, then gets deactivated: its session stops working.
        let team_user = t
            .core
            .store()
            .find_credential("charlie@dinkes.test")
            .unwrap()
            .unwrap()
            .0;
        let team_token = t.login(&team_user).await;

        let (status, body) = t
            .send(
                "PUT",
                &format!("/api/users/{team_id}/status"),
                Some(&token),
                Some(json!({ "status": "inactive" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "inactive");

        let (status, _) = t.send("GET", "/api/auth/me", Some(&team_token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = t
            .send("GET", "/api/users?role=response_team&status=active", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = t.send("GET", "/api/users", Some(&team_token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn rate_limit_returns_429() {
        let core = Arc::new(CoreState::in_memory(Arc::new(LogNotifier)).unwrap());
        let ctx = ApiContext::new(core);
        *ctx.rate_limiter.lock().unwrap() = RateLimiter::with_limits(2, Duration::from_secs(60));
        let t = TestApp::with_ctx(ctx);

        assert_eq!(t.send("GET", "/api/health", None, None).await.0, StatusCode::OK);
        assert_eq!(t.send("GET", "/api/health", None, None).await.0, StatusCode::OK);
        let (status, body) = t.send("GET", "/api/health", None, None).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"]["code"], "RATE_LIMITED");
    }

    #[tokio::test]
    async fn made_up_tokens_share_the_anonymous_budget() {
        let core = Arc::new(CoreState::in_memory(Arc::new(LogNotifier)).unwrap());
        let ctx = ApiContext::new(core);
        *ctx.rate_limiter.lock().unwrap() = RateLimiter::with_limits(2, Duration::from_secs(60));
        let t = TestApp::with_ctx(ctx.clone());

        let mut statuses = Vec::new();
        for i in 0..10 {
            let (status, _) = t
                .send(
                    "POST",
                    "/api/auth/login",
                    Some(&format!("forged-{i}")),
                    Some(json!({ "email": "x@dinkes.test", "password": "salah-salah" })),
                )
                .await;
            statuses.push(status);
        }
        assert_eq!(&statuses[..2], &[StatusCode::UNAUTHORIZED; 2]);
        assert!(statuses[2..]
            .iter()
            .all(|s| *s == StatusCode::TOO_MANY_REQUESTS));
        assert_eq!(ctx.rate_limiter.lock().unwrap().tracked_clients(), 1);
    }

    #[tokio::test]
    async fn live_session_gets_its_own_budget() {
        let core = Arc::new(CoreState::in_memory(Arc::new(LogNotifier)).unwrap());
        let ctx = ApiContext::new(core);
        *ctx.rate_limiter.lock().unwrap() = RateLimiter::with_limits(3, Duration::from_secs(60));
        let t = TestApp::with_ctx(ctx);
        let budi = t.user("Budi", Role::Citizen);
        let token = t.login(&budi).await;

        // Exhaust the anonymous budget (login already used one request).
        t.send("GET", "/api/health", None, None).await;
        t.send("GET", "/api/health", None, None).await;
        let (status, _) = t.send("GET", "/api/health", None, None).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

        let (status, _) = t.send("GET", "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let t = TestApp::new();
        let (status, _) = t.send("GET", "/api/nope", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
