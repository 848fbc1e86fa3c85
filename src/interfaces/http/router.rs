//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::identity::AccountService;
use crate::config::AppConfig;
use crate::infrastructure::crypto::SessionIssuer;
use crate::interfaces::http::common::{ApiResponse, ErrorResponse, PaginatedResponse};
use crate::interfaces::http::middleware::{
    require_admin, session_middleware, CookieSettings, SessionState,
};

use super::modules::{auth, health, metrics, request_id, roles, users};

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("yms.auth"))),
            );
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Session token for non-browser clients"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Auth
        auth::register,
        auth::verify_email,
        auth::resend_verification,
        auth::login,
        auth::logout,
        auth::get_current_user,
        // Roles
        roles::list_roles,
        // Users
        users::list_users,
        users::user_stats,
        users::create_user,
        users::toggle_active,
        users::reassign_role,
    ),
    components(
        schemas(
            // Common
            ApiResponse<String>,
            ErrorResponse,
            PaginatedResponse<users::UserSummary>,
            // Auth
            auth::RegisterRequest,
            auth::VerifyEmailRequest,
            auth::ResendVerificationRequest,
            auth::LoginRequest,
            auth::VerificationResult,
            // Roles
            roles::RoleDto,
            // Users
            users::UserSummary,
            users::UserStatsDto,
            users::CreateUserRequest,
            users::ReassignRoleRequest,
            // Health
            health::HealthResponse,
            health::ComponentHealth,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Server health check endpoints"),
        (name = "Authentication", description = "Registration, email verification, sign-in and sessions"),
        (name = "Roles", description = "Role catalog"),
        (name = "Users", description = "Administrator user management"),
    ),
    info(
        title = "YMS Identity API",
        version = "1.0.0",
        description = "Account lifecycle for the Yard Management System: registration, email verification, login gating and user administration",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Create the API router with all routes
pub fn create_api_router(
    accounts: Arc<AccountService>,
    sessions: Arc<SessionIssuer>,
    db: DatabaseConnection,
    app_cfg: &AppConfig,
    prometheus_handle: Option<PrometheusHandle>,
) -> Router {
    let cookie = CookieSettings {
        name: app_cfg.security.cookie_name.clone(),
        secure: app_cfg.security.cookie_secure,
    };

    let session_state = SessionState {
        sessions: sessions.clone(),
        accounts: accounts.clone(),
        cookie: cookie.clone(),
    };

    let auth_state = auth::AuthHandlerState {
        accounts: accounts.clone(),
        sessions,
        cookie,
    };

    // Auth routes (public)
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/verify-email", post(auth::verify_email))
        .route("/resend-verification", post(auth::resend_verification))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .with_state(auth_state);

    // Auth routes (protected)
    let me_routes = Router::new()
        .route("/me", get(auth::get_current_user))
        .layer(middleware::from_fn_with_state(
            session_state.clone(),
            session_middleware,
        ));

    // Role catalog (public)
    let role_routes = Router::new()
        .route("/roles", get(roles::list_roles))
        .with_state(accounts.clone());

    // User management (administrators)
    let user_routes = Router::new()
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/stats", get(users::user_stats))
        .route("/users/{id}/toggle-active", patch(users::toggle_active))
        .route("/users/{id}/role", put(users::reassign_role))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(
            session_state,
            session_middleware,
        ))
        .with_state(users::UserHandlerState { accounts });

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health::HealthState {
            db,
            started_at: Arc::new(Instant::now()),
        });

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let mut router = Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .merge(auth_routes)
        .merge(me_routes)
        .merge(role_routes)
        .merge(user_routes);

    if let Some(handle) = prometheus_handle {
        router = router.merge(
            Router::new()
                .route("/metrics", get(metrics::prometheus_metrics))
                .with_state(metrics::MetricsState { handle }),
        );
    }

    router
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(cors_layer(&app_cfg.cors.allowed_origins))
        .layer(TraceLayer::new_for_http())
}
