use std::sync::Arc;
use std::time::Duration;

use auth::TokenService;
use axum::body::Body;
use axum::http::header;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::AllowOrigin;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::forgot_password::forgot_password;
use super::handlers::google_oauth::google_callback;
use super::handlers::google_oauth::google_start;
use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::profile::delete_profile;
use super::handlers::profile::get_profile;
use super::handlers::profile::update_profile;
use super::handlers::refresh_token::refresh_token;
use super::handlers::register::register;
use super::handlers::reset_password::reset_password;
use super::handlers::verify_email::verify_email;
use super::middleware::authenticate as auth_middleware;
use crate::domain::account::ports::AccountServicePort;
use crate::domain::account::validation::ValidationPolicy;

pub struct AppState<S> {
    pub account_service: Arc<S>,
    pub tokens: Arc<TokenService>,
    pub validation: Arc<ValidationPolicy>,
    /// Frontend origin without trailing slash
    pub frontend_url: Arc<str>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            account_service: Arc::clone(&self.account_service),
            tokens: Arc::clone(&self.tokens),
            validation: Arc::clone(&self.validation),
            frontend_url: Arc::clone(&self.frontend_url),
        }
    }
}

/// Settings of the HTTP adapter itself
#[derive(Debug, Clone, Default)]
pub struct HttpSettings {
    pub frontend_url: String,
    pub cors_allowed_origins: Vec<String>,
}

pub fn create_router<S: AccountServicePort>(
    account_service: Arc<S>,
    tokens: Arc<TokenService>,
    validation: ValidationPolicy,
    settings: HttpSettings,
) -> Router {
    let state = AppState {
        account_service,
        tokens,
        validation: Arc::new(validation),
        frontend_url: Arc::from(settings.frontend_url.trim_end_matches('/')),
    };

    let public_routes = Router::new()
        .route("/auth/register", post(register::<S>))
        .route("/auth/login", post(login::<S>))
        .route("/auth/refresh-token", post(refresh_token::<S>))
        .route("/auth/verify-email", get(verify_email::<S>))
        .route("/auth/forgot-password", post(forgot_password::<S>))
        .route("/auth/reset-password", post(reset_password::<S>))
        .route("/auth/google", get(google_start::<S>))
        .route("/auth/google/callback", get(google_callback::<S>));

    let protected_routes = Router::new()
        .route("/auth/logout", post(logout::<S>))
        .route(
            "/profile/me",
            get(get_profile::<S>)
                .put(update_profile::<S>)
                .delete(delete_profile::<S>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<S>,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                path = %request.uri().path(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                path = %request.uri().path(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(cors_layer(&settings.cors_allowed_origins))
        .with_state(state)
}

/// CORS restricted to the configured origins; invalid entries are skipped.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
