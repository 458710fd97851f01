//! Auth flow HTTP handlers
//!
//! Hosts the four routes of the relying-party flow:
//! - `/auth/login` starts the flow: PKCE pair, Auth-State cookie, redirect
//!   to the provider's authorization URL
//! - `/auth/callback` finishes it: validate state, exchange the code,
//!   fetch claims, seal the session cookie, redirect to the preserved path
//! - `/auth/logout` clears the session locally with best-effort revocation
//! - `/auth/logout/sso` clears the session and hands off to the provider's
//!   end-session URL where one is advertised
//!
//! All cross-request state rides in the two signed cookies; the handlers
//! themselves share nothing but the injected `OidcClient` capability and
//! the codecs.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::{debug, info, warn};

use oidc_client::OidcClient;
use rp_session::{AuthState, AuthStateCodec, Session, SessionCodec};

use crate::error::AuthError;
use crate::metrics;

use metrics_exporter_prometheus::PrometheusHandle;

/// Cookie carrying the per-attempt login state across the provider redirect.
pub const STATE_COOKIE: &str = "rp_auth_state";
/// Cookie carrying the session snapshot.
pub const SESSION_COOKIE: &str = "rp_session";

/// Post-login landing page when the caller supplied no (usable) `backTo`.
const DEFAULT_BACK_TO: &str = "/private";
/// Post-logout landing page.
const HOME_PATH: &str = "/";

/// Shared application state accessible from all handlers
#[derive(Clone)]
pub struct AppState {
    pub oidc: Arc<dyn OidcClient>,
    pub state_codec: AuthStateCodec,
    pub session_codec: SessionCodec,
    pub state_ttl_secs: u64,
    pub secure_cookies: bool,
    pub prometheus: PrometheusHandle,
}

/// Build the axum router with all auth routes and shared state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/auth/login", get(login))
        .route("/auth/callback", get(callback))
        .route("/auth/logout", get(logout))
        .route("/auth/logout/sso", get(logout_sso))
        .route("/health", get(health))
        .route("/metrics", get(render_metrics))
        .with_state(state)
}

/// Reject redirect targets that could leave the origin.
/// Only relative paths starting with `/` are allowed (rejects `//`, `/\`
/// and anything containing `://`).
fn sanitize_back_to(path: &str) -> Option<&str> {
    let trimmed = path.trim();
    if trimmed.is_empty() || !trimmed.starts_with('/') {
        return None;
    }
    if trimmed.starts_with("//") || trimmed.starts_with("/\\") || trimmed.contains("://") {
        return None;
    }
    Some(trimmed)
}

/// 302 redirect. The flow uses FOUND throughout, matching what browsers
/// expect from interactive login redirects.
fn found(location: &str) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.to_string())],
    )
        .into_response()
}

fn state_cookie(token: String, ttl_secs: u64, secure: bool) -> Cookie<'static> {
    Cookie::build((STATE_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(cookie::time::Duration::seconds(ttl_secs as i64))
        .build()
}

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Removal cookie: must carry the same path as the original for the
/// browser to drop it.
fn clear_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, "")).path("/").build()
}

#[derive(Deserialize)]
struct LoginQuery {
    #[serde(rename = "backTo")]
    back_to: Option<String>,
}

/// GET /auth/login — start a login attempt.
///
/// Generates a fresh PKCE pair for this attempt, seals the verifier and the
/// sanitized `backTo` path into the Auth-State cookie, and redirects the
/// browser to the provider. The authorization URL is built before the
/// cookie is written so a construction failure aborts with nothing set.
async fn login(
    State(app): State<AppState>,
    jar: CookieJar,
    Query(query): Query<LoginQuery>,
) -> Result<(CookieJar, Response), AuthError> {
    let back_to = query
        .back_to
        .as_deref()
        .and_then(sanitize_back_to)
        .unwrap_or(DEFAULT_BACK_TO);

    let verifier = rp_session::generate_verifier();
    let challenge = rp_session::compute_challenge(&verifier);
    let auth_state = AuthState::new(back_to, &verifier, app.state_ttl_secs);

    let authorization_url = app
        .oidc
        .authorization_url(&challenge, &auth_state.nonce)
        .map_err(|e| {
            metrics::record_login_failure("login_init");
            AuthError::LoginFailed(e.to_string())
        })?;

    let token = app
        .state_codec
        .encode(&auth_state)
        .map_err(|e| AuthError::Internal(e.to_string()))?;

    metrics::record_login_started();
    info!(back_to, "login initiated, redirecting to provider");

    let jar = jar.add(state_cookie(token, app.state_ttl_secs, app.secure_cookies));
    Ok((jar, found(&authorization_url)))
}

#[derive(Deserialize)]
struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// GET /auth/callback — complete a login attempt.
///
/// Single pass, no retries. The session cookie is set if and only if state
/// validation, code exchange, and claims fetch all succeeded. Once the
/// Auth State has been validated it is consumed: every response from that
/// point clears the state cookie, success or failure alike, so a stale
/// token cannot be replayed.
async fn callback(
    State(app): State<AppState>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let auth_state = match jar.get(STATE_COOKIE) {
        None => {
            metrics::record_login_failure("invalid_state");
            warn!("callback without auth state cookie");
            return AuthError::InvalidState("missing auth state cookie".into()).into_response();
        }
        Some(cookie) => match app.state_codec.decode(cookie.value()) {
            Ok(state) => state,
            Err(e) => {
                metrics::record_login_failure("invalid_state");
                warn!(error = %e, "auth state validation failed");
                return AuthError::InvalidState(e.to_string()).into_response();
            }
        },
    };

    // State validated and consumed; cleared regardless of what follows.
    let jar = jar.remove(clear_cookie(STATE_COOKIE));

    match complete_login(&app, &auth_state, query).await {
        Ok(session_token) => {
            metrics::record_login_completed();
            let back_to = sanitize_back_to(&auth_state.back_to_path).unwrap_or(DEFAULT_BACK_TO);
            info!(user_destination = back_to, "session established");
            let jar = jar.add(session_cookie(session_token, app.secure_cookies));
            (jar, found(back_to)).into_response()
        }
        Err(e) => {
            metrics::record_login_failure(e.stage());
            warn!(error = %e, stage = e.stage(), "callback failed, no session established");
            (jar, e).into_response()
        }
    }
}

/// Steps 2-5 of the callback: parameter extraction, code exchange, claims
/// fetch, session encoding. Failure at any step leaves no session.
async fn complete_login(
    app: &AppState,
    auth_state: &AuthState,
    query: CallbackQuery,
) -> Result<String, AuthError> {
    if let Some(error) = query.error {
        let description = query.error_description.unwrap_or_default();
        return Err(AuthError::InvalidCallback(format!(
            "provider returned error: {error} {description}"
        )));
    }

    let code = query
        .code
        .ok_or_else(|| AuthError::InvalidCallback("missing authorization code".into()))?;

    // The provider echoes the state parameter from the authorization URL;
    // it must match the nonce sealed into this attempt's cookie.
    if let Some(returned) = &query.state {
        if returned != &auth_state.nonce {
            return Err(AuthError::InvalidState("state nonce mismatch".into()));
        }
    }

    let token_set = app
        .oidc
        .exchange_code(&code, &auth_state.pkce_verifier)
        .await
        .map_err(|e| AuthError::TokenExchangeFailed(e.to_string()))?;

    let user = app
        .oidc
        .fetch_userinfo(&token_set.access_token)
        .await
        .map_err(|e| AuthError::ClaimsFetchFailed(e.to_string()))?;

    debug!(sub = %user.sub, "claims retrieved");

    let session = Session { token_set, user };
    app.session_codec
        .encode(&session)
        .map_err(|e| AuthError::Internal(e.to_string()))
}

/// GET /auth/logout — local logout.
///
/// Clears the session cookie and best-effort revokes the access token at
/// the provider. Revocation failure is logged and swallowed: logout always
/// succeeds from the user's perspective, provider downtime included.
async fn logout(State(app): State<AppState>, jar: CookieJar) -> (CookieJar, Response) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        match app.session_codec.decode(cookie.value()) {
            Ok(session) => {
                if let Err(e) = app.oidc.revoke_token(&session.token_set.access_token).await {
                    warn!(error = %e, "token revocation failed, clearing session anyway");
                }
            }
            Err(e) => {
                debug!(error = %e, "session cookie invalid at logout, clearing");
            }
        }
    }

    metrics::record_logout("local");
    info!("local logout");
    (jar.remove(clear_cookie(SESSION_COOKIE)), found(HOME_PATH))
}

/// GET /auth/logout/sso — provider single-sign-out.
///
/// Optional capability: redirects to the provider's end-session URL when
/// one is advertised, otherwise behaves like a local logout redirecting
/// home. The provider visit ends the IdP session; the local session is
/// gone either way.
async fn logout_sso(State(app): State<AppState>, jar: CookieJar) -> (CookieJar, Response) {
    let jar = jar.remove(clear_cookie(SESSION_COOKIE));

    metrics::record_logout("sso");
    match app.oidc.end_session_url() {
        Some(url) => {
            info!("single-sign-out, redirecting to provider end-session");
            (jar, found(&url))
        }
        None => {
            debug!("provider advertises no end-session URL, local logout only");
            (jar, found(HOME_PATH))
        }
    }
}

/// Liveness endpoint.
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        serde_json::json!({ "status": "ok" }).to_string(),
    )
}

/// Prometheus metrics endpoint — text exposition format.
async fn render_metrics(State(app): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        app.prometheus.render(),
    )
}
