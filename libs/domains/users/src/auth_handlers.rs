use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{AppendHeaders, IntoResponse, Response},
    routing::{get, post},
};
use axum_helpers::{ACCESS_TOKEN_TTL, CurrentUser, JwtAuth, REFRESH_TOKEN_TTL, ValidatedJson};

use crate::error::UserError;
use crate::models::{CreateUser, LoginRequest, LoginResponse, RegisterRequest};
use crate::repository::UserRepository;
use crate::service::UserService;

/// Application state for auth handlers
#[derive(Clone)]
pub struct AuthState<R: UserRepository> {
    pub service: UserService<R>,
    pub jwt_auth: JwtAuth,
}

/// Auth router: register/login/refresh/logout/me
pub fn auth_router<R: UserRepository + Clone + 'static>(state: AuthState<R>) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .with_state(state)
}

/// Check if running in development mode (cookies skip the Secure flag)
fn is_development() -> bool {
    std::env::var("APP_ENV")
        .map(|env| env == "development")
        .unwrap_or_else(|_| cfg!(debug_assertions))
}

fn build_cookie(name: &str, value: &str, max_age: i64) -> Result<HeaderValue, UserError> {
    let secure_flag = if is_development() { "" } else { " Secure;" };
    let cookie = format!(
        "{}={}; HttpOnly;{} SameSite=Strict; Path=/; Max-Age={}",
        name, value, secure_flag, max_age
    );

    HeaderValue::from_str(&cookie)
        .map_err(|e| UserError::Internal(format!("Failed to create cookie: {}", e)))
}

/// Issue access+refresh tokens for a user and wrap them as Set-Cookie headers.
fn issue_tokens(
    jwt_auth: &JwtAuth,
    user: &crate::models::UserResponse,
) -> Result<(String, [(header::HeaderName, HeaderValue); 2]), UserError> {
    let user_id = user.id.to_string();

    let access_token = jwt_auth
        .create_access_token(&user_id, &user.email, &user.name)
        .map_err(|e| {
            tracing::error!("Failed to create access token: {:?}", e);
            UserError::Internal("Failed to create token".to_string())
        })?;

    let refresh_token = jwt_auth
        .create_refresh_token(&user_id, &user.email, &user.name)
        .map_err(|e| {
            tracing::error!("Failed to create refresh token: {:?}", e);
            UserError::Internal("Failed to create token".to_string())
        })?;

    let headers = [
        (
            header::SET_COOKIE,
            build_cookie("access_token", &access_token, ACCESS_TOKEN_TTL)?,
        ),
        (
            header::SET_COOKIE,
            build_cookie("refresh_token", &refresh_token, REFRESH_TOKEN_TTL)?,
        ),
    ];

    Ok((access_token, headers))
}

/// Register a new user
async fn register<R: UserRepository>(
    State(state): State<AuthState<R>>,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> Result<Response, UserError> {
    let user = state
        .service
        .create_user(CreateUser {
            email: input.email,
            name: input.name,
            password: input.password,
        })
        .await?;

    let (access_token, cookies) = issue_tokens(&state.jwt_auth, &user)?;

    tracing::info!(user_id = %user.id, "User registered");

    let response = LoginResponse { user, access_token };

    Ok((StatusCode::CREATED, AppendHeaders(cookies), Json(response)).into_response())
}

/// Login with email/password
async fn login<R: UserRepository>(
    State(state): State<AuthState<R>>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> Result<Response, UserError> {
    let user = state
        .service
        .verify_credentials(&input.email, &input.password)
        .await?;

    let (access_token, cookies) = issue_tokens(&state.jwt_auth, &user)?;

    tracing::info!(user_id = %user.id, "User logged in");

    let response = LoginResponse { user, access_token };

    Ok((AppendHeaders(cookies), Json(response)).into_response())
}

/// Exchange a refresh token for a fresh token pair.
///
/// Accepts the refresh token from the `refresh_token` cookie or as a Bearer
/// token. Stateless verification: signature + expiry.
async fn refresh<R: UserRepository>(
    State(state): State<AuthState<R>>,
    headers: HeaderMap,
) -> Result<Response, UserError> {
    let token = extract_refresh_token(&headers).ok_or(UserError::Unauthorized)?;

    let claims = state.jwt_auth.verify_token(&token).map_err(|e| {
        tracing::debug!("Refresh token verification failed: {}", e);
        UserError::Unauthorized
    })?;

    let user_id = claims
        .sub
        .parse::<uuid::Uuid>()
        .map_err(|_| UserError::Unauthorized)?;

    // Re-read the user so a renamed/deleted account is reflected immediately
    let user = state.service.get_user(user_id).await.map_err(|_| UserError::Unauthorized)?;

    let (access_token, cookies) = issue_tokens(&state.jwt_auth, &user)?;

    let response = LoginResponse { user, access_token };

    Ok((AppendHeaders(cookies), Json(response)).into_response())
}

fn extract_refresh_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("cookie")
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').find_map(|cookie| {
                let parts: Vec<&str> = cookie.trim().splitn(2, '=').collect();
                if parts.len() == 2 && parts[0] == "refresh_token" {
                    Some(parts[1].to_string())
                } else {
                    None
                }
            })
        })
        .or_else(|| {
            headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .and_then(|auth| auth.strip_prefix("Bearer ").map(|s| s.to_string()))
        })
}

/// Clear the auth cookies. With stateless tokens there is nothing to revoke
/// server-side; the short access TTL bounds the remaining validity.
async fn logout() -> Result<Response, UserError> {
    let cookies = [
        (header::SET_COOKIE, build_cookie("access_token", "", 0)?),
        (header::SET_COOKIE, build_cookie("refresh_token", "", 0)?),
    ];

    Ok((
        AppendHeaders(cookies),
        Json(serde_json::json!({"message": "Logged out"})),
    )
        .into_response())
}

/// Return the authenticated user's profile
async fn me<R: UserRepository>(
    State(state): State<AuthState<R>>,
    user: CurrentUser,
) -> Result<Response, UserError> {
    let profile = state.service.get_user(user.id).await?;
    Ok(Json(profile).into_response())
}
