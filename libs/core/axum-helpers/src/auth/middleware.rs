use super::jwt::JwtAuth;
use super::user::CurrentUser;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Extract JWT from Authorization header or cookie
fn extract_token_from_request(headers: &HeaderMap) -> Option<String> {
    // Try Authorization header first: "Bearer <token>"
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer ").map(|s| s.to_string()))
        .or_else(|| {
            // Fallback to cookie: "access_token=<token>"
            headers
                .get("cookie")
                .and_then(|v| v.to_str().ok())
                .and_then(|cookies| {
                    cookies.split(';').find_map(|cookie| {
                        let parts: Vec<&str> = cookie.trim().splitn(2, '=').collect();
                        if parts.len() == 2 && parts[0] == "access_token" {
                            Some(parts[1].to_string())
                        } else {
                            None
                        }
                    })
                })
        })
}

/// JWT authentication middleware
///
/// Validates the token from the Authorization header or the `access_token`
/// cookie, then inserts both the raw claims and the parsed [`CurrentUser`]
/// into request extensions for downstream extractors.
///
/// # Example
///
/// ```ignore
/// let protected = Router::new()
///     .route("/api/projects", get(list_projects))
///     .layer(axum::middleware::from_fn_with_state(
///         jwt_auth.clone(),
///         jwt_auth_middleware,
///     ));
/// ```
pub async fn jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, impl IntoResponse> {
    let token = match extract_token_from_request(&headers) {
        Some(t) => t,
        None => {
            tracing::debug!("No JWT found in Authorization header or cookie");
            return Err((StatusCode::UNAUTHORIZED, "No token provided"));
        }
    };

    let claims = match auth.verify_token(&token) {
        Ok(c) => c,
        Err(e) => {
            tracing::debug!("JWT verification failed: {}", e);
            return Err((StatusCode::UNAUTHORIZED, "Invalid token"));
        }
    };

    let user = match CurrentUser::try_from(&claims) {
        Ok(u) => u,
        Err(_) => {
            tracing::warn!("JWT subject is not a valid user id: {}", claims.sub);
            return Err((StatusCode::UNAUTHORIZED, "Invalid token"));
        }
    };

    request.extensions_mut().insert(claims);
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Optional JWT authentication middleware
///
/// Like [`jwt_auth_middleware`] but lets unauthenticated requests through;
/// the [`CurrentUser`] extension is simply absent for them.
pub async fn optional_jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_token_from_request(&headers) {
        if let Ok(claims) = auth.verify_token(&token) {
            if let Ok(user) = CurrentUser::try_from(&claims) {
                request.extensions_mut().insert(claims);
                request.extensions_mut().insert(user);
            }
        }
    }

    next.run(request).await
}
