use axum::Router;
use domain_users::{
    PgUserRepository, UserService,
    auth_handlers::{AuthState, auth_router},
};

/// Auth routes at /api/auth.
///
/// Register/login/refresh are public; /me reads the optional JWT, so the
/// whole router gets the optional auth layer.
pub fn router(state: &crate::state::AppState) -> Router {
    let repository = PgUserRepository::new(state.db.clone());
    let service = UserService::new(repository);

    let auth_state = AuthState {
        service,
        jwt_auth: state.jwt_auth.clone(),
    };

    auth_router(auth_state).layer(axum::middleware::from_fn_with_state(
        state.jwt_auth.clone(),
        axum_helpers::optional_jwt_auth_middleware,
    ))
}
