use axum::Router;

pub mod auth;
pub mod health;
pub mod projects;

/// Creates the API routes without the `/api` prefix.
/// The `/api` prefix is added by the `create_router` helper.
///
/// Takes a reference to AppState and initializes all services. Returns a
/// stateless Router (each sub-router has its state already applied); only
/// cheap Arc clones of the db pool remain.
pub fn routes(state: &crate::state::AppState) -> Router {
    Router::new()
        .nest("/auth", auth::router(state))
        .nest(domain_projects::handlers::URL, projects::router(state))
}

/// Creates a router with the /ready endpoint that performs actual health
/// checks against the database.
pub fn ready_router(state: crate::state::AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
