use axum::Router;
use domain_projects::{
    PgProjectRepository, PgTaskRepository, PgUserDirectory, ProjectService, TaskService, handlers,
};

/// Project and task routes, all JWT-protected.
pub fn router(state: &crate::state::AppState) -> Router {
    let project_service = ProjectService::new(
        PgProjectRepository::new(state.db.clone()),
        PgTaskRepository::new(state.db.clone()),
        PgUserDirectory::new(state.db.clone()),
    );
    let task_service = TaskService::new(
        PgTaskRepository::new(state.db.clone()),
        PgProjectRepository::new(state.db.clone()),
    );

    handlers::router(project_service, task_service).layer(axum::middleware::from_fn_with_state(
        state.jwt_auth.clone(),
        axum_helpers::jwt_auth_middleware,
    ))
}
