use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Taskforge API",
        version = "0.1.0",
        description = "API for managing projects, project members, and tasks with \
                       ownership-based authorization"
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    nest(
        (path = "/projects", api = domain_projects::handlers::ApiDoc),
        (path = "/projects/{id}/tasks", api = domain_projects::task_handlers::TasksApiDoc)
    )
)]
pub struct ApiDoc;
