use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
};
use axum_helpers::{
    AuditEvent, AuditOutcome, CurrentUser, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
    extract_ip_from_headers, extract_user_agent,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi};
use uuid::Uuid;

use crate::error::ProjectResult;
use crate::models::{AddMember, CreateProject, Project, ProjectFilter, ProjectMember, UpdateProject};
use crate::repository::{ProjectRepository, TaskRepository, UserDirectory};
use crate::service::ProjectService;
use crate::task_handlers;
use crate::task_service::TaskService;

/// OpenAPI tag for project endpoints
pub const TAG: &str = "projects";
/// Mount point under /api
pub const URL: &str = "/projects";

/// Query parameter for the email autocomplete endpoint
#[derive(Debug, Deserialize, IntoParams)]
pub struct EmailQuery {
    /// Substring to match against user emails (min 3 characters)
    pub q: String,
}

/// OpenAPI documentation for the Projects API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_projects,
        create_project,
        fetch_emails,
        get_project,
        update_project,
        delete_project,
        add_member,
        remove_member,
    ),
    components(
        schemas(Project, ProjectMember, CreateProject, UpdateProject, AddMember),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Project and membership management endpoints")
    )
)]
pub struct ApiDoc;

/// Create the project router with all HTTP endpoints, the task routes
/// nested beneath each project.
pub fn router<R, T, D>(service: ProjectService<R, T, D>, task_service: TaskService<T, R>) -> Router
where
    R: ProjectRepository + 'static,
    T: TaskRepository + 'static,
    D: UserDirectory + 'static,
{
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_projects).post(create_project))
        .route("/emails", get(fetch_emails))
        .route(
            "/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/{id}/members", post(add_member))
        .route("/{id}/members/{email}", delete(remove_member))
        .with_state(shared_service)
        .nest("/{id}/tasks", task_handlers::router(task_service))
}

/// List the projects visible to the authenticated user
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(ProjectFilter),
    responses(
        (status = 200, description = "Owned and member projects", body = Vec<Project>),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_projects<R, T, D>(
    State(service): State<Arc<ProjectService<R, T, D>>>,
    user: CurrentUser,
    Query(filter): Query<ProjectFilter>,
) -> ProjectResult<Json<Vec<Project>>>
where
    R: ProjectRepository,
    T: TaskRepository,
    D: UserDirectory,
{
    let projects = service.list_projects(&user, filter).await?;
    Ok(Json(projects))
}

/// Create a new project owned by the authenticated user
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateProject,
    responses(
        (status = 201, description = "Project created successfully", body = Project),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_project<R, T, D>(
    State(service): State<Arc<ProjectService<R, T, D>>>,
    headers: HeaderMap,
    user: CurrentUser,
    ValidatedJson(input): ValidatedJson<CreateProject>,
) -> ProjectResult<impl IntoResponse>
where
    R: ProjectRepository,
    T: TaskRepository,
    D: UserDirectory,
{
    let project = service.create_project(input, &user).await?;

    AuditEvent::new(
        Some(user.id.to_string()),
        "project.create",
        Some(format!("project:{}", project.id)),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .with_details(json!({
        "project_name": project.name,
        "due_date": project.due_date,
    }))
    .log();

    Ok((StatusCode::CREATED, Json(project)))
}

/// Get a project by ID (owner or member)
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project found", body = Project),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_project<R, T, D>(
    State(service): State<Arc<ProjectService<R, T, D>>>,
    user: CurrentUser,
    UuidPath(id): UuidPath,
) -> ProjectResult<Json<Project>>
where
    R: ProjectRepository,
    T: TaskRepository,
    D: UserDirectory,
{
    let project = service.get_project(id, &user).await?;
    Ok(Json(project))
}

/// Update a project (owner only, overwrites all mutable fields)
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "Project ID")
    ),
    request_body = UpdateProject,
    responses(
        (status = 200, description = "Project updated successfully", body = Project),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_project<R, T, D>(
    State(service): State<Arc<ProjectService<R, T, D>>>,
    user: CurrentUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateProject>,
) -> ProjectResult<Json<Project>>
where
    R: ProjectRepository,
    T: TaskRepository,
    D: UserDirectory,
{
    let project = service.update_project(id, input, &user).await?;
    Ok(Json(project))
}

/// Delete a project and all of its tasks (owner only)
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "Project ID")
    ),
    responses(
        (status = 204, description = "Project deleted successfully"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_project<R, T, D>(
    State(service): State<Arc<ProjectService<R, T, D>>>,
    headers: HeaderMap,
    user: CurrentUser,
    UuidPath(id): UuidPath,
) -> ProjectResult<impl IntoResponse>
where
    R: ProjectRepository,
    T: TaskRepository,
    D: UserDirectory,
{
    service.delete_project(id, &user).await?;

    AuditEvent::new(
        Some(user.id.to_string()),
        "project.delete",
        Some(format!("project:{}", id)),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .log();

    Ok(StatusCode::NO_CONTENT)
}

/// Add a member to a project by email (owner only, idempotent)
#[utoipa::path(
    post,
    path = "/{id}/members",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "Project ID")
    ),
    request_body = AddMember,
    responses(
        (status = 200, description = "Member added", body = Project),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn add_member<R, T, D>(
    State(service): State<Arc<ProjectService<R, T, D>>>,
    headers: HeaderMap,
    user: CurrentUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<AddMember>,
) -> ProjectResult<Json<Project>>
where
    R: ProjectRepository,
    T: TaskRepository,
    D: UserDirectory,
{
    let project = service.add_member(id, &input.email, &user).await?;

    AuditEvent::new(
        Some(user.id.to_string()),
        "project.member.add",
        Some(format!("project:{}", id)),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .with_details(json!({"member_email": input.email}))
    .log();

    Ok(Json(project))
}

/// Remove a member from a project by email (owner only, idempotent)
#[utoipa::path(
    delete,
    path = "/{id}/members/{email}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "Project ID"),
        ("email" = String, Path, description = "Member email")
    ),
    responses(
        (status = 200, description = "Member removed", body = Project),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn remove_member<R, T, D>(
    State(service): State<Arc<ProjectService<R, T, D>>>,
    headers: HeaderMap,
    user: CurrentUser,
    axum::extract::Path((id, email)): axum::extract::Path<(Uuid, String)>,
) -> ProjectResult<Json<Project>>
where
    R: ProjectRepository,
    T: TaskRepository,
    D: UserDirectory,
{
    let project = service.remove_member(id, &email, &user).await?;

    AuditEvent::new(
        Some(user.id.to_string()),
        "project.member.remove",
        Some(format!("project:{}", id)),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .with_details(json!({"member_email": email}))
    .log();

    Ok(Json(project))
}

/// Email autocomplete for the member dialog
#[utoipa::path(
    get,
    path = "/emails",
    tag = TAG,
    params(EmailQuery),
    responses(
        (status = 200, description = "Matching emails", body = Vec<String>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn fetch_emails<R, T, D>(
    State(service): State<Arc<ProjectService<R, T, D>>>,
    _user: CurrentUser,
    Query(query): Query<EmailQuery>,
) -> ProjectResult<Json<Vec<String>>>
where
    R: ProjectRepository,
    T: TaskRepository,
    D: UserDirectory,
{
    let emails = service.fetch_emails(&query.q).await?;
    Ok(Json(emails))
}
