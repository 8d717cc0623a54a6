use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    CurrentUser, ValidatedJson,
    errors::responses::{
        BadRequestValidationResponse, ForbiddenResponse, InternalServerErrorResponse,
        NotFoundResponse, UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::error::TaskResult;
use crate::repository::{ProjectRepository, TaskRepository};
use crate::task_service::TaskService;
use crate::tasks::{CreateTask, Task, UpdateTask};

/// OpenAPI tag for task endpoints
pub const TAG: &str = "tasks";

/// OpenAPI documentation for the Tasks API (nested under a project)
#[derive(OpenApi)]
#[openapi(
    paths(list_tasks, create_task, get_task, update_task, delete_task),
    components(
        schemas(Task, CreateTask, UpdateTask),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Task endpoints, scoped to their project")
    )
)]
pub struct TasksApiDoc;

/// Create the task router. Mounted beneath `/projects/{id}`, so every
/// route carries the parent project id.
pub fn router<T, P>(service: TaskService<T, P>) -> Router
where
    T: TaskRepository + 'static,
    P: ProjectRepository + 'static,
{
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route(
            "/{task_id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .with_state(shared_service)
}

/// List a project's tasks in insertion order
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Tasks of the project", body = Vec<Task>),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_tasks<T, P>(
    State(service): State<Arc<TaskService<T, P>>>,
    user: CurrentUser,
    Path(project_id): Path<Uuid>,
) -> TaskResult<Json<Vec<Task>>>
where
    T: TaskRepository,
    P: ProjectRepository,
{
    let tasks = service.list_tasks(project_id, &user).await?;
    Ok(Json(tasks))
}

/// Create a task in a project (owner or member)
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "Project ID")
    ),
    request_body = CreateTask,
    responses(
        (status = 201, description = "Task created successfully", body = Task),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_task<T, P>(
    State(service): State<Arc<TaskService<T, P>>>,
    user: CurrentUser,
    Path(project_id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<CreateTask>,
) -> TaskResult<impl IntoResponse>
where
    T: TaskRepository,
    P: ProjectRepository,
{
    let task = service.create_task(input, project_id, &user).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// Get a single task
#[utoipa::path(
    get,
    path = "/{task_id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "Project ID"),
        ("task_id" = Uuid, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task found", body = Task),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_task<T, P>(
    State(service): State<Arc<TaskService<T, P>>>,
    user: CurrentUser,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
) -> TaskResult<Json<Task>>
where
    T: TaskRepository,
    P: ProjectRepository,
{
    let task = service.get_task(project_id, task_id, &user).await?;
    Ok(Json(task))
}

/// Update a task (overwrites all mutable fields)
#[utoipa::path(
    put,
    path = "/{task_id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "Project ID"),
        ("task_id" = Uuid, Path, description = "Task ID")
    ),
    request_body = UpdateTask,
    responses(
        (status = 200, description = "Task updated successfully", body = Task),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_task<T, P>(
    State(service): State<Arc<TaskService<T, P>>>,
    user: CurrentUser,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(input): ValidatedJson<UpdateTask>,
) -> TaskResult<Json<Task>>
where
    T: TaskRepository,
    P: ProjectRepository,
{
    let task = service
        .update_task(project_id, task_id, input, &user)
        .await?;
    Ok(Json(task))
}

/// Delete a task (hard delete)
#[utoipa::path(
    delete,
    path = "/{task_id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "Project ID"),
        ("task_id" = Uuid, Path, description = "Task ID")
    ),
    responses(
        (status = 204, description = "Task deleted successfully"),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_task<T, P>(
    State(service): State<Arc<TaskService<T, P>>>,
    user: CurrentUser,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
) -> TaskResult<impl IntoResponse>
where
    T: TaskRepository,
    P: ProjectRepository,
{
    service.delete_task(project_id, task_id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}
