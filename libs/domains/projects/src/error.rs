use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("{0}")]
    NotFound(String),

    #[error("Access denied to project {0}")]
    Forbidden(Uuid),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ProjectResult<T> = Result<T, ProjectError>;

impl ProjectError {
    /// NotFound for a missing project id (the common case)
    pub fn project_not_found(id: Uuid) -> Self {
        Self::NotFound(format!("Project not found with id: {}", id))
    }
}

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("{0}")]
    NotFound(String),

    #[error("Access denied to project {0}")]
    Forbidden(Uuid),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type TaskResult<T> = Result<T, TaskError>;

impl TaskError {
    pub fn task_not_found(id: Uuid) -> Self {
        Self::NotFound(format!("Task not found with id: {}", id))
    }
}

/// Project operations consult the task repository for the delete cascade;
/// its failures surface as project-level outcomes.
impl From<TaskError> for ProjectError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::NotFound(msg) => ProjectError::NotFound(msg),
            TaskError::Forbidden(id) => ProjectError::Forbidden(id),
            TaskError::Validation(msg) => ProjectError::Validation(msg),
            TaskError::Internal(msg) => ProjectError::Internal(msg),
        }
    }
}

/// Task operations look projects up for the access check; missing projects
/// and repository faults pass through unchanged.
impl From<ProjectError> for TaskError {
    fn from(err: ProjectError) -> Self {
        match err {
            ProjectError::NotFound(msg) => TaskError::NotFound(msg),
            ProjectError::Forbidden(id) => TaskError::Forbidden(id),
            ProjectError::Validation(msg) => TaskError::Validation(msg),
            ProjectError::Internal(msg) => TaskError::Internal(msg),
        }
    }
}

/// Convert ProjectError to AppError for standardized error responses
impl From<ProjectError> for AppError {
    fn from(err: ProjectError) -> Self {
        match err {
            ProjectError::NotFound(msg) => AppError::NotFound(msg),
            ProjectError::Forbidden(id) => {
                AppError::Forbidden(format!("Access denied to project {}", id))
            }
            ProjectError::Validation(msg) => AppError::BadRequest(msg),
            ProjectError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<TaskError> for AppError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::NotFound(msg) => AppError::NotFound(msg),
            TaskError::Forbidden(id) => {
                AppError::Forbidden(format!("Access denied to project {}", id))
            }
            TaskError::Validation(msg) => AppError::BadRequest(msg),
            TaskError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ProjectError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl IntoResponse for TaskError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
