use axum_helpers::CurrentUser;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::access::can_access;
use crate::error::{TaskError, TaskResult};
use crate::models::Project;
use crate::repository::{ProjectRepository, TaskRepository};
use crate::tasks::{CreateTask, Task, UpdateTask};

/// Service layer for task business logic.
///
/// Every operation resolves the parent project first and applies the
/// owner-or-member rule: tasks are readable AND writable by members, unlike
/// the project record itself.
#[derive(Clone)]
pub struct TaskService<T: TaskRepository, P: ProjectRepository> {
    tasks: Arc<T>,
    projects: Arc<P>,
}

impl<T: TaskRepository, P: ProjectRepository> TaskService<T, P> {
    pub fn new(tasks: T, projects: P) -> Self {
        Self {
            tasks: Arc::new(tasks),
            projects: Arc::new(projects),
        }
    }

    /// Create a task in a project the user can access.
    pub async fn create_task(
        &self,
        input: CreateTask,
        project_id: Uuid,
        user: &CurrentUser,
    ) -> TaskResult<Task> {
        input
            .validate()
            .map_err(|e| TaskError::Validation(e.to_string()))?;

        self.require_access(project_id, user).await?;

        let task = Task::new(input, project_id);
        self.tasks.create(task).await
    }

    /// List a project's tasks in insertion order.
    pub async fn list_tasks(&self, project_id: Uuid, user: &CurrentUser) -> TaskResult<Vec<Task>> {
        self.require_access(project_id, user).await?;
        self.tasks.list_by_project(project_id).await
    }

    /// Get a single task. The task must belong to the addressed project.
    pub async fn get_task(
        &self,
        project_id: Uuid,
        task_id: Uuid,
        user: &CurrentUser,
    ) -> TaskResult<Task> {
        self.require_access(project_id, user).await?;
        self.require_task_in_project(project_id, task_id).await
    }

    /// Update a task; overwrites all mutable fields.
    pub async fn update_task(
        &self,
        project_id: Uuid,
        task_id: Uuid,
        input: UpdateTask,
        user: &CurrentUser,
    ) -> TaskResult<Task> {
        input
            .validate()
            .map_err(|e| TaskError::Validation(e.to_string()))?;

        self.require_access(project_id, user).await?;

        let mut task = self.require_task_in_project(project_id, task_id).await?;
        task.apply_update(input);
        self.tasks.update(task).await
    }

    /// Delete a task: the row is removed, not detached or soft-deleted, so
    /// it disappears from every subsequent query.
    pub async fn delete_task(
        &self,
        project_id: Uuid,
        task_id: Uuid,
        user: &CurrentUser,
    ) -> TaskResult<()> {
        self.require_access(project_id, user).await?;

        // Resolve first so an unknown id reports NotFound, not a silent no-op
        self.require_task_in_project(project_id, task_id).await?;
        self.tasks.delete(task_id).await?;

        tracing::info!(task_id = %task_id, project_id = %project_id, "Deleted task");
        Ok(())
    }

    /// Load the project and enforce the owner-or-member rule.
    async fn require_access(&self, project_id: Uuid, user: &CurrentUser) -> TaskResult<Project> {
        let project = self
            .projects
            .get_by_id(project_id)
            .await?
            .ok_or_else(|| {
                TaskError::NotFound(format!("Project not found with id: {}", project_id))
            })?;

        if !can_access(&project, user) {
            return Err(TaskError::Forbidden(project_id));
        }

        Ok(project)
    }

    /// A task addressed under the wrong project is NotFound, same as a
    /// missing task: ids must not leak across project boundaries.
    async fn require_task_in_project(&self, project_id: Uuid, task_id: Uuid) -> TaskResult<Task> {
        let task = self
            .tasks
            .get_by_id(task_id)
            .await?
            .filter(|t| t.project_id == project_id)
            .ok_or_else(|| TaskError::task_not_found(task_id))?;

        Ok(task)
    }
}
