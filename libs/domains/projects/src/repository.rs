//! Persistence gateway for the projects domain.
//!
//! Three narrow traits: project storage, task storage, and the read-only
//! user directory consulted for membership changes and email autocomplete.
//! Each has an in-memory implementation for development and tests and a
//! Postgres implementation in [`crate::postgres`].

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ProjectError, ProjectResult, TaskError, TaskResult};
use crate::models::{Project, ProjectMember};
use crate::tasks::Task;

/// Repository trait for Project persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Store a new project
    async fn create(&self, project: Project) -> ProjectResult<Project>;

    /// Get a project by ID, members included
    async fn get_by_id(&self, id: Uuid) -> ProjectResult<Option<Project>>;

    /// List projects owned by a user
    async fn list_by_owner(&self, user_id: Uuid) -> ProjectResult<Vec<Project>>;

    /// List projects where the user is a member
    async fn list_by_member(&self, user_id: Uuid) -> ProjectResult<Vec<Project>>;

    /// Overwrite a project's fields (members are managed separately)
    async fn update(&self, project: Project) -> ProjectResult<Project>;

    /// Delete a project and its membership rows. Tasks are NOT touched here;
    /// the service enumerates and deletes them explicitly first.
    async fn delete(&self, id: Uuid) -> ProjectResult<bool>;

    /// Add a membership row; adding an existing member is a no-op
    async fn add_member(&self, project_id: Uuid, member: ProjectMember) -> ProjectResult<()>;

    /// Remove a membership row; removing an absent member is a no-op
    async fn remove_member(&self, project_id: Uuid, user_id: Uuid) -> ProjectResult<()>;
}

/// Repository trait for Task persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Store a new task
    async fn create(&self, task: Task) -> TaskResult<Task>;

    /// Get a task by ID
    async fn get_by_id(&self, id: Uuid) -> TaskResult<Option<Task>>;

    /// List a project's tasks in insertion order
    async fn list_by_project(&self, project_id: Uuid) -> TaskResult<Vec<Task>>;

    /// Overwrite a task's fields
    async fn update(&self, task: Task) -> TaskResult<Task>;

    /// Hard-delete a task row
    async fn delete(&self, id: Uuid) -> TaskResult<bool>;

    /// Delete all tasks of a project, returning how many went
    async fn delete_by_project(&self, project_id: Uuid) -> TaskResult<u64>;
}

/// Read-only view of the user store, as much of it as this domain needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve an email (case-insensitive) to a user reference
    async fn find_by_email(&self, email: &str) -> ProjectResult<Option<ProjectMember>>;

    /// All known user emails
    async fn list_emails(&self) -> ProjectResult<Vec<String>>;
}

/// In-memory implementation of ProjectRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryProjectRepository {
    projects: Arc<RwLock<HashMap<Uuid, Project>>>,
}

impl InMemoryProjectRepository {
    pub fn new() -> Self {
        Self {
            projects: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn create(&self, project: Project) -> ProjectResult<Project> {
        let mut projects = self.projects.write().await;
        projects.insert(project.id, project.clone());

        tracing::info!(project_id = %project.id, "Created project");
        Ok(project)
    }

    async fn get_by_id(&self, id: Uuid) -> ProjectResult<Option<Project>> {
        let projects = self.projects.read().await;
        Ok(projects.get(&id).cloned())
    }

    async fn list_by_owner(&self, user_id: Uuid) -> ProjectResult<Vec<Project>> {
        let projects = self.projects.read().await;
        let mut result: Vec<Project> = projects
            .values()
            .filter(|p| p.owner_id == user_id)
            .cloned()
            .collect();
        result.sort_by_key(|p| p.id);
        Ok(result)
    }

    async fn list_by_member(&self, user_id: Uuid) -> ProjectResult<Vec<Project>> {
        let projects = self.projects.read().await;
        let mut result: Vec<Project> = projects
            .values()
            .filter(|p| p.members.iter().any(|m| m.user_id == user_id))
            .cloned()
            .collect();
        result.sort_by_key(|p| p.id);
        Ok(result)
    }

    async fn update(&self, project: Project) -> ProjectResult<Project> {
        let mut projects = self.projects.write().await;
        let entry = projects
            .get_mut(&project.id)
            .ok_or_else(|| ProjectError::project_not_found(project.id))?;

        // Members are managed through add_member/remove_member
        let members = entry.members.clone();
        *entry = Project { members, ..project };

        tracing::info!(project_id = %entry.id, "Updated project");
        Ok(entry.clone())
    }

    async fn delete(&self, id: Uuid) -> ProjectResult<bool> {
        let mut projects = self.projects.write().await;

        if projects.remove(&id).is_some() {
            tracing::info!(project_id = %id, "Deleted project");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn add_member(&self, project_id: Uuid, member: ProjectMember) -> ProjectResult<()> {
        let mut projects = self.projects.write().await;
        let project = projects
            .get_mut(&project_id)
            .ok_or_else(|| ProjectError::project_not_found(project_id))?;

        if !project.members.iter().any(|m| m.user_id == member.user_id) {
            project.members.push(member);
        }
        Ok(())
    }

    async fn remove_member(&self, project_id: Uuid, user_id: Uuid) -> ProjectResult<()> {
        let mut projects = self.projects.write().await;
        let project = projects
            .get_mut(&project_id)
            .ok_or_else(|| ProjectError::project_not_found(project_id))?;

        project.members.retain(|m| m.user_id != user_id);
        Ok(())
    }
}

/// In-memory implementation of TaskRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryTaskRepository {
    tasks: Arc<RwLock<HashMap<Uuid, Task>>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, task: Task) -> TaskResult<Task> {
        let mut tasks = self.tasks.write().await;
        tasks.insert(task.id, task.clone());

        tracing::info!(task_id = %task.id, project_id = %task.project_id, "Created task");
        Ok(task)
    }

    async fn get_by_id(&self, id: Uuid) -> TaskResult<Option<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.get(&id).cloned())
    }

    async fn list_by_project(&self, project_id: Uuid) -> TaskResult<Vec<Task>> {
        let tasks = self.tasks.read().await;
        let mut result: Vec<Task> = tasks
            .values()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect();
        // Insertion order: created_at, with the time-ordered id as tiebreak
        result.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(result)
    }

    async fn update(&self, task: Task) -> TaskResult<Task> {
        let mut tasks = self.tasks.write().await;
        let entry = tasks
            .get_mut(&task.id)
            .ok_or_else(|| TaskError::task_not_found(task.id))?;

        *entry = task.clone();

        tracing::info!(task_id = %task.id, "Updated task");
        Ok(task)
    }

    async fn delete(&self, id: Uuid) -> TaskResult<bool> {
        let mut tasks = self.tasks.write().await;

        if tasks.remove(&id).is_some() {
            tracing::info!(task_id = %id, "Deleted task");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn delete_by_project(&self, project_id: Uuid) -> TaskResult<u64> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|_, t| t.project_id != project_id);
        Ok((before - tasks.len()) as u64)
    }
}

/// In-memory implementation of UserDirectory (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<Vec<ProjectMember>>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Register a user so it can be resolved by email
    pub async fn insert(&self, user_id: Uuid, email: impl Into<String>) {
        self.users.write().await.push(ProjectMember {
            user_id,
            email: email.into(),
        });
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_email(&self, email: &str) -> ProjectResult<Option<ProjectMember>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list_emails(&self) -> ProjectResult<Vec<String>> {
        let users = self.users.read().await;
        Ok(users.iter().map(|u| u.email.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateProject;
    use crate::tasks::CreateTask;
    use chrono::NaiveDate;

    fn sample_project(owner_id: Uuid) -> Project {
        Project::new(
            CreateProject {
                name: "repo-test".to_string(),
                description: "repository test".to_string(),
                story_points: 3,
                due_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
                cost: 10,
            },
            owner_id,
        )
    }

    #[tokio::test]
    async fn test_create_and_get_project() {
        let repo = InMemoryProjectRepository::new();
        let project = sample_project(Uuid::now_v7());

        let created = repo.create(project.clone()).await.unwrap();
        assert_eq!(created.id, project.id);

        let fetched = repo.get_by_id(project.id).await.unwrap();
        assert_eq!(fetched.unwrap().name, "repo-test");
    }

    #[tokio::test]
    async fn test_member_rows_are_deduplicated() {
        let repo = InMemoryProjectRepository::new();
        let project = repo.create(sample_project(Uuid::now_v7())).await.unwrap();

        let member = ProjectMember {
            user_id: Uuid::now_v7(),
            email: "bob@x.com".to_string(),
        };

        repo.add_member(project.id, member.clone()).await.unwrap();
        repo.add_member(project.id, member.clone()).await.unwrap();

        let stored = repo.get_by_id(project.id).await.unwrap().unwrap();
        assert_eq!(stored.members.len(), 1);

        repo.remove_member(project.id, member.user_id).await.unwrap();
        repo.remove_member(project.id, member.user_id).await.unwrap();

        let stored = repo.get_by_id(project.id).await.unwrap().unwrap();
        assert!(stored.members.is_empty());
    }

    #[tokio::test]
    async fn test_task_list_preserves_insertion_order() {
        let repo = InMemoryTaskRepository::new();
        let project_id = Uuid::now_v7();

        for i in 0..5 {
            let task = Task::new(
                CreateTask {
                    name: format!("task-{}", i),
                    description: "ordered".to_string(),
                    status: "todo".to_string(),
                },
                project_id,
            );
            repo.create(task).await.unwrap();
        }

        let listed = repo.list_by_project(project_id).await.unwrap();
        let names: Vec<_> = listed.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["task-0", "task-1", "task-2", "task-3", "task-4"]);
    }

    #[tokio::test]
    async fn test_delete_by_project_only_removes_own_tasks() {
        let repo = InMemoryTaskRepository::new();
        let p1 = Uuid::now_v7();
        let p2 = Uuid::now_v7();

        for project_id in [p1, p1, p2] {
            let task = Task::new(
                CreateTask {
                    name: "t".to_string(),
                    description: "d".to_string(),
                    status: "todo".to_string(),
                },
                project_id,
            );
            repo.create(task).await.unwrap();
        }

        let removed = repo.delete_by_project(p1).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(repo.list_by_project(p2).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_directory_lookup_is_case_insensitive() {
        let directory = InMemoryUserDirectory::new();
        let id = Uuid::now_v7();
        directory.insert(id, "Alice@X.com").await;

        let found = directory.find_by_email("alice@x.com").await.unwrap();
        assert_eq!(found.unwrap().user_id, id);
    }
}
