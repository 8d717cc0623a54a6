use axum_helpers::CurrentUser;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::access::{can_access, can_mutate};
use crate::error::{ProjectError, ProjectResult};
use crate::models::{CreateProject, Project, ProjectFilter, UpdateProject};
use crate::repository::{ProjectRepository, TaskRepository, UserDirectory};

/// Service layer for project business logic.
///
/// Every operation takes the acting user as an explicit argument; the
/// authorization decision is always [`can_access`]/[`can_mutate`] over the
/// loaded project, never ambient state.
#[derive(Clone)]
pub struct ProjectService<R: ProjectRepository, T: TaskRepository, D: UserDirectory> {
    projects: Arc<R>,
    tasks: Arc<T>,
    users: Arc<D>,
}

impl<R: ProjectRepository, T: TaskRepository, D: UserDirectory> ProjectService<R, T, D> {
    pub fn new(projects: R, tasks: T, users: D) -> Self {
        Self {
            projects: Arc::new(projects),
            tasks: Arc::new(tasks),
            users: Arc::new(users),
        }
    }

    /// Create a new project owned by the acting user.
    ///
    /// Always succeeds for a valid input; names are not unique.
    pub async fn create_project(
        &self,
        input: CreateProject,
        user: &CurrentUser,
    ) -> ProjectResult<Project> {
        input
            .validate()
            .map_err(|e| ProjectError::Validation(e.to_string()))?;

        let project = Project::new(input, user.id);
        self.projects.create(project).await
    }

    /// Get a project by ID, readable by owner and members.
    pub async fn get_project(&self, id: Uuid, user: &CurrentUser) -> ProjectResult<Project> {
        let project = self.require_project(id).await?;

        if !can_access(&project, user) {
            return Err(ProjectError::Forbidden(id));
        }

        Ok(project)
    }

    /// List the projects visible to the user: owned plus member, de-duplicated
    /// by id, with the optional text/date filter applied.
    ///
    /// An empty result is an error, not an empty list: callers always either
    /// get projects or a NotFound outcome.
    pub async fn list_projects(
        &self,
        user: &CurrentUser,
        filter: ProjectFilter,
    ) -> ProjectResult<Vec<Project>> {
        let owned = self.projects.list_by_owner(user.id).await?;
        let member = self.projects.list_by_member(user.id).await?;

        // Union, first occurrence wins. A project must never show up twice
        // even if the user is (incorrectly) both owner and member of it.
        let mut seen = std::collections::HashSet::new();
        let combined: Vec<Project> = owned
            .into_iter()
            .chain(member)
            .filter(|p| seen.insert(p.id))
            .filter(|p| filter.matches(p))
            .collect();

        if combined.is_empty() {
            return Err(ProjectError::NotFound("No projects found".to_string()));
        }

        Ok(combined)
    }

    /// Update a project. Owner only; overwrites all mutable fields.
    pub async fn update_project(
        &self,
        id: Uuid,
        input: UpdateProject,
        user: &CurrentUser,
    ) -> ProjectResult<Project> {
        input
            .validate()
            .map_err(|e| ProjectError::Validation(e.to_string()))?;

        let mut project = self.require_project(id).await?;

        if !can_mutate(&project, user) {
            return Err(ProjectError::Forbidden(id));
        }

        project.apply_update(input);
        self.projects.update(project).await
    }

    /// Delete a project. Owner only; cascades to its tasks.
    ///
    /// The cascade is explicit: tasks are deleted through the task
    /// repository before the project row goes, so no storage backend has to
    /// infer it.
    pub async fn delete_project(&self, id: Uuid, user: &CurrentUser) -> ProjectResult<()> {
        let project = self.require_project(id).await?;

        if !can_mutate(&project, user) {
            return Err(ProjectError::Forbidden(id));
        }

        let removed_tasks = self.tasks.delete_by_project(id).await?;
        self.projects.delete(id).await?;

        tracing::info!(
            project_id = %id,
            removed_tasks,
            "Deleted project with task cascade"
        );
        Ok(())
    }

    /// Add a member by email. Owner only; idempotent.
    ///
    /// Adding the owner's own email is a no-op: the owner is never listed as
    /// a member.
    pub async fn add_member(
        &self,
        id: Uuid,
        email: &str,
        user: &CurrentUser,
    ) -> ProjectResult<Project> {
        let mut project = self.require_project(id).await?;

        if !can_mutate(&project, user) {
            return Err(ProjectError::Forbidden(id));
        }

        let member = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| ProjectError::NotFound(format!("No user found with email: {}", email)))?;

        if member.user_id == project.owner_id || project.has_member(&member.email) {
            return Ok(project);
        }

        self.projects.add_member(id, member.clone()).await?;
        project.members.push(member);

        tracing::info!(project_id = %id, member_email = %email, "Added project member");
        Ok(project)
    }

    /// Remove a member by email. Owner only; idempotent — removing an absent
    /// or unknown email is a no-op success.
    pub async fn remove_member(
        &self,
        id: Uuid,
        email: &str,
        user: &CurrentUser,
    ) -> ProjectResult<Project> {
        let mut project = self.require_project(id).await?;

        if !can_mutate(&project, user) {
            return Err(ProjectError::Forbidden(id));
        }

        // Match against the stored membership, not the directory: removal
        // must still work for users deleted from the directory since.
        let existing = project
            .members
            .iter()
            .find(|m| m.email.eq_ignore_ascii_case(email))
            .cloned();

        if let Some(member) = existing {
            self.projects.remove_member(id, member.user_id).await?;
            project.members.retain(|m| m.user_id != member.user_id);
            tracing::info!(project_id = %id, member_email = %email, "Removed project member");
        }

        Ok(project)
    }

    /// Email autocomplete for the member dialog.
    ///
    /// Queries shorter than 3 characters are rejected; an empty match set is
    /// a NotFound outcome, mirroring the list operation.
    pub async fn fetch_emails(&self, query: &str) -> ProjectResult<Vec<String>> {
        if query.len() < 3 {
            return Err(ProjectError::Validation(
                "Email query must be at least 3 characters".to_string(),
            ));
        }

        let needle = query.to_lowercase();
        let matching: Vec<String> = self
            .users
            .list_emails()
            .await?
            .into_iter()
            .filter(|email| email.to_lowercase().contains(&needle))
            .collect();

        if matching.is_empty() {
            return Err(ProjectError::NotFound(format!(
                "No emails matching '{}'",
                query
            )));
        }

        Ok(matching)
    }

    async fn require_project(&self, id: Uuid) -> ProjectResult<Project> {
        self.projects
            .get_by_id(id)
            .await?
            .ok_or_else(|| ProjectError::project_not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProjectMember;
    use crate::repository::{
        InMemoryProjectRepository, InMemoryTaskRepository, InMemoryUserDirectory,
        MockProjectRepository, MockTaskRepository, MockUserDirectory,
    };
    use chrono::NaiveDate;

    fn user(email: &str) -> CurrentUser {
        CurrentUser::new(Uuid::now_v7(), email, "Test User")
    }

    fn create_input(name: &str, due: (i32, u32, u32)) -> CreateProject {
        CreateProject {
            name: name.to_string(),
            description: format!("{} description", name),
            story_points: 5,
            due_date: NaiveDate::from_ymd_opt(due.0, due.1, due.2).unwrap(),
            cost: 100,
        }
    }

    fn in_memory_service()
    -> ProjectService<InMemoryProjectRepository, InMemoryTaskRepository, InMemoryUserDirectory>
    {
        ProjectService::new(
            InMemoryProjectRepository::new(),
            InMemoryTaskRepository::new(),
            InMemoryUserDirectory::new(),
        )
    }

    #[tokio::test]
    async fn test_create_project_sets_owner() {
        let service = in_memory_service();
        let alice = user("alice@x.com");

        let project = service
            .create_project(create_input("alpha", (2026, 12, 1)), &alice)
            .await
            .unwrap();

        assert_eq!(project.owner_id, alice.id);
        assert!(project.members.is_empty());
    }

    #[tokio::test]
    async fn test_create_project_rejects_invalid_input() {
        let service = in_memory_service();
        let alice = user("alice@x.com");
        let mut input = create_input("alpha", (2026, 12, 1));
        input.name = String::new();

        let result = service.create_project(input, &alice).await;
        assert!(matches!(result, Err(ProjectError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_project_forbidden_for_stranger() {
        let service = in_memory_service();
        let alice = user("alice@x.com");
        let bob = user("bob@x.com");

        let project = service
            .create_project(create_input("alpha", (2026, 12, 1)), &alice)
            .await
            .unwrap();

        let result = service.get_project(project.id, &bob).await;
        assert!(matches!(result, Err(ProjectError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_list_projects_unions_owned_and_member() {
        let service = in_memory_service();
        let alice = user("alice@x.com");
        let bob = user("bob@x.com");

        let owned = service
            .create_project(create_input("alpha", (2026, 12, 1)), &alice)
            .await
            .unwrap();
        let other = service
            .create_project(create_input("beta", (2026, 12, 1)), &bob)
            .await
            .unwrap();

        // alice joins bob's project as a member
        service
            .projects
            .add_member(
                other.id,
                ProjectMember {
                    user_id: alice.id,
                    email: alice.email.clone(),
                },
            )
            .await
            .unwrap();

        let listed = service
            .list_projects(&alice, ProjectFilter::default())
            .await
            .unwrap();

        let ids: Vec<_> = listed.iter().map(|p| p.id).collect();
        assert!(ids.contains(&owned.id));
        assert!(ids.contains(&other.id));
        assert_eq!(ids.len(), 2);
    }

    #[tokio::test]
    async fn test_list_projects_never_duplicates_ids() {
        // A user who is both owner and (incorrectly) member must not see the
        // project twice.
        let service = in_memory_service();
        let alice = user("alice@x.com");

        let project = service
            .create_project(create_input("alpha", (2026, 12, 1)), &alice)
            .await
            .unwrap();

        service
            .projects
            .add_member(
                project.id,
                ProjectMember {
                    user_id: alice.id,
                    email: alice.email.clone(),
                },
            )
            .await
            .unwrap();

        let listed = service
            .list_projects(&alice, ProjectFilter::default())
            .await
            .unwrap();

        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_list_projects_empty_is_not_found() {
        let service = in_memory_service();
        let alice = user("alice@x.com");

        let result = service.list_projects(&alice, ProjectFilter::default()).await;
        assert!(matches!(result, Err(ProjectError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_projects_filter_no_match_is_not_found() {
        let service = in_memory_service();
        let alice = user("alice@x.com");

        service
            .create_project(create_input("alpha", (2026, 12, 1)), &alice)
            .await
            .unwrap();

        let filter = ProjectFilter {
            q: Some("zzz-no-such-project".to_string()),
            due_before: None,
        };

        let result = service.list_projects(&alice, filter).await;
        assert!(matches!(result, Err(ProjectError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_projects_applies_combined_filter() {
        let service = in_memory_service();
        let alice = user("alice@x.com");

        service
            .create_project(create_input("early", (2026, 9, 1)), &alice)
            .await
            .unwrap();
        service
            .create_project(create_input("late", (2027, 3, 1)), &alice)
            .await
            .unwrap();

        let filter = ProjectFilter {
            q: Some("description".to_string()),
            due_before: Some(NaiveDate::from_ymd_opt(2027, 1, 1).unwrap()),
        };

        let listed = service.list_projects(&alice, filter).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "early");
    }

    #[tokio::test]
    async fn test_update_project_owner_only() {
        let service = in_memory_service();
        let alice = user("alice@x.com");
        let bob = user("bob@x.com");

        let project = service
            .create_project(create_input("alpha", (2026, 12, 1)), &alice)
            .await
            .unwrap();

        // Even a member may not update the project record
        service
            .projects
            .add_member(
                project.id,
                ProjectMember {
                    user_id: bob.id,
                    email: bob.email.clone(),
                },
            )
            .await
            .unwrap();

        let update = UpdateProject {
            name: "renamed".to_string(),
            description: "changed".to_string(),
            story_points: 8,
            due_date: NaiveDate::from_ymd_opt(2026, 12, 24).unwrap(),
            cost: 250,
        };

        let result = service
            .update_project(project.id, update.clone(), &bob)
            .await;
        assert!(matches!(result, Err(ProjectError::Forbidden(_))));

        let updated = service
            .update_project(project.id, update, &alice)
            .await
            .unwrap();
        assert_eq!(updated.name, "renamed");
        assert_eq!(updated.cost, 250);
    }

    #[tokio::test]
    async fn test_update_unknown_project_is_not_found() {
        let service = in_memory_service();
        let alice = user("alice@x.com");

        let update = UpdateProject {
            name: "renamed".to_string(),
            description: "changed".to_string(),
            story_points: 8,
            due_date: NaiveDate::from_ymd_opt(2026, 12, 24).unwrap(),
            cost: 250,
        };

        let result = service
            .update_project(Uuid::now_v7(), update, &alice)
            .await;
        assert!(matches!(result, Err(ProjectError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_project_cascades_tasks() {
        let service = in_memory_service();
        let alice = user("alice@x.com");

        let project = service
            .create_project(create_input("alpha", (2026, 12, 1)), &alice)
            .await
            .unwrap();

        for name in ["t1", "t2"] {
            let task = crate::tasks::Task::new(
                crate::tasks::CreateTask {
                    name: name.to_string(),
                    description: "cascade test".to_string(),
                    status: "todo".to_string(),
                },
                project.id,
            );
            service.tasks.create(task).await.unwrap();
        }

        service.delete_project(project.id, &alice).await.unwrap();

        assert!(service.projects.get_by_id(project.id).await.unwrap().is_none());
        assert!(
            service
                .tasks
                .list_by_project(project.id)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_delete_project_forbidden_does_not_touch_storage() {
        // Mock-based: a forbidden delete must not reach the task cascade or
        // the project delete.
        let mut projects = MockProjectRepository::new();
        let tasks = MockTaskRepository::new(); // no expectations: any call panics
        let users = MockUserDirectory::new();

        let alice = user("alice@x.com");
        let bob = user("bob@x.com");

        let stored = Project::new(create_input("alpha", (2026, 12, 1)), alice.id);
        let id = stored.id;
        projects
            .expect_get_by_id()
            .with(mockall::predicate::eq(id))
            .returning(move |_| Ok(Some(stored.clone())));

        let service = ProjectService::new(projects, tasks, users);

        let result = service.delete_project(id, &bob).await;
        assert!(matches!(result, Err(ProjectError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_add_member_is_idempotent() {
        let service = in_memory_service();
        let alice = user("alice@x.com");
        let bob_id = Uuid::now_v7();
        service.users.insert(bob_id, "bob@x.com").await;

        let project = service
            .create_project(create_input("alpha", (2026, 12, 1)), &alice)
            .await
            .unwrap();

        service
            .add_member(project.id, "bob@x.com", &alice)
            .await
            .unwrap();
        let after_twice = service
            .add_member(project.id, "bob@x.com", &alice)
            .await
            .unwrap();

        assert_eq!(after_twice.members.len(), 1);
        assert_eq!(after_twice.members[0].user_id, bob_id);
    }

    #[tokio::test]
    async fn test_add_member_unknown_email_is_not_found() {
        let service = in_memory_service();
        let alice = user("alice@x.com");

        let project = service
            .create_project(create_input("alpha", (2026, 12, 1)), &alice)
            .await
            .unwrap();

        let result = service.add_member(project.id, "ghost@x.com", &alice).await;
        assert!(matches!(result, Err(ProjectError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_add_member_owner_email_is_noop() {
        let service = in_memory_service();
        let alice = user("alice@x.com");
        service.users.insert(alice.id, "alice@x.com").await;

        let project = service
            .create_project(create_input("alpha", (2026, 12, 1)), &alice)
            .await
            .unwrap();

        let after = service
            .add_member(project.id, "alice@x.com", &alice)
            .await
            .unwrap();

        // The owner never appears in the member set
        assert!(after.members.is_empty());
    }

    #[tokio::test]
    async fn test_add_member_owner_only() {
        let service = in_memory_service();
        let alice = user("alice@x.com");
        let bob = user("bob@x.com");
        service.users.insert(bob.id, "bob@x.com").await;

        let project = service
            .create_project(create_input("alpha", (2026, 12, 1)), &alice)
            .await
            .unwrap();

        let result = service.add_member(project.id, "bob@x.com", &bob).await;
        assert!(matches!(result, Err(ProjectError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_remove_member_absent_is_noop() {
        let service = in_memory_service();
        let alice = user("alice@x.com");

        let project = service
            .create_project(create_input("alpha", (2026, 12, 1)), &alice)
            .await
            .unwrap();

        // Neither a member nor even a known user: still a success
        let after = service
            .remove_member(project.id, "ghost@x.com", &alice)
            .await
            .unwrap();
        assert!(after.members.is_empty());
    }

    #[tokio::test]
    async fn test_remove_member_then_again() {
        let service = in_memory_service();
        let alice = user("alice@x.com");
        service.users.insert(Uuid::now_v7(), "bob@x.com").await;

        let project = service
            .create_project(create_input("alpha", (2026, 12, 1)), &alice)
            .await
            .unwrap();

        service
            .add_member(project.id, "bob@x.com", &alice)
            .await
            .unwrap();

        let after_first = service
            .remove_member(project.id, "bob@x.com", &alice)
            .await
            .unwrap();
        assert!(after_first.members.is_empty());

        // Second removal is a no-op success
        let after_second = service
            .remove_member(project.id, "bob@x.com", &alice)
            .await
            .unwrap();
        assert!(after_second.members.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_emails_substring_match() {
        let service = in_memory_service();
        service.users.insert(Uuid::now_v7(), "alice@x.com").await;
        service.users.insert(Uuid::now_v7(), "bob@x.com").await;

        let emails = service.fetch_emails("al").await;
        // Two characters: rejected before any lookup
        assert!(matches!(emails, Err(ProjectError::Validation(_))));

        let emails = service.fetch_emails("ali").await.unwrap();
        assert_eq!(emails, vec!["alice@x.com".to_string()]);
    }

    #[tokio::test]
    async fn test_fetch_emails_no_match_is_not_found() {
        let service = in_memory_service();
        service.users.insert(Uuid::now_v7(), "alice@x.com").await;

        let result = service.fetch_emails("xyz").await;
        assert!(matches!(result, Err(ProjectError::NotFound(_))));
    }
}
