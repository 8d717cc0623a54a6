//! Scenario tests for the projects domain services.
//!
//! These drive ProjectService and TaskService together over the in-memory
//! repositories, covering the cross-service flows: membership changes
//! opening task access, and project deletion cascading to tasks.

use axum_helpers::CurrentUser;
use chrono::NaiveDate;
use domain_projects::{
    CreateProject, CreateTask, InMemoryProjectRepository, InMemoryTaskRepository,
    InMemoryUserDirectory, ProjectError, ProjectFilter, ProjectService, TaskError, TaskService,
};
use test_utils::TestDataBuilder;
use uuid::Uuid;

struct World {
    projects: ProjectService<InMemoryProjectRepository, InMemoryTaskRepository, InMemoryUserDirectory>,
    tasks: TaskService<InMemoryTaskRepository, InMemoryProjectRepository>,
    directory: InMemoryUserDirectory,
}

fn world() -> World {
    let project_repo = InMemoryProjectRepository::new();
    let task_repo = InMemoryTaskRepository::new();
    let directory = InMemoryUserDirectory::new();

    World {
        projects: ProjectService::new(project_repo.clone(), task_repo.clone(), directory.clone()),
        tasks: TaskService::new(task_repo, project_repo),
        directory,
    }
}

fn current_user(email: &str) -> CurrentUser {
    CurrentUser::new(Uuid::now_v7(), email, email.split('@').next().unwrap())
}

fn project_input(builder: &TestDataBuilder, suffix: &str) -> CreateProject {
    CreateProject {
        name: builder.name("project", suffix),
        description: format!("scenario project {}", suffix),
        story_points: 8,
        due_date: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
        cost: 400,
    }
}

fn task_input(name: &str) -> CreateTask {
    CreateTask {
        name: name.to_string(),
        description: format!("{} description", name),
        status: "todo".to_string(),
    }
}

#[tokio::test]
async fn test_outsider_cannot_create_task() {
    let w = world();
    let builder = TestDataBuilder::from_test_name("outsider_task");

    let alice = current_user("alice@x.com");
    let bob = current_user("bob@x.com");

    let project = w
        .projects
        .create_project(project_input(&builder, "main"), &alice)
        .await
        .unwrap();

    // bob is neither owner nor member
    let result = w
        .tasks
        .create_task(task_input("sneaky"), project.id, &bob)
        .await;

    assert!(matches!(result, Err(TaskError::Forbidden(_))));
}

#[tokio::test]
async fn test_membership_opens_task_access() {
    let w = world();
    let builder = TestDataBuilder::from_test_name("membership_flow");

    let alice = current_user("alice@x.com");
    let bob = current_user("bob@x.com");
    w.directory.insert(bob.id, bob.email.clone()).await;

    let project = w
        .projects
        .create_project(project_input(&builder, "shared"), &alice)
        .await
        .unwrap();

    // Before membership: no access at all
    assert!(w.tasks.list_tasks(project.id, &bob).await.is_err());

    w.projects
        .add_member(project.id, &bob.email, &alice)
        .await
        .unwrap();

    // After membership: bob can create and sees his task listed
    let task = w
        .tasks
        .create_task(task_input("bob-task"), project.id, &bob)
        .await
        .unwrap();

    let listed = w.tasks.list_tasks(project.id, &bob).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, task.id);

    // But the project record itself stays owner-only
    let result = w.projects.delete_project(project.id, &bob).await;
    assert!(matches!(result, Err(ProjectError::Forbidden(_))));
}

#[tokio::test]
async fn test_project_delete_cascades_to_tasks() {
    let w = world();
    let builder = TestDataBuilder::from_test_name("delete_cascade");

    let alice = current_user("alice@x.com");

    let project = w
        .projects
        .create_project(project_input(&builder, "doomed"), &alice)
        .await
        .unwrap();

    let t1 = w
        .tasks
        .create_task(task_input("t1"), project.id, &alice)
        .await
        .unwrap();
    let t2 = w
        .tasks
        .create_task(task_input("t2"), project.id, &alice)
        .await
        .unwrap();

    w.projects.delete_project(project.id, &alice).await.unwrap();

    // The project is gone, and so are both tasks
    assert!(matches!(
        w.projects.get_project(project.id, &alice).await,
        Err(ProjectError::NotFound(_))
    ));
    for task_id in [t1.id, t2.id] {
        assert!(matches!(
            w.tasks.get_task(project.id, task_id, &alice).await,
            Err(TaskError::NotFound(_))
        ));
    }
}

#[tokio::test]
async fn test_member_sees_project_in_listing() {
    let w = world();
    let builder = TestDataBuilder::from_test_name("member_listing");

    let alice = current_user("alice@x.com");
    let bob = current_user("bob@x.com");
    w.directory.insert(bob.id, bob.email.clone()).await;

    let project = w
        .projects
        .create_project(project_input(&builder, "visible"), &alice)
        .await
        .unwrap();

    // bob sees nothing yet: empty list is a NotFound outcome
    assert!(matches!(
        w.projects.list_projects(&bob, ProjectFilter::default()).await,
        Err(ProjectError::NotFound(_))
    ));

    w.projects
        .add_member(project.id, &bob.email, &alice)
        .await
        .unwrap();

    let listed = w
        .projects
        .list_projects(&bob, ProjectFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, project.id);
}

#[tokio::test]
async fn test_fetch_emails_scenarios() {
    let w = world();

    w.directory.insert(Uuid::now_v7(), "alice@x.com").await;
    w.directory.insert(Uuid::now_v7(), "bob@x.com").await;

    // Substring match, case-insensitive
    let emails = w.projects.fetch_emails("ALI").await.unwrap();
    assert_eq!(emails, vec!["alice@x.com".to_string()]);

    // No match is NotFound, never an empty OK
    assert!(matches!(
        w.projects.fetch_emails("xyz").await,
        Err(ProjectError::NotFound(_))
    ));

    // Too-short query is rejected as bad input
    assert!(matches!(
        w.projects.fetch_emails("ab").await,
        Err(ProjectError::Validation(_))
    ));
}
