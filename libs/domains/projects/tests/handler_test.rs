//! Handler tests for the projects domain
//!
//! These verify the HTTP surface: request deserialization, response
//! serialization, status codes and error envelopes. The routers run over the
//! in-memory repositories with the authenticated user injected as a request
//! extension, exactly what the JWT middleware produces in production.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::{Extension, Router};
use axum_helpers::CurrentUser;
use domain_projects::*;
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt; // For oneshot()
use uuid::Uuid;

struct TestApp {
    projects: InMemoryProjectRepository,
    tasks: InMemoryTaskRepository,
    directory: InMemoryUserDirectory,
}

impl TestApp {
    fn new() -> Self {
        Self {
            projects: InMemoryProjectRepository::new(),
            tasks: InMemoryTaskRepository::new(),
            directory: InMemoryUserDirectory::new(),
        }
    }

    /// Build the router as seen by `user`. The Extension layer stands in for
    /// the auth middleware.
    fn router_as(&self, user: &CurrentUser) -> Router {
        let service = ProjectService::new(
            self.projects.clone(),
            self.tasks.clone(),
            self.directory.clone(),
        );
        let task_service = TaskService::new(self.tasks.clone(), self.projects.clone());

        handlers::router(service, task_service).layer(Extension(user.clone()))
    }
}

fn user(email: &str) -> CurrentUser {
    CurrentUser::new(Uuid::now_v7(), email, "Test User")
}

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn put_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn sample_project_json() -> serde_json::Value {
    json!({
        "name": "Website Relaunch",
        "description": "New marketing site",
        "story_points": 13,
        "due_date": "2026-10-01",
        "cost": 5000
    })
}

#[tokio::test]
async fn test_create_project_returns_201() {
    let app = TestApp::new();
    let alice = user("alice@x.com");

    let response = app
        .router_as(&alice)
        .oneshot(post_json("/", sample_project_json()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let project: Project = json_body(response.into_body()).await;
    assert_eq!(project.name, "Website Relaunch");
    assert_eq!(project.owner_id, alice.id);
    assert!(project.members.is_empty());
}

#[tokio::test]
async fn test_create_project_validates_input() {
    let app = TestApp::new();
    let alice = user("alice@x.com");

    let mut body = sample_project_json();
    body["name"] = json!("");

    let response = app
        .router_as(&alice)
        .oneshot(post_json("/", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_projects_empty_returns_404() {
    let app = TestApp::new();
    let alice = user("alice@x.com");

    let response = app.router_as(&alice).oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_projects_with_filter() {
    let app = TestApp::new();
    let alice = user("alice@x.com");

    app.router_as(&alice)
        .oneshot(post_json("/", sample_project_json()))
        .await
        .unwrap();

    let response = app
        .router_as(&alice)
        .oneshot(get("/?q=relaunch&due_before=2026-12-01"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let projects: Vec<Project> = json_body(response.into_body()).await;
    assert_eq!(projects.len(), 1);

    // Same query against a later due_before cutoff that excludes the project
    let response = app
        .router_as(&alice)
        .oneshot(get("/?q=relaunch&due_before=2026-01-01"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_project_forbidden_for_stranger() {
    let app = TestApp::new();
    let alice = user("alice@x.com");
    let mallory = user("mallory@x.com");

    let response = app
        .router_as(&alice)
        .oneshot(post_json("/", sample_project_json()))
        .await
        .unwrap();
    let project: Project = json_body(response.into_body()).await;

    let response = app
        .router_as(&mallory)
        .oneshot(get(&format!("/{}", project.id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_update_project_owner_only() {
    let app = TestApp::new();
    let alice = user("alice@x.com");
    let bob = user("bob@x.com");
    app.directory.insert(bob.id, bob.email.clone()).await;

    let response = app
        .router_as(&alice)
        .oneshot(post_json("/", sample_project_json()))
        .await
        .unwrap();
    let project: Project = json_body(response.into_body()).await;

    // bob becomes a member, which still does not allow project mutation
    let response = app
        .router_as(&alice)
        .oneshot(post_json(
            &format!("/{}/members", project.id),
            json!({"email": "bob@x.com"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let update = json!({
        "name": "Hijacked",
        "description": "nope",
        "story_points": 1,
        "due_date": "2026-10-01",
        "cost": 1
    });

    let response = app
        .router_as(&bob)
        .oneshot(put_json(&format!("/{}", project.id), update.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .router_as(&alice)
        .oneshot(put_json(&format!("/{}", project.id), update))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let updated: Project = json_body(response.into_body()).await;
    assert_eq!(updated.name, "Hijacked");
}

#[tokio::test]
async fn test_delete_project_returns_204() {
    let app = TestApp::new();
    let alice = user("alice@x.com");

    let response = app
        .router_as(&alice)
        .oneshot(post_json("/", sample_project_json()))
        .await
        .unwrap();
    let project: Project = json_body(response.into_body()).await;

    let response = app
        .router_as(&alice)
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/{}", project.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .router_as(&alice)
        .oneshot(get(&format!("/{}", project.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_member_task_flow_over_http() {
    let app = TestApp::new();
    let alice = user("alice@x.com");
    let bob = user("bob@x.com");
    app.directory.insert(bob.id, bob.email.clone()).await;

    let response = app
        .router_as(&alice)
        .oneshot(post_json("/", sample_project_json()))
        .await
        .unwrap();
    let project: Project = json_body(response.into_body()).await;

    // bob cannot create a task yet
    let task_body = json!({"name": "write copy", "description": "landing page", "status": "todo"});
    let response = app
        .router_as(&bob)
        .oneshot(post_json(&format!("/{}/tasks", project.id), task_body.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // alice adds bob, then the same request succeeds with 201
    app.router_as(&alice)
        .oneshot(post_json(
            &format!("/{}/members", project.id),
            json!({"email": "bob@x.com"}),
        ))
        .await
        .unwrap();

    let response = app
        .router_as(&bob)
        .oneshot(post_json(&format!("/{}/tasks", project.id), task_body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let task: Task = json_body(response.into_body()).await;
    assert_eq!(task.project_id, project.id);

    // ...and the task shows up in bob's listing
    let response = app
        .router_as(&bob)
        .oneshot(get(&format!("/{}/tasks", project.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let tasks: Vec<Task> = json_body(response.into_body()).await;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, task.id);
}

#[tokio::test]
async fn test_fetch_emails_over_http() {
    let app = TestApp::new();
    let alice = user("alice@x.com");
    app.directory.insert(Uuid::now_v7(), "alice@x.com").await;
    app.directory.insert(Uuid::now_v7(), "bob@x.com").await;

    // Too short: 400
    let response = app
        .router_as(&alice)
        .oneshot(get("/emails?q=al"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Match: 200 with the matching email only
    let response = app
        .router_as(&alice)
        .oneshot(get("/emails?q=ali"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let emails: Vec<String> = json_body(response.into_body()).await;
    assert_eq!(emails, vec!["alice@x.com".to_string()]);

    // No match: 404
    let response = app
        .router_as(&alice)
        .oneshot(get("/emails?q=xyz"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_uuid_path_returns_400() {
    let app = TestApp::new();
    let alice = user("alice@x.com");

    let response = app
        .router_as(&alice)
        .oneshot(get("/not-a-uuid"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
