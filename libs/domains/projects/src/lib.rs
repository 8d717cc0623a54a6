//! Projects Domain
//!
//! Complete domain implementation for projects, their members, and the tasks
//! they own. Projects are created by an owner who alone may change or delete
//! them and manage the member list; members get read and task-level access.
//! Tasks are owned sub-entities: they live and die with their project.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints (projects, members, tasks)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │  Services   │  ← authorization, query core, mutation core
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← data access (traits + implementations)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← entities, DTOs
//! └─────────────┘
//! ```
//!
//! The authorization rule itself lives in [`access`] as pure functions over
//! plain data, so it is testable without any request machinery.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_projects::{
//!     handlers,
//!     repository::{InMemoryProjectRepository, InMemoryTaskRepository, InMemoryUserDirectory},
//!     service::ProjectService,
//!     task_service::TaskService,
//! };
//!
//! let projects = InMemoryProjectRepository::new();
//! let tasks = InMemoryTaskRepository::new();
//! let users = InMemoryUserDirectory::new();
//!
//! let project_service = ProjectService::new(projects.clone(), tasks.clone(), users);
//! let task_service = TaskService::new(tasks, projects);
//!
//! let router = handlers::router(project_service, task_service);
//! ```

pub mod access;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod task_handlers;
pub mod task_service;
pub mod tasks;

// Re-export commonly used types
pub use access::{can_access, can_mutate};
pub use error::{ProjectError, ProjectResult, TaskError, TaskResult};
pub use models::{
    AddMember, CreateProject, Project, ProjectFilter, ProjectMember, UpdateProject,
};
pub use postgres::{PgProjectRepository, PgTaskRepository, PgUserDirectory};
pub use repository::{
    InMemoryProjectRepository, InMemoryTaskRepository, InMemoryUserDirectory, ProjectRepository,
    TaskRepository, UserDirectory,
};
pub use service::ProjectService;
pub use task_service::TaskService;
pub use tasks::{CreateTask, Task, UpdateTask};
