//! Task models. Tasks always belong to exactly one project and are reached
//! through it; there is no standalone task listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Task entity
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Task {
    /// Unique identifier
    pub id: Uuid,
    /// Task name
    pub name: String,
    /// Task description
    pub description: String,
    /// Free-form workflow status (e.g. "todo", "in progress", "done")
    pub status: String,
    /// Owning project
    pub project_id: Uuid,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new task
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTask {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 1000))]
    pub description: String,
    #[validate(length(min = 1, max = 100))]
    pub status: String,
}

/// DTO for updating a task. All fields required: full overwrite.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateTask {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 1000))]
    pub description: String,
    #[validate(length(min = 1, max = 100))]
    pub status: String,
}

impl Task {
    /// Create a new task in `project_id` from a CreateTask DTO
    pub fn new(input: CreateTask, project_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            description: input.description,
            status: input.status,
            project_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite all mutable fields from an UpdateTask DTO
    pub fn apply_update(&mut self, update: UpdateTask) {
        self.name = update.name;
        self.description = update.description;
        self.status = update.status;
        self.updated_at = Utc::now();
    }
}
