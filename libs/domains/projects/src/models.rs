use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// A user granted member access to a project.
///
/// Members may read the project and manage its tasks; only the owner mutates
/// the project itself. The email is carried alongside the id because the
/// access rule matches on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProjectMember {
    pub user_id: Uuid,
    pub email: String,
}

/// Project entity
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Project {
    /// Unique identifier
    pub id: Uuid,
    /// Project name (no uniqueness constraint)
    pub name: String,
    /// Project description
    pub description: String,
    /// Estimated effort in story points
    pub story_points: i32,
    /// Date the project is due
    pub due_date: NaiveDate,
    /// Budgeted cost
    pub cost: i32,
    /// Owner of the project (exactly one; never listed in `members`)
    pub owner_id: Uuid,
    /// Users with member access
    pub members: Vec<ProjectMember>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new project
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProject {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 1000))]
    pub description: String,
    #[validate(range(min = 0))]
    pub story_points: i32,
    pub due_date: NaiveDate,
    #[validate(range(min = 0))]
    pub cost: i32,
}

/// DTO for updating an existing project.
///
/// Every mutable field is required: an update overwrites them all in one
/// atomic write (PUT semantics, not PATCH).
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateProject {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 1000))]
    pub description: String,
    #[validate(range(min = 0))]
    pub story_points: i32,
    pub due_date: NaiveDate,
    #[validate(range(min = 0))]
    pub cost: i32,
}

/// DTO for adding a member by email
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AddMember {
    #[validate(email, length(max = 255))]
    pub email: String,
}

/// Query filters for listing projects.
///
/// Filter precedence: when both are present a project must match the text
/// query AND be due strictly before the given date; one alone applies alone;
/// neither keeps everything.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct ProjectFilter {
    /// Case-insensitive substring matched against name and description
    pub q: Option<String>,
    /// Keep projects due strictly before this date
    pub due_before: Option<NaiveDate>,
}

impl ProjectFilter {
    /// Whether a project passes this filter.
    pub fn matches(&self, project: &Project) -> bool {
        let text_match = |query: &str| {
            let query = query.to_lowercase();
            project.name.to_lowercase().contains(&query)
                || project.description.to_lowercase().contains(&query)
        };

        match (&self.q, &self.due_before) {
            (Some(query), Some(date)) => text_match(query) && project.due_date < *date,
            (Some(query), None) => text_match(query),
            (None, Some(date)) => project.due_date < *date,
            (None, None) => true,
        }
    }
}

impl Project {
    /// Create a new project owned by `owner_id` from a CreateProject DTO
    pub fn new(input: CreateProject, owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            description: input.description,
            story_points: input.story_points,
            due_date: input.due_date,
            cost: input.cost,
            owner_id,
            members: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite all mutable fields from an UpdateProject DTO
    pub fn apply_update(&mut self, update: UpdateProject) {
        self.name = update.name;
        self.description = update.description;
        self.story_points = update.story_points;
        self.due_date = update.due_date;
        self.cost = update.cost;
        self.updated_at = Utc::now();
    }

    /// Whether this email belongs to a member (case-insensitive)
    pub fn has_member(&self, email: &str) -> bool {
        self.members
            .iter()
            .any(|m| m.email.eq_ignore_ascii_case(email))
    }
}
