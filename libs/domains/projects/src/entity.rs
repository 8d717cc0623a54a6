//! SeaORM entities for the projects, project_members and tasks tables.

/// Projects table
pub mod projects {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "projects")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub name: String,
        #[sea_orm(column_type = "Text")]
        pub description: String,
        pub story_points: i32,
        pub due_date: Date,
        pub cost: i32,
        pub owner_id: Uuid,
        pub created_at: DateTimeWithTimeZone,
        pub updated_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::tasks::Entity")]
        Tasks,
        #[sea_orm(has_many = "super::members::Entity")]
        Members,
    }

    impl Related<super::tasks::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Tasks.def()
        }
    }

    impl Related<super::members::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Members.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Membership junction table (project_id, user_id)
pub mod members {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "project_members")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub project_id: Uuid,
        #[sea_orm(primary_key, auto_increment = false)]
        pub user_id: Uuid,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::projects::Entity",
            from = "Column::ProjectId",
            to = "super::projects::Column::Id"
        )]
        Project,
    }

    impl Related<super::projects::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Project.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Tasks table
pub mod tasks {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "tasks")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub name: String,
        #[sea_orm(column_type = "Text")]
        pub description: String,
        pub status: String,
        pub project_id: Uuid,
        pub created_at: DateTimeWithTimeZone,
        pub updated_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::projects::Entity",
            from = "Column::ProjectId",
            to = "super::projects::Column::Id"
        )]
        Project,
    }

    impl Related<super::projects::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Project.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

use crate::models::{Project, ProjectMember};
use crate::tasks::Task;
use sea_orm::ActiveValue::Set;

impl projects::Model {
    /// Attach separately-loaded members to build the domain aggregate.
    pub fn into_project(self, members: Vec<ProjectMember>) -> Project {
        Project {
            id: self.id,
            name: self.name,
            description: self.description,
            story_points: self.story_points,
            due_date: self.due_date,
            cost: self.cost,
            owner_id: self.owner_id,
            members,
            created_at: self.created_at.into(),
            updated_at: self.updated_at.into(),
        }
    }
}

impl From<&Project> for projects::ActiveModel {
    fn from(project: &Project) -> Self {
        projects::ActiveModel {
            id: Set(project.id),
            name: Set(project.name.clone()),
            description: Set(project.description.clone()),
            story_points: Set(project.story_points),
            due_date: Set(project.due_date),
            cost: Set(project.cost),
            owner_id: Set(project.owner_id),
            created_at: Set(project.created_at.into()),
            updated_at: Set(project.updated_at.into()),
        }
    }
}

impl From<tasks::Model> for Task {
    fn from(model: tasks::Model) -> Self {
        Task {
            id: model.id,
            name: model.name,
            description: model.description,
            status: model.status,
            project_id: model.project_id,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<&Task> for tasks::ActiveModel {
    fn from(task: &Task) -> Self {
        tasks::ActiveModel {
            id: Set(task.id),
            name: Set(task.name.clone()),
            description: Set(task.description.clone()),
            status: Set(task.status.clone()),
            project_id: Set(task.project_id),
            created_at: Set(task.created_at.into()),
            updated_at: Set(task.updated_at.into()),
        }
    }
}
