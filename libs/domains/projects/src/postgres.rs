use async_trait::async_trait;
use database::BaseRepository;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, FromQueryResult,
    QueryFilter, QueryOrder, Statement,
};
use uuid::Uuid;

use crate::{
    entity,
    error::{ProjectError, ProjectResult, TaskError, TaskResult},
    models::{Project, ProjectMember},
    repository::{ProjectRepository, TaskRepository, UserDirectory},
    tasks::Task,
};

/// PostgreSQL implementation of ProjectRepository
pub struct PgProjectRepository {
    base: BaseRepository<entity::projects::Entity>,
}

impl PgProjectRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Load the member rows for one project, emails joined in from users.
    async fn load_members(&self, project_id: Uuid) -> ProjectResult<Vec<ProjectMember>> {
        #[derive(FromQueryResult)]
        struct MemberRow {
            user_id: Uuid,
            email: String,
        }

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            SELECT m.user_id, u.email
            FROM project_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.project_id = $1
            ORDER BY u.email
            "#,
            [project_id.into()],
        );

        let rows = MemberRow::find_by_statement(stmt)
            .all(self.base.db())
            .await
            .map_err(|e| ProjectError::Internal(format!("Database error: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|r| ProjectMember {
                user_id: r.user_id,
                email: r.email,
            })
            .collect())
    }

    async fn with_members(&self, model: entity::projects::Model) -> ProjectResult<Project> {
        let members = self.load_members(model.id).await?;
        Ok(model.into_project(members))
    }

    async fn collect_with_members(
        &self,
        models: Vec<entity::projects::Model>,
    ) -> ProjectResult<Vec<Project>> {
        let mut projects = Vec::with_capacity(models.len());
        for model in models {
            projects.push(self.with_members(model).await?);
        }
        Ok(projects)
    }
}

#[async_trait]
impl ProjectRepository for PgProjectRepository {
    async fn create(&self, project: Project) -> ProjectResult<Project> {
        let active_model: entity::projects::ActiveModel = (&project).into();

        let model = self
            .base
            .insert(active_model)
            .await
            .map_err(|e| ProjectError::Internal(format!("Database error: {}", e)))?;

        tracing::info!(project_id = %model.id, "Created project");
        Ok(model.into_project(Vec::new()))
    }

    async fn get_by_id(&self, id: Uuid) -> ProjectResult<Option<Project>> {
        let model = self
            .base
            .find_by_id(id)
            .await
            .map_err(|e| ProjectError::Internal(format!("Database error: {}", e)))?;

        match model {
            Some(model) => Ok(Some(self.with_members(model).await?)),
            None => Ok(None),
        }
    }

    async fn list_by_owner(&self, user_id: Uuid) -> ProjectResult<Vec<Project>> {
        let models = entity::projects::Entity::find()
            .filter(entity::projects::Column::OwnerId.eq(user_id))
            .order_by_asc(entity::projects::Column::CreatedAt)
            .all(self.base.db())
            .await
            .map_err(|e| ProjectError::Internal(format!("Database error: {}", e)))?;

        self.collect_with_members(models).await
    }

    async fn list_by_member(&self, user_id: Uuid) -> ProjectResult<Vec<Project>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            SELECT p.*
            FROM projects p
            INNER JOIN project_members m ON m.project_id = p.id
            WHERE m.user_id = $1
            ORDER BY p.created_at
            "#,
            [user_id.into()],
        );

        let models = entity::projects::Model::find_by_statement(stmt)
            .all(self.base.db())
            .await
            .map_err(|e| ProjectError::Internal(format!("Database error: {}", e)))?;

        self.collect_with_members(models).await
    }

    async fn update(&self, project: Project) -> ProjectResult<Project> {
        let members = project.members.clone();
        let active_model: entity::projects::ActiveModel = (&project).into();

        let model = self
            .base
            .update(active_model)
            .await
            .map_err(|e| ProjectError::Internal(format!("Database error: {}", e)))?;

        tracing::info!(project_id = %model.id, "Updated project");
        Ok(model.into_project(members))
    }

    async fn delete(&self, id: Uuid) -> ProjectResult<bool> {
        // Membership rows go via ON DELETE CASCADE; tasks were already
        // removed explicitly by the service.
        let rows_affected = self
            .base
            .delete_by_id(id)
            .await
            .map_err(|e| ProjectError::Internal(format!("Database error: {}", e)))?;

        if rows_affected > 0 {
            tracing::info!(project_id = %id, "Deleted project");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn add_member(&self, project_id: Uuid, member: ProjectMember) -> ProjectResult<()> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            INSERT INTO project_members (project_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
            [project_id.into(), member.user_id.into()],
        );

        self.base
            .db()
            .execute_raw(stmt)
            .await
            .map_err(|e| ProjectError::Internal(format!("Database error: {}", e)))?;

        Ok(())
    }

    async fn remove_member(&self, project_id: Uuid, user_id: Uuid) -> ProjectResult<()> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM project_members WHERE project_id = $1 AND user_id = $2",
            [project_id.into(), user_id.into()],
        );

        self.base
            .db()
            .execute_raw(stmt)
            .await
            .map_err(|e| ProjectError::Internal(format!("Database error: {}", e)))?;

        Ok(())
    }
}

/// PostgreSQL implementation of TaskRepository
pub struct PgTaskRepository {
    base: BaseRepository<entity::tasks::Entity>,
}

impl PgTaskRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn create(&self, task: Task) -> TaskResult<Task> {
        let active_model: entity::tasks::ActiveModel = (&task).into();

        let model = self
            .base
            .insert(active_model)
            .await
            .map_err(|e| TaskError::Internal(format!("Database error: {}", e)))?;

        tracing::info!(task_id = %model.id, project_id = %model.project_id, "Created task");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: Uuid) -> TaskResult<Option<Task>> {
        let model = self
            .base
            .find_by_id(id)
            .await
            .map_err(|e| TaskError::Internal(format!("Database error: {}", e)))?;

        Ok(model.map(|m| m.into()))
    }

    async fn list_by_project(&self, project_id: Uuid) -> TaskResult<Vec<Task>> {
        let models = entity::tasks::Entity::find()
            .filter(entity::tasks::Column::ProjectId.eq(project_id))
            .order_by_asc(entity::tasks::Column::CreatedAt)
            .order_by_asc(entity::tasks::Column::Id)
            .all(self.base.db())
            .await
            .map_err(|e| TaskError::Internal(format!("Database error: {}", e)))?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn update(&self, task: Task) -> TaskResult<Task> {
        let active_model: entity::tasks::ActiveModel = (&task).into();

        let model = self
            .base
            .update(active_model)
            .await
            .map_err(|e| TaskError::Internal(format!("Database error: {}", e)))?;

        tracing::info!(task_id = %model.id, "Updated task");
        Ok(model.into())
    }

    async fn delete(&self, id: Uuid) -> TaskResult<bool> {
        let rows_affected = self
            .base
            .delete_by_id(id)
            .await
            .map_err(|e| TaskError::Internal(format!("Database error: {}", e)))?;

        if rows_affected > 0 {
            tracing::info!(task_id = %id, "Deleted task");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn delete_by_project(&self, project_id: Uuid) -> TaskResult<u64> {
        let result = entity::tasks::Entity::delete_many()
            .filter(entity::tasks::Column::ProjectId.eq(project_id))
            .exec(self.base.db())
            .await
            .map_err(|e| TaskError::Internal(format!("Database error: {}", e)))?;

        tracing::info!(
            project_id = %project_id,
            removed = result.rows_affected,
            "Deleted project tasks"
        );
        Ok(result.rows_affected)
    }
}

/// PostgreSQL implementation of UserDirectory over the users table
#[derive(Clone)]
pub struct PgUserDirectory {
    db: DatabaseConnection,
}

impl PgUserDirectory {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_email(&self, email: &str) -> ProjectResult<Option<ProjectMember>> {
        #[derive(FromQueryResult)]
        struct UserRow {
            user_id: Uuid,
            email: String,
        }

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT id AS user_id, email FROM users WHERE LOWER(email) = LOWER($1)",
            [email.into()],
        );

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| ProjectError::Internal(format!("Database error: {}", e)))?;

        Ok(row.map(|r| ProjectMember {
            user_id: r.user_id,
            email: r.email,
        }))
    }

    async fn list_emails(&self) -> ProjectResult<Vec<String>> {
        #[derive(FromQueryResult)]
        struct EmailRow {
            email: String,
        }

        let stmt = Statement::from_string(
            DbBackend::Postgres,
            "SELECT email FROM users ORDER BY email".to_owned(),
        );

        let rows = EmailRow::find_by_statement(stmt)
            .all(&self.db)
            .await
            .map_err(|e| ProjectError::Internal(format!("Database error: {}", e)))?;

        Ok(rows.into_iter().map(|r| r.email).collect())
    }
}
