//! Generic CRUD helper over a SeaORM entity with a UUID primary key.
//!
//! Domain repositories wrap a [`BaseRepository`] for the common
//! insert/find/update/delete plumbing and add their entity-specific queries
//! on top via [`BaseRepository::db`].

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PrimaryKeyTrait,
};
use std::marker::PhantomData;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct BaseRepository<E: EntityTrait> {
    db: DatabaseConnection,
    _entity: PhantomData<E>,
}

impl<E: EntityTrait> BaseRepository<E> {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    /// Access the underlying connection for entity-specific queries.
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Insert a new row and return the stored model.
    pub async fn insert<A>(&self, model: A) -> Result<E::Model, DbErr>
    where
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
        E::Model: IntoActiveModel<A>,
    {
        model.insert(&self.db).await
    }

    /// Update an existing row and return the stored model.
    pub async fn update<A>(&self, model: A) -> Result<E::Model, DbErr>
    where
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
        E::Model: IntoActiveModel<A>,
    {
        model.update(&self.db).await
    }

    /// Fetch a row by its UUID primary key.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<E::Model>, DbErr>
    where
        <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<Uuid>,
    {
        E::find_by_id(id).one(&self.db).await
    }

    /// Delete a row by its UUID primary key, returning the affected count.
    pub async fn delete_by_id(&self, id: Uuid) -> Result<u64, DbErr>
    where
        <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<Uuid>,
    {
        let result = E::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected)
    }
}
