use thiserror::Error;

use crate::model::{Copyright, Device, Entity, Id, Scientist};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record {0} not found")]
    NotFound(Id),
    /// Uniqueness, not-null, check or data-range rejection by the store.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            // SQLSTATE class 22 is "data exception", class 23 "integrity constraint violation"
            let constraint = db_err
                .code()
                .map_or(false, |code| code.starts_with("22") || code.starts_with("23"));
            if constraint {
                return StoreError::ConstraintViolation(db_err.message().to_string());
            }
        }
        StoreError::Database(err)
    }
}

/// Repository operations for one entity type.
///
/// `delete` is idempotent: removing an id that does not exist succeeds.
/// Deleting a record also removes every copyright that references it.
#[async_trait::async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<E>>;
    async fn get(&self, id: Id) -> StoreResult<Option<E>>;
    /// Insert a record and return its assigned id.
    async fn create(&self, draft: E::Draft) -> StoreResult<Id>;
    /// Replace all business fields of an existing record.
    async fn update(&self, id: Id, draft: E::Draft) -> StoreResult<()>;
    async fn delete(&self, id: Id) -> StoreResult<()>;
    /// Records of the related type joined to `id` through `copyrights`.
    async fn list_related(&self, id: Id) -> StoreResult<Vec<E::Related>>;
}

/// The `copyrights` join set. Both operations are idempotent.
#[async_trait::async_trait]
pub trait CopyrightStore: Send + Sync {
    async fn relate(&self, copyright: Copyright) -> StoreResult<()>;
    async fn unrelate(&self, copyright: Copyright) -> StoreResult<()>;
}

pub trait Store: EntityStore<Scientist> + EntityStore<Device> + CopyrightStore + Send + Sync {}

impl<T> Store for T where T: EntityStore<Scientist> + EntityStore<Device> + CopyrightStore {}
