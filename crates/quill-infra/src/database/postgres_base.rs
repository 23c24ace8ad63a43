use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::{DbConn, DbErr, EntityTrait, PaginatorTrait, PrimaryKeyTrait, SqlErr};

use quill_core::PersistenceError;
use quill_core::ports::BaseRepository;

/// Generic PostgreSQL repository implementation.
pub struct PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub(crate) db: DbConn,
    _entity: PhantomData<E>,
}

impl<E> PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: DbConn) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    /// The pooled connection this repository runs its queries on.
    pub fn connection(&self) -> &DbConn {
        &self.db
    }
}

/// Classify a SeaORM error into the store's error taxonomy.
pub fn map_db_err(err: DbErr) -> PersistenceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg))
        | Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
            return PersistenceError::ConstraintViolation(msg);
        }
        _ => {}
    }

    match err {
        DbErr::Conn(e) => PersistenceError::ConnectionFailure(e.to_string()),
        DbErr::ConnectionAcquire(e) => PersistenceError::ConnectionFailure(e.to_string()),
        other => {
            let msg = other.to_string();
            if msg.contains("duplicate key") || msg.contains("violates") {
                PersistenceError::ConstraintViolation(msg)
            } else if msg.contains("error communicating with database") {
                PersistenceError::ConnectionFailure(msg)
            } else {
                PersistenceError::Query(msg)
            }
        }
    }
}

#[async_trait]
impl<E, T, ID> BaseRepository<T, ID> for PostgresBaseRepository<E>
where
    E: EntityTrait,
    E::Model: Sync + Send,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = ID>,
    ID: Send + Sync + Into<sea_orm::Value> + Clone + Copy + 'static,
    T: From<E::Model> + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, PersistenceError> {
        let result = E::find_by_id(id).one(&self.db).await.map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn count(&self) -> Result<u64, PersistenceError> {
        E::find().count(&self.db).await.map_err(map_db_err)
    }

    async fn delete_all(&self) -> Result<u64, PersistenceError> {
        let result = E::delete_many().exec(&self.db).await.map_err(map_db_err)?;

        let entity = E::default();
        tracing::debug!(
            table = entity.table_name(),
            deleted = result.rows_affected,
            "Cleared table"
        );
        Ok(result.rows_affected)
    }
}
