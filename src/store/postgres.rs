use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, postgres::PgRow, PgPool, Row};

use crate::model::{Copyright, Device, Id, NewDevice, NewScientist, Scientist};
use crate::store::traits::{CopyrightStore, EntityStore, StoreError, StoreResult};

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the scientists, devices and copyrights tables if missing
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Scientist-side foreign key name from the copyrights migration.
const SCIENTIST_FKEY: &str = "copyrights_scientist_fkey";

/// Id on the side of `copyright` whose foreign key was violated; the device
/// side when the constraint is unnamed or unknown.
fn dangling_id(copyright: Copyright, constraint: Option<&str>) -> Id {
    match constraint {
        Some(SCIENTIST_FKEY) => copyright.scientist_id,
        _ => copyright.device_id,
    }
}

fn scientist_from_row(row: &PgRow) -> StoreResult<Scientist> {
    Ok(Scientist {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        madness: row.try_get("madness")?,
        tries: row.try_get("tries")?,
        created_at: row.try_get("created_at")?,
    })
}

fn device_from_row(row: &PgRow) -> StoreResult<Device> {
    Ok(Device {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        power: row.try_get("power")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait::async_trait]
impl EntityStore<Scientist> for PostgresStore {
    async fn list(&self) -> StoreResult<Vec<Scientist>> {
        let rows = sqlx::query("SELECT id, name, madness, tries, created_at FROM scientists ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(scientist_from_row).collect()
    }

    async fn get(&self, id: Id) -> StoreResult<Option<Scientist>> {
        let row = sqlx::query("SELECT id, name, madness, tries, created_at FROM scientists WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(scientist_from_row).transpose()
    }

    async fn create(&self, draft: NewScientist) -> StoreResult<Id> {
        let row = sqlx::query(
            "INSERT INTO scientists (name, madness, tries) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&draft.name)
        .bind(draft.madness)
        .bind(draft.tries)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("id")?)
    }

    async fn update(&self, id: Id, draft: NewScientist) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE scientists SET name = $1, madness = $2, tries = $3 WHERE id = $4",
        )
        .bind(&draft.name)
        .bind(draft.madness)
        .bind(draft.tries)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn delete(&self, id: Id) -> StoreResult<()> {
        sqlx::query("DELETE FROM scientists WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_related(&self, id: Id) -> StoreResult<Vec<Device>> {
        let rows = sqlx::query(
            r#"
            SELECT d.id, d.name, d.power, d.created_at
            FROM devices d
            JOIN copyrights c ON c.device_id = d.id
            WHERE c.scientist_id = $1
            ORDER BY d.id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(device_from_row).collect()
    }
}

#[async_trait::async_trait]
impl EntityStore<Device> for PostgresStore {
    async fn list(&self) -> StoreResult<Vec<Device>> {
        let rows = sqlx::query("SELECT id, name, power, created_at FROM devices ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(device_from_row).collect()
    }

    async fn get(&self, id: Id) -> StoreResult<Option<Device>> {
        let row = sqlx::query("SELECT id, name, power, created_at FROM devices WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(device_from_row).transpose()
    }

    async fn create(&self, draft: NewDevice) -> StoreResult<Id> {
        let row = sqlx::query("INSERT INTO devices (name, power) VALUES ($1, $2) RETURNING id")
            .bind(&draft.name)
            .bind(draft.power)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get("id")?)
    }

    async fn update(&self, id: Id, draft: NewDevice) -> StoreResult<()> {
        let result = sqlx::query("UPDATE devices SET name = $1, power = $2 WHERE id = $3")
            .bind(&draft.name)
            .bind(draft.power)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn delete(&self, id: Id) -> StoreResult<()> {
        sqlx::query("DELETE FROM devices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_related(&self, id: Id) -> StoreResult<Vec<Scientist>> {
        let rows = sqlx::query(
            r#"
            SELECT s.id, s.name, s.madness, s.tries, s.created_at
            FROM scientists s
            JOIN copyrights c ON c.scientist_id = s.id
            WHERE c.device_id = $1
            ORDER BY s.id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(scientist_from_row).collect()
    }
}

#[async_trait::async_trait]
impl CopyrightStore for PostgresStore {
    async fn relate(&self, copyright: Copyright) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO copyrights (scientist_id, device_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(copyright.scientist_id)
        .bind(copyright.device_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            // One side vanished between the existence check and the insert
            let violated = match &e {
                sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                    Some(dangling_id(copyright, db_err.constraint()))
                }
                _ => None,
            };
            match violated {
                Some(id) => StoreError::NotFound(id),
                None => StoreError::from(e),
            }
        })?;
        Ok(())
    }

    async fn unrelate(&self, copyright: Copyright) -> StoreResult<()> {
        sqlx::query("DELETE FROM copyrights WHERE scientist_id = $1 AND device_id = $2")
            .bind(copyright.scientist_id)
            .bind(copyright.device_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
