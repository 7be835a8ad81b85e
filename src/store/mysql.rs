use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::{MySql, Transaction};
use std::time::Duration;

use super::{Item, ItemSession, ItemStore, NewItem, SampleRow, StoreError, StoreResult};
use crate::config::Config;

const ITEM_COLUMNS: &str = "id, name, description, created_at";

/// `items` DDL for the given binary collation
fn create_items_table(collation: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS items (\
            id BIGINT NOT NULL AUTO_INCREMENT, \
            name VARCHAR(100) NOT NULL, \
            description LONGTEXT NULL, \
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP, \
            PRIMARY KEY (id), \
            CONSTRAINT uq_items_name UNIQUE (name)\
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE={}",
        collation
    )
}

/// Pick a binary NO PAD collation so names compare byte for byte,
/// trailing spaces included.
///
/// MariaDB reports versions like `10.11.6-MariaDB-1`; MySQL 8 like `8.0.36`.
fn name_collation(server_version: &str) -> Option<&'static str> {
    if server_version.contains("MariaDB") {
        return Some("utf8mb4_nopad_bin");
    }

    let major = server_version
        .split(|c: char| !c.is_ascii_digit())
        .next()
        .and_then(|major| major.parse::<u32>().ok())?;

    if major >= 8 {
        Some("utf8mb4_0900_bin")
    } else {
        None
    }
}

/// Count unique indexes on `table` whose only, full-length key column is `column`
async fn single_column_unique_indexes(
    pool: &MySqlPool,
    table: &str,
    column: &str,
) -> Result<i64> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM (\
            SELECT INDEX_NAME FROM information_schema.STATISTICS \
            WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND NON_UNIQUE = 0 \
            GROUP BY INDEX_NAME \
            HAVING COUNT(*) = 1 AND MAX(COLUMN_NAME) = ? AND MAX(SUB_PART) IS NULL\
        ) AS single_column_unique",
    )
    .bind(table)
    .bind(column)
    .fetch_one(pool)
    .await
    .with_context(|| format!("Failed to inspect indexes on {}", table))
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: i64,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            id: row.id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

/// MySQL/MariaDB backed item store
///
/// Wraps a connection pool. Every [`ItemSession`] it hands out owns one pooled
/// connection inside an open transaction for as long as the session lives.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    /// Connect to the database described by `config` and make sure the
    /// `items` table exists with its unique constraint on `name`.
    pub async fn connect(config: &Config) -> Result<Self> {
        tracing::info!(
            "Connecting to MySQL at {}:{}/{}",
            config.db_host,
            config.db_port,
            config.db_name
        );

        let pool = MySqlPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&config.database_url())
            .await
            .context("Failed to connect to MySQL")?;

        let store = Self::from_pool(pool);
        store.ensure_schema().await?;

        tracing::info!("Successfully connected to database: {}", config.db_name);
        Ok(store)
    }

    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Create the `items` table if needed and add the unique constraint on
    /// `name` to tables created without it.
    pub async fn ensure_schema(&self) -> Result<()> {
        let server_version: String = sqlx::query_scalar("SELECT VERSION()")
            .fetch_one(&self.pool)
            .await
            .context("Failed to read server version")?;

        let collation = match name_collation(&server_version) {
            Some(collation) => collation,
            None => {
                tracing::warn!(
                    "Server {} has no binary NO PAD collation, trailing spaces in names will compare equal",
                    server_version
                );
                "utf8mb4_bin"
            }
        };

        sqlx::query(&create_items_table(collation))
            .execute(&self.pool)
            .await
            .context("Failed to create items table")?;

        self.align_columns(collation).await?;

        let unique_indexes = single_column_unique_indexes(&self.pool, "items", "name").await?;

        if unique_indexes == 0 {
            tracing::warn!("Table 'items' has no unique index on name, adding uq_items_name");
            sqlx::query("ALTER TABLE items ADD CONSTRAINT uq_items_name UNIQUE (name)")
                .execute(&self.pool)
                .await
                .context("Failed to add unique constraint on items.name")?;
        } else {
            tracing::info!("Table 'items' is ready");
        }

        Ok(())
    }

    /// Bring `name` and `description` of an older `items` table to the
    /// current collation and type.
    async fn align_columns(&self, collation: &str) -> Result<()> {
        let columns: Vec<(String, String, Option<String>)> = sqlx::query_as(
            "SELECT COLUMN_NAME, DATA_TYPE, COLLATION_NAME FROM information_schema.COLUMNS \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = 'items' \
             AND COLUMN_NAME IN ('name', 'description')",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to inspect columns of items")?;

        for (column, data_type, column_collation) in columns {
            let statement = match column.as_str() {
                "name" if column_collation.as_deref() != Some(collation) => format!(
                    "ALTER TABLE items MODIFY name VARCHAR(100) NOT NULL COLLATE {}",
                    collation
                ),
                "description" if !data_type.eq_ignore_ascii_case("longtext") => {
                    "ALTER TABLE items MODIFY description LONGTEXT NULL".to_string()
                }
                _ => continue,
            };

            tracing::warn!("Migrating items.{}: {}", column, statement);
            sqlx::query(&statement)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to migrate items.{}", column))?;
        }

        Ok(())
    }
}

#[async_trait]
impl ItemStore for MySqlStore {
    async fn begin(&self) -> StoreResult<Box<dyn ItemSession>> {
        let tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;
        Ok(Box::new(MySqlSession { tx }))
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Failed to execute health check query")?;
        Ok(())
    }

    async fn sample(&self) -> StoreResult<Vec<SampleRow>> {
        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT CAST(1 AS SIGNED) AS id, CAST('sample' AS CHAR) AS name")
                .fetch_all(&self.pool)
                .await
                .context("Failed to execute sample query")?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| SampleRow { id, name })
            .collect())
    }
}

/// A pooled connection inside an open transaction
///
/// `sqlx` rolls the transaction back when it is dropped uncommitted, and the
/// connection goes back to the pool either way.
struct MySqlSession {
    tx: Transaction<'static, MySql>,
}

/// Map a write failure, singling out collisions with `uq_items_name`
fn write_error(err: sqlx::Error, name: &str, context: &'static str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::UniqueViolation(name.to_string())
        }
        _ => StoreError::Unavailable(anyhow::Error::new(err).context(context)),
    }
}

#[async_trait]
impl ItemSession for MySqlSession {
    async fn find_by_id(&mut self, id: i64) -> StoreResult<Option<Item>> {
        let row: Option<ItemRow> =
            sqlx::query_as(&format!("SELECT {} FROM items WHERE id = ?", ITEM_COLUMNS))
                .bind(id)
                .fetch_optional(&mut *self.tx)
                .await
                .context("Failed to query item by id")?;
        Ok(row.map(Item::from))
    }

    async fn find_by_id_for_update(&mut self, id: i64) -> StoreResult<Option<Item>> {
        let row: Option<ItemRow> = sqlx::query_as(&format!(
            "SELECT {} FROM items WHERE id = ? FOR UPDATE",
            ITEM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .context("Failed to lock item by id")?;
        Ok(row.map(Item::from))
    }

    async fn find_by_name(&mut self, name: &str) -> StoreResult<Option<Item>> {
        let row: Option<ItemRow> =
            sqlx::query_as(&format!("SELECT {} FROM items WHERE name = ?", ITEM_COLUMNS))
                .bind(name)
                .fetch_optional(&mut *self.tx)
                .await
                .context("Failed to query item by name")?;
        Ok(row.map(Item::from))
    }

    async fn list(&mut self) -> StoreResult<Vec<Item>> {
        let rows: Vec<ItemRow> =
            sqlx::query_as(&format!("SELECT {} FROM items ORDER BY id DESC", ITEM_COLUMNS))
                .fetch_all(&mut *self.tx)
                .await
                .context("Failed to list items")?;
        Ok(rows.into_iter().map(Item::from).collect())
    }

    async fn insert(&mut self, item: &NewItem) -> StoreResult<Item> {
        let result = sqlx::query("INSERT INTO items (name, description) VALUES (?, ?)")
            .bind(&item.name)
            .bind(&item.description)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| write_error(e, &item.name, "Failed to insert item"))?;

        let id = i64::try_from(result.last_insert_id())
            .context("Inserted id does not fit in a signed 64-bit integer")?;

        let inserted = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Inserted item {} could not be read back", id))?;

        tracing::debug!("Inserted item with id: {}", id);
        Ok(inserted)
    }

    async fn update(&mut self, item: &Item) -> StoreResult<()> {
        sqlx::query("UPDATE items SET name = ?, description = ? WHERE id = ?")
            .bind(&item.name)
            .bind(&item.description)
            .bind(item.id)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| write_error(e, &item.name, "Failed to update item"))?;

        tracing::debug!("Updated item with id: {}", item.id);
        Ok(())
    }

    async fn delete(&mut self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .context("Failed to delete item")?;
        Ok(result.rows_affected() > 0)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MySqlSession { tx } = *self;
        tx.commit().await.context("Failed to commit transaction")?;
        Ok(())
    }
}
