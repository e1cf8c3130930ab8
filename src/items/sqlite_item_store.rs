use super::models::{format_timestamp, now, parse_timestamp, Item, ItemMetadata, ItemUpdate, NewItem};
use super::schema::{create_items_table, quote_identifier, table_exists, validate_items_table};
use super::ItemStore;
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};
use uuid::Uuid;

/// Item store backed by a single SQLite table.
pub struct SqliteItemStore {
    conn: Arc<Mutex<Connection>>,
    table: String,
}

impl SqliteItemStore {
    pub fn new<P: AsRef<Path>>(db_path: P, table_name: &str) -> Result<Self> {
        let path = db_path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open items database at {:?}", path))?;
        info!("Opened items database at {:?}", path);
        Self::with_connection(conn, table_name)
    }

    pub fn in_memory(table_name: &str) -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::with_connection(conn, table_name)
    }

    fn with_connection(conn: Connection, table_name: &str) -> Result<Self> {
        if table_name.trim().is_empty() {
            bail!("Items table name must not be empty");
        }

        if table_exists(&conn, table_name)? {
            validate_items_table(&conn, table_name)
                .with_context(|| format!("Items table {} has an unexpected layout", table_name))?;
        } else {
            info!("Creating items table {}", table_name);
            create_items_table(&conn, table_name)?;
        }

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            table: quote_identifier(table_name),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("Items database connection lock poisoned"))
    }

    /// Reads a text column through `parse`. Malformed values are conversion
    /// failures, never replaced by defaults.
    fn parsed_column<T, E>(
        row: &rusqlite::Row,
        name: &str,
        parse: impl FnOnce(&str) -> std::result::Result<T, E>,
    ) -> rusqlite::Result<T>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let idx = row.as_ref().column_index(name)?;
        let text: String = row.get(idx)?;
        parse(&text).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
    }

    fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<Item> {
        Ok(Item {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            category: row.get("category")?,
            metadata: Self::parsed_column(row, "metadata", |text| {
                serde_json::from_str::<ItemMetadata>(text)
            })?,
            created_at: Self::parsed_column(row, "created_at", parse_timestamp)?,
            updated_at: Self::parsed_column(row, "updated_at", parse_timestamp)?,
        })
    }

    fn select_item(conn: &Connection, table: &str, id: &str) -> Result<Option<Item>> {
        let item = conn
            .query_row(
                &format!("SELECT * FROM {} WHERE id = ?1", table),
                params![id],
                Self::row_to_item,
            )
            .optional()?;
        Ok(item)
    }
}

impl ItemStore for SqliteItemStore {
    fn create_item(&self, new_item: NewItem) -> Result<Item> {
        let timestamp = now();
        let item = Item {
            id: Uuid::new_v4().to_string(),
            name: new_item.name,
            description: new_item.description,
            category: new_item.category,
            metadata: new_item.metadata,
            created_at: timestamp,
            updated_at: timestamp,
        };

        let conn = self.lock()?;
        conn.execute(
            &format!(
                "INSERT INTO {} (id, name, description, category, metadata, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                self.table
            ),
            params![
                item.id,
                item.name,
                item.description,
                item.category,
                serde_json::to_string(&item.metadata)?,
                format_timestamp(&item.created_at),
                format_timestamp(&item.updated_at),
            ],
        )
        .context("Failed to insert item")?;

        debug!(item_id = %item.id, "Created item");
        Ok(item)
    }

    fn get_item(&self, id: &str) -> Result<Option<Item>> {
        let conn = self.lock()?;
        Self::select_item(&conn, &self.table, id)
    }

    fn list_items(&self, limit: usize) -> Result<Vec<Item>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT * FROM {} ORDER BY created_at DESC, rowid DESC LIMIT ?1",
            self.table
        ))?;
        let items = stmt
            .query_map(params![limit as i64], Self::row_to_item)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn update_item(&self, id: &str, update: ItemUpdate) -> Result<Option<Item>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let mut item = match Self::select_item(&tx, &self.table, id)? {
            Some(item) => item,
            None => return Ok(None),
        };
        update.apply_to(&mut item, now());

        tx.execute(
            &format!(
                "UPDATE {} SET name = ?1, description = ?2, category = ?3, metadata = ?4, \
                 updated_at = ?5 WHERE id = ?6",
                self.table
            ),
            params![
                item.name,
                item.description,
                item.category,
                serde_json::to_string(&item.metadata)?,
                format_timestamp(&item.updated_at),
                item.id,
            ],
        )
        .context("Failed to update item")?;
        tx.commit()?;

        debug!(item_id = %item.id, "Updated item");
        Ok(Some(item))
    }

    fn delete_item(&self, id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn
            .execute(
                &format!("DELETE FROM {} WHERE id = ?1", self.table),
                params![id],
            )
            .context("Failed to delete item")?;
        Ok(deleted > 0)
    }

    fn health_check(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE 0", self.table),
            [],
            |row| row.get::<_, i64>(0),
        )
        .context("Items table is not reachable")?;
        Ok(())
    }
}
