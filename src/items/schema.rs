//! Layout of the items table.
//!
//! The table name is chosen at runtime, so the DDL is rendered from a static
//! column list instead of a fixed statement.

use anyhow::{bail, Result};
use rusqlite::{params, Connection};

#[derive(Debug, PartialEq, Eq)]
pub enum SqlType {
    Text,
}

impl SqlType {
    fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
        }
    }
}

pub struct Column {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
    pub default_value: Option<&'static str>,
}

pub const ITEM_COLUMNS: &[Column] = &[
    Column {
        name: "id",
        sql_type: SqlType::Text,
        is_primary_key: true,
        non_null: true,
        default_value: None,
    },
    Column {
        name: "name",
        sql_type: SqlType::Text,
        is_primary_key: false,
        non_null: true,
        default_value: None,
    },
    Column {
        name: "description",
        sql_type: SqlType::Text,
        is_primary_key: false,
        non_null: true,
        default_value: None,
    },
    Column {
        name: "category",
        sql_type: SqlType::Text,
        is_primary_key: false,
        non_null: true,
        default_value: None,
    },
    Column {
        name: "metadata",
        sql_type: SqlType::Text,
        is_primary_key: false,
        non_null: true,
        default_value: Some("'{}'"),
    },
    Column {
        name: "created_at",
        sql_type: SqlType::Text,
        is_primary_key: false,
        non_null: true,
        default_value: None,
    },
    Column {
        name: "updated_at",
        sql_type: SqlType::Text,
        is_primary_key: false,
        non_null: true,
        default_value: None,
    },
];

/// Quotes `name` as an SQL identifier, so names like `mcp-items` are usable.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn created_at_index_name(table_name: &str) -> String {
    quote_identifier(&format!("{}_created_at_idx", table_name))
}

pub fn table_exists(conn: &Connection, table_name: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![table_name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn create_items_table(conn: &Connection, table_name: &str) -> Result<()> {
    let mut create_sql = format!("CREATE TABLE {} (", quote_identifier(table_name));
    for (column_index, column) in ITEM_COLUMNS.iter().enumerate() {
        if column_index > 0 {
            create_sql.push_str(", ");
        }
        create_sql.push_str(&format!("{} {}", column.name, column.sql_type.as_sql()));
        if column.is_primary_key {
            create_sql.push_str(" PRIMARY KEY");
        }
        if column.non_null {
            create_sql.push_str(" NOT NULL");
        }
        if let Some(default_value) = column.default_value {
            create_sql.push_str(&format!(" DEFAULT {}", default_value));
        }
    }
    create_sql.push_str(");");
    conn.execute(&create_sql, params![])?;

    conn.execute(
        &format!(
            "CREATE INDEX {} ON {}(created_at);",
            created_at_index_name(table_name),
            quote_identifier(table_name)
        ),
        params![],
    )?;
    Ok(())
}

/// Checks that an existing table has exactly the expected columns and types.
pub fn validate_items_table(conn: &Connection, table_name: &str) -> Result<()> {
    let mut stmt = conn.prepare(&format!(
        "PRAGMA table_info({});",
        quote_identifier(table_name)
    ))?;
    let actual: Vec<(String, String, bool)> = stmt
        .query_map(params![], |row| {
            Ok((
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i32>(3)? == 1,
            ))
        })?
        .collect::<Result<_, _>>()?;

    if actual.len() != ITEM_COLUMNS.len() {
        bail!(
            "Table {} has {} columns, expected {}. Found column names: {}",
            table_name,
            actual.len(),
            ITEM_COLUMNS.len(),
            actual
                .iter()
                .map(|(name, _, _)| name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    for (expected, (name, sql_type, non_null)) in ITEM_COLUMNS.iter().zip(actual.iter()) {
        if expected.name != name {
            bail!(
                "Table {} column mismatch: expected {}, found {}",
                table_name,
                expected.name,
                name
            );
        }
        if !expected.sql_type.as_sql().eq_ignore_ascii_case(sql_type) {
            bail!(
                "Table {} column {} has type {}, expected {}",
                table_name,
                name,
                sql_type,
                expected.sql_type.as_sql()
            );
        }
        if expected.non_null != *non_null {
            bail!(
                "Table {} column {} nullability mismatch",
                table_name,
                name
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier_escapes_quotes() {
        assert_eq!(quote_identifier("mcp-items"), "\"mcp-items\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_create_then_validate() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(!table_exists(&conn, "mcp-items").unwrap());

        create_items_table(&conn, "mcp-items").unwrap();

        assert!(table_exists(&conn, "mcp-items").unwrap());
        validate_items_table(&conn, "mcp-items").unwrap();
    }

    #[test]
    fn test_validate_rejects_foreign_layout() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE things (id TEXT PRIMARY KEY, label TEXT)", [])
            .unwrap();

        let err = validate_items_table(&conn, "things").unwrap_err();
        assert!(err.to_string().contains("columns, expected"));
    }
}
