//! Structural description of the live schema
//!
//! Read back from SQLite's own catalog so it always matches what the
//! migrations produced. Serialized to JSON by the admin tool.

use crate::error::Result;
use crate::migrations;
use serde::Serialize;
use sqlx::{Row, SqlitePool};

#[derive(Debug, Clone, Serialize)]
pub struct SchemaDescription {
    pub version: i64,
    pub tables: Vec<TableDescription>,
}

impl SchemaDescription {
    pub fn table(&self, name: &str) -> Option<&TableDescription> {
        self.tables.iter().find(|t| t.name == name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TableDescription {
    pub name: String,
    pub columns: Vec<ColumnDescription>,
    pub indexes: Vec<IndexDescription>,
}

impl TableDescription {
    pub fn column(&self, name: &str) -> Option<&ColumnDescription> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnDescription {
    pub name: String,
    pub sql_type: String,
    pub not_null: bool,
    pub primary_key: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexDescription {
    pub name: String,
    pub unique: bool,
    pub columns: Vec<String>,
}

/// Describe every user table of the database
pub async fn describe(pool: &SqlitePool) -> Result<SchemaDescription> {
    let version = migrations::current_version(pool).await?;

    let table_names: Vec<String> = sqlx::query(
        "SELECT name FROM sqlite_master
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
         ORDER BY name",
    )
    .fetch_all(pool)
    .await?
    .iter()
    .map(|row| row.get("name"))
    .collect();

    let mut tables = Vec::with_capacity(table_names.len());
    for name in table_names {
        let columns = sqlx::query(
            r#"SELECT name, type, "notnull", pk FROM pragma_table_info(?) ORDER BY cid"#,
        )
        .bind(&name)
        .fetch_all(pool)
        .await?
        .iter()
        .map(|row| ColumnDescription {
            name: row.get("name"),
            sql_type: row.get("type"),
            not_null: row.get::<i64, _>("notnull") != 0,
            primary_key: row.get::<i64, _>("pk") != 0,
        })
        .collect();

        let index_rows = sqlx::query(r#"SELECT name, "unique" FROM pragma_index_list(?) ORDER BY name"#)
            .bind(&name)
            .fetch_all(pool)
            .await?;

        let mut indexes = Vec::with_capacity(index_rows.len());
        for row in index_rows {
            let index_name: String = row.get("name");
            let columns = sqlx::query("SELECT name FROM pragma_index_info(?) ORDER BY seqno")
                .bind(&index_name)
                .fetch_all(pool)
                .await?
                .iter()
                .map(|r| r.get("name"))
                .collect();

            indexes.push(IndexDescription {
                name: index_name,
                unique: row.get::<i64, _>("unique") != 0,
                columns,
            });
        }

        tables.push(TableDescription {
            name,
            columns,
            indexes,
        });
    }

    Ok(SchemaDescription { version, tables })
}
