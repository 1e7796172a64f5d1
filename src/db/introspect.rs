//! Schema extraction from PostgreSQL system catalogs.
//!
//! Lists base tables from `information_schema.tables` (excluding
//! system schemas), falling back to `pg_catalog.pg_tables` for roles
//! whose `information_schema` view comes up empty, then pulls columns
//! and comments per table. A table whose column query fails is skipped
//! with a warning rather than failing the whole extraction.

use crate::db::client::PgClient;
use crate::types::{AssistantError, ColumnInfo, Result, SchemaCatalog, TableInfo};
use tracing::{info, warn};

const LIST_TABLES: &str = "\
    SELECT t.table_schema, t.table_name \
    FROM information_schema.tables t \
    WHERE t.table_schema NOT IN ('pg_catalog', 'information_schema') \
    AND t.table_type = 'BASE TABLE' \
    ORDER BY t.table_schema, t.table_name";

const LIST_TABLES_FALLBACK: &str = "\
    SELECT schemaname AS table_schema, tablename AS table_name \
    FROM pg_catalog.pg_tables \
    WHERE schemaname NOT IN ('pg_catalog', 'information_schema') \
    ORDER BY schemaname, tablename";

const LIST_COLUMNS: &str = "\
    SELECT \
        c.column_name, \
        c.data_type, \
        c.is_nullable, \
        c.column_default, \
        col_description( \
            (SELECT oid FROM pg_class WHERE relname = $2 \
             AND relnamespace = (SELECT oid FROM pg_namespace WHERE nspname = $1)), \
            c.ordinal_position::int \
        ) AS column_description \
    FROM information_schema.columns c \
    WHERE c.table_schema = $1 AND c.table_name = $2 \
    ORDER BY c.ordinal_position";

/// Extract the full schema catalog visible to the connected role.
///
/// # Errors
///
/// Returns `AssistantError::Schema` if no tables are visible or if
/// every visible table fails column extraction.
pub async fn extract_catalog(client: &PgClient) -> Result<SchemaCatalog> {
    let mut rows = client.inner().query(LIST_TABLES, &[]).await?;

    if rows.is_empty() {
        rows = client.inner().query(LIST_TABLES_FALLBACK, &[]).await?;
    }

    if rows.is_empty() {
        return Err(AssistantError::Schema(
            "no tables found; verify database permissions".to_string(),
        ));
    }

    let mut tables = Vec::new();
    for row in &rows {
        let schema: String = row.get(0);
        let name: String = row.get(1);

        match extract_columns(client, &schema, &name).await {
            Ok(columns) if !columns.is_empty() => {
                tables.push(TableInfo {
                    schema,
                    name,
                    columns,
                });
            }
            Ok(_) => {
                warn!(table = %format!("{}.{}", schema, name), "table has no visible columns, skipping");
            }
            Err(e) => {
                warn!(table = %format!("{}.{}", schema, name), error = %e, "column extraction failed, skipping");
            }
        }
    }

    if tables.is_empty() {
        return Err(AssistantError::Schema(
            "could not extract column information from any table".to_string(),
        ));
    }

    info!(tables = tables.len(), "extracted schema catalog");
    Ok(SchemaCatalog::new(tables))
}

/// Columns for one table, in ordinal position order.
async fn extract_columns(client: &PgClient, schema: &str, table: &str) -> Result<Vec<ColumnInfo>> {
    let rows = client
        .inner()
        .query(LIST_COLUMNS, &[&schema, &table])
        .await?;

    Ok(rows
        .iter()
        .map(|row| {
            let is_nullable: String = row.get(2);
            ColumnInfo {
                name: row.get(0),
                data_type: row.get(1),
                nullable: is_nullable == "YES",
                default: row.get(3),
                description: row
                    .get::<_, Option<String>>(4)
                    .unwrap_or_default(),
            }
        })
        .collect())
}
