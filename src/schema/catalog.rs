//! Spatial metadata catalog queries.
//!
//! [`SpatialCatalog`] is the read-only view of the database the resolver and
//! the schema manager consume. [`PostgresCatalog`] answers it from the PostGIS
//! `geometry_columns` / `geography_columns` views and from `pg_index`.

use super::TableRef;
use crate::config::SpatialConfig;
use crate::error::Result;
use crate::executor::{LifeError, LifeExecutor};
use crate::spatial::TypeFamily;
use may_postgres::types::ToSql;
use may_postgres::Row;
use std::sync::atomic::{AtomicU64, Ordering};

/// One row of `geometry_columns` / `geography_columns`.
///
/// Fields are optional because the views can report NULLs for columns
/// created without a type modifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogColumnRow {
    pub column: String,
    pub type_name: Option<String>,
    pub coord_dimension: Option<i32>,
    pub srid: Option<i32>,
}

/// A spatial (GiST over a geometry or geography column) index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogIndexRow {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
    pub primary: bool,
}

/// Read-only access to spatial metadata of one database connection.
pub trait SpatialCatalog {
    /// Identity of the underlying connection
    fn connection_id(&self) -> u64;

    /// Registered columns of `family` on `table`, optionally only `column`.
    fn spatial_column_rows(
        &self,
        family: TypeFamily,
        table: &TableRef,
        column: Option<&str>,
    ) -> Result<Vec<CatalogColumnRow>>;

    /// Spatial indexes of `table`.
    fn spatial_index_rows(&self, table: &TableRef) -> Result<Vec<CatalogIndexRow>>;
}

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// [`SpatialCatalog`] over a [`LifeExecutor`].
pub struct PostgresCatalog<E: LifeExecutor> {
    executor: E,
    connection_id: u64,
    schema: Option<String>,
}

impl<E: LifeExecutor> PostgresCatalog<E> {
    /// Wrap an executor; each catalog gets a fresh connection id.
    pub fn new(executor: E, config: &SpatialConfig) -> Self {
        Self {
            executor,
            connection_id: NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
            schema: config.schema.clone(),
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Schema filter: the table's own schema, then the configured one, else the search path.
    fn schema_for<'t>(&'t self, table: &'t TableRef) -> Option<&'t str> {
        table.schema.as_deref().or(self.schema.as_deref())
    }
}

fn schema_predicate(column: &str, placeholder: usize, schema: Option<&str>) -> String {
    match schema {
        Some(_) => format!("{column} = ${placeholder}"),
        None => format!("{column} = ANY(current_schemas(false))"),
    }
}

fn parse_error(context: &str, err: may_postgres::Error) -> LifeError {
    LifeError::ParseError(format!("{context}: {err}"))
}

fn column_row(row: &Row) -> std::result::Result<CatalogColumnRow, LifeError> {
    Ok(CatalogColumnRow {
        column: row
            .try_get::<_, String>("column_name")
            .map_err(|e| parse_error("column_name", e))?,
        type_name: row
            .try_get::<_, Option<String>>("type")
            .map_err(|e| parse_error("type", e))?,
        coord_dimension: row
            .try_get::<_, Option<i32>>("coord_dimension")
            .map_err(|e| parse_error("coord_dimension", e))?,
        srid: row
            .try_get::<_, Option<i32>>("srid")
            .map_err(|e| parse_error("srid", e))?,
    })
}

fn index_row(row: &Row) -> std::result::Result<CatalogIndexRow, LifeError> {
    Ok(CatalogIndexRow {
        name: row
            .try_get::<_, String>("index_name")
            .map_err(|e| parse_error("index_name", e))?,
        columns: row
            .try_get::<_, Vec<String>>("columns")
            .map_err(|e| parse_error("columns", e))?,
        unique: row
            .try_get::<_, bool>("is_unique")
            .map_err(|e| parse_error("is_unique", e))?,
        primary: row
            .try_get::<_, bool>("is_primary")
            .map_err(|e| parse_error("is_primary", e))?,
    })
}

impl<E: LifeExecutor> SpatialCatalog for PostgresCatalog<E> {
    fn connection_id(&self) -> u64 {
        self.connection_id
    }

    fn spatial_column_rows(
        &self,
        family: TypeFamily,
        table: &TableRef,
        column: Option<&str>,
    ) -> Result<Vec<CatalogColumnRow>> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "postgis.catalog.columns",
            family = family.name(),
            table = %table
        )
        .entered();

        let schema = self.schema_for(table);
        let field = family.catalog_column_field();
        let sql = format!(
            "SELECT {field}::text AS column_name, type::text AS type, coord_dimension, srid \
             FROM {view} \
             WHERE f_table_name = $1 AND ($2::text IS NULL OR {field}::text = $2) AND {schema_filter} \
             ORDER BY {field}",
            view = family.catalog_view(),
            schema_filter = schema_predicate("f_table_schema", 3, schema),
        );

        let rows = match schema {
            Some(schema) => self
                .executor
                .query_all(&sql, &[&table.name as &dyn ToSql, &column, &schema])?,
            None => self.executor.query_all(&sql, &[&table.name as &dyn ToSql, &column])?,
        };
        log::debug!(
            "{} lists {} column(s) for {}",
            family.catalog_view(),
            rows.len(),
            table
        );

        rows.iter()
            .map(|row| column_row(row).map_err(Into::into))
            .collect()
    }

    fn spatial_index_rows(&self, table: &TableRef) -> Result<Vec<CatalogIndexRow>> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("postgis.catalog.indexes", table = %table).entered();

        let schema = self.schema_for(table);
        let sql = format!(
            "SELECT ic.relname::text AS index_name, \
                    array_agg(a.attname::text ORDER BY k.ord) AS columns, \
                    i.indisunique AS is_unique, \
                    i.indisprimary AS is_primary \
             FROM pg_index i \
             JOIN pg_class t ON t.oid = i.indrelid \
             JOIN pg_namespace n ON n.oid = t.relnamespace \
             JOIN pg_class ic ON ic.oid = i.indexrelid \
             JOIN pg_am am ON am.oid = ic.relam \
             CROSS JOIN LATERAL unnest(i.indkey) WITH ORDINALITY AS k(attnum, ord) \
             JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = k.attnum \
             JOIN pg_type ty ON ty.oid = a.atttypid \
             WHERE t.relname = $1 AND {schema_filter} AND am.amname = 'gist' \
             GROUP BY ic.relname, i.indisunique, i.indisprimary \
             HAVING bool_or(ty.typname IN ('geometry', 'geography')) \
             ORDER BY ic.relname",
            schema_filter = schema_predicate("n.nspname", 2, schema),
        );

        let rows = match schema {
            Some(schema) => self.executor.query_all(&sql, &[&table.name as &dyn ToSql, &schema])?,
            None => self.executor.query_all(&sql, &[&table.name as &dyn ToSql])?,
        };
        log::debug!("pg_index lists {} spatial index(es) for {}", rows.len(), table);

        rows.iter().map(|row| index_row(row).map_err(Into::into)).collect()
    }
}
