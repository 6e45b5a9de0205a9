//! Spatial schema management
//!
//! This module provides the schema side of PostGIS support:
//! - Table, column, index and diff descriptions
//! - `CREATE TABLE` generation with spatial column registration
//! - `ALTER TABLE` generation with spatial index isolation and SRID relabeling
//! - Catalog introspection of spatial columns and indexes
//!
//! # Example
//!
//! ```rust
//! use lifeguard_postgis::schema::{Column, CreateTableSqlGenerator, Table};
//! use lifeguard_postgis::{PostgresPlatform, SpatialConfig};
//!
//! let table = Table::new("parcels")
//!     .column(Column::new("id", "integer"))
//!     .column(Column::new("geom", "geometry(Point,4326)").with_nullable(true))
//!     .primary_key(["id"]);
//!
//! let config = SpatialConfig::default();
//! let generator = CreateTableSqlGenerator::new(&PostgresPlatform, &config);
//! let sql = generator.generate_table(&table)?;
//!
//! assert_eq!(sql[1], "SELECT AddGeometryColumn('parcels','geom',4326,'POINT',2)");
//! # Ok::<(), lifeguard_postgis::SpatialError>(())
//! ```

pub mod alter_table;
pub mod catalog;
pub mod classifier;
pub mod column;
pub mod create_table;
pub mod diff;
pub mod index;
pub mod manager;
pub mod platform;
pub mod resolver;
pub mod spatial_index;
pub mod table;

pub use alter_table::AlterTableSqlGenerator;
pub use catalog::{CatalogColumnRow, CatalogIndexRow, PostgresCatalog, SpatialCatalog};
pub use classifier::IndexClassifier;
pub use column::{Column, ForeignKey};
pub use create_table::{CreateTableOptions, CreateTableSqlGenerator};
pub use diff::{ColumnDiff, ColumnProperty, TableDiff};
pub use index::IndexDescriptor;
pub use manager::{RawColumn, SpatialSchemaManager};
pub use platform::{Platform, PostgresPlatform};
pub use resolver::ColumnInfoResolver;
pub use spatial_index::SpatialIndexSqlGenerator;
pub use table::Table;

use std::fmt;

/// A possibly schema-qualified table name (`gis.parcels`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub schema: Option<String>,
    pub name: String,
}

impl TableRef {
    /// Split on the last `.`; a bare name has no schema.
    pub fn parse(qualified: &str) -> Self {
        match qualified.rsplit_once('.') {
            Some((schema, name)) if !schema.is_empty() => Self {
                schema: Some(schema.to_string()),
                name: name.to_string(),
            },
            _ => Self {
                schema: None,
                name: qualified.trim_start_matches('.').to_string(),
            },
        }
    }

    /// Double-quoted form for hand-written DDL (`"gis"."parcels"`)
    pub fn quoted(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", quote_ident(schema), quote_ident(&self.name)),
            None => quote_ident(&self.name),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => f.write_str(&self.name),
        }
    }
}

pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub(crate) fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Sanitize a name for use in constraint names
pub(crate) fn sanitize_constraint_name(name: &str) -> String {
    name.replace(['-', '.'], "_").to_lowercase()
}
