//! `CREATE TABLE` generation for tables with spatial columns.
//!
//! Geometry columns are not typed inline: they are registered after the table
//! exists with `AddGeometryColumn`, which also records them in
//! `geometry_columns`. Geography columns have no registration function and are
//! created inline with their full type constraint (`geography(Point,4326)`).

use super::column::{Column, ForeignKey};
use super::diff::{ColumnDiff, ColumnProperty};
use super::index::IndexDescriptor;
use super::platform::Platform;
use super::spatial_index::SpatialIndexSqlGenerator;
use super::table::Table;
use super::{quote_literal, TableRef};
use crate::config::SpatialConfig;
use crate::error::{Result, SpatialError};
use crate::spatial::{SpatialColumnDescriptor, TypeFamily};

/// Table-level options of a `CREATE TABLE`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateTableOptions {
    pub primary_key: Vec<String>,
    pub indexes: Vec<IndexDescriptor>,
    pub foreign_keys: Vec<ForeignKey>,
}

/// `SELECT AddGeometryColumn(...)` for one column.
///
/// Schema-qualified tables use the six-argument form with the schema first.
pub(crate) fn add_geometry_column_sql(
    table: &TableRef,
    column: &str,
    descriptor: &SpatialColumnDescriptor,
) -> String {
    let schema = table
        .schema
        .as_deref()
        .map(|s| format!("{},", quote_literal(s)))
        .unwrap_or_default();
    format!(
        "SELECT AddGeometryColumn({}{},{},{},{},{})",
        schema,
        quote_literal(&table.name),
        quote_literal(column),
        descriptor.srid,
        quote_literal(&descriptor.registration_type_name()),
        descriptor.coord_dimension()
    )
}

/// Builds the statement sequence that creates a table.
///
/// Output order:
/// 1. `CREATE TABLE` with ordinary and geography columns, primary key and foreign keys
/// 2. `AddGeometryColumn` per geometry column, in declaration order, each
///    followed by its `NOT NULL` / `DEFAULT` statements
/// 3. column comments
/// 4. spatial indexes
/// 5. ordinary indexes
pub struct CreateTableSqlGenerator<'a, P: Platform + ?Sized> {
    platform: &'a P,
    config: &'a SpatialConfig,
}

impl<'a, P: Platform + ?Sized> CreateTableSqlGenerator<'a, P> {
    pub fn new(platform: &'a P, config: &'a SpatialConfig) -> Self {
        Self { platform, config }
    }

    pub fn generate_table(&self, table: &Table) -> Result<Vec<String>> {
        self.generate(&table.name, &table.columns, &table.create_options())
    }

    /// Generate the statements, or fail before producing any of them.
    pub fn generate(
        &self,
        table_name: &str,
        columns: &[Column],
        options: &CreateTableOptions,
    ) -> Result<Vec<String>> {
        let table = TableRef::parse(table_name);

        let mut inline = Vec::new();
        let mut registered = Vec::new();
        for column in columns {
            match column.spatial_descriptor(self.config)? {
                Some(descriptor) if descriptor.type_family == TypeFamily::Geometry => {
                    registered.push((column, descriptor));
                }
                Some(descriptor) => inline.push(Column {
                    type_name: descriptor.type_constraint(),
                    geometry_type: None,
                    srid: None,
                    ..column.clone()
                }),
                None => inline.push(column.clone()),
            }
        }

        let primary_key = if options.primary_key.is_empty() {
            options
                .indexes
                .iter()
                .find(|i| i.primary)
                .map(|i| i.columns.clone())
                .unwrap_or_default()
        } else {
            options.primary_key.clone()
        };

        let is_inline = |name: &str| inline.iter().any(|c| c.name == name);
        let is_registered = |name: &str| registered.iter().any(|(c, _)| c.name == name);
        let check_inline = |what: &str, name: &str| -> Result<()> {
            if is_inline(name) {
                Ok(())
            } else if is_registered(name) {
                Err(SpatialError::Configuration(format!(
                    "{what} of table \"{table}\" references geometry column \"{name}\", which is only registered after CREATE TABLE"
                )))
            } else {
                Err(SpatialError::Configuration(format!(
                    "{what} of table \"{table}\" references unknown column \"{name}\""
                )))
            }
        };

        for name in &primary_key {
            check_inline("Primary key", name)?;
        }
        for fk in &options.foreign_keys {
            for name in &fk.columns {
                check_inline("Foreign key", name)?;
            }
        }
        for index in &options.indexes {
            for name in &index.columns {
                if !is_inline(name) && !is_registered(name) {
                    return Err(SpatialError::Configuration(format!(
                        "Index \"{}\" of table \"{table}\" references unknown column \"{name}\"",
                        index.name
                    )));
                }
            }
        }

        let mut sql = vec![self.platform.create_table_sql(
            &table,
            &inline,
            &primary_key,
            &options.foreign_keys,
        )?];

        for (column, descriptor) in &registered {
            sql.push(add_geometry_column_sql(&table, &column.name, descriptor));

            let mut follow_up = Vec::new();
            if !column.nullable {
                follow_up.push(ColumnProperty::NotNull);
            }
            if column.default.is_some() {
                follow_up.push(ColumnProperty::Default);
            }
            if !follow_up.is_empty() {
                let change = ColumnDiff::new((*column).clone(), None, follow_up);
                sql.extend(self.platform.alter_column_sql(&table, &change));
            }
        }

        for column in columns {
            if let Some(comment) = &column.comment {
                sql.push(self.platform.column_comment_sql(&table, &column.name, Some(comment)));
            }
        }

        let spatial_indexes = SpatialIndexSqlGenerator::new(self.config);
        for index in options.indexes.iter().filter(|i| i.spatial) {
            sql.push(spatial_indexes.create_index_sql(index, &table));
        }
        for index in options.indexes.iter().filter(|i| !i.spatial && !i.primary) {
            sql.push(self.platform.create_index_sql(index, &table));
        }

        log::debug!("Generated {} statements to create table {}", sql.len(), table);
        Ok(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::platform::PostgresPlatform;

    fn generate(table: &Table) -> Result<Vec<String>> {
        let config = SpatialConfig::default();
        CreateTableSqlGenerator::new(&PostgresPlatform, &config).generate_table(table)
    }

    #[test]
    fn test_geometry_column_is_registered_after_create() {
        let table = Table::new("t")
            .column(Column::new("id", "integer"))
            .column(Column::new("geom", "geometry(Point,4326)").with_nullable(true))
            .primary_key(["id"]);

        let sql = generate(&table).unwrap();
        assert_eq!(sql.len(), 2);
        assert!(sql[0].starts_with("CREATE TABLE \"t\""));
        assert!(sql[0].contains("\"id\""));
        assert!(!sql[0].contains("geom"));
        assert_eq!(sql[1], "SELECT AddGeometryColumn('t','geom',4326,'POINT',2)");
    }

    #[test]
    fn test_registration_follows_declaration_order() {
        let table = Table::new("t")
            .column(Column::new("b", "geometry(LineStringZ,3857)").with_nullable(true))
            .column(Column::new("a", "geometry(PolygonM)").with_nullable(true));

        let sql = generate(&table).unwrap();
        assert_eq!(sql[1], "SELECT AddGeometryColumn('t','b',3857,'LINESTRING',3)");
        assert_eq!(sql[2], "SELECT AddGeometryColumn('t','a',0,'POLYGONM',3)");
    }

    #[test]
    fn test_not_null_and_default_follow_registration() {
        let table = Table::new("t").column(
            Column::new("geom", "geometry(Point,4326)")
                .with_default("'SRID=4326;POINT(0 0)'::geometry"),
        );

        let sql = generate(&table).unwrap();
        assert_eq!(sql[1], "SELECT AddGeometryColumn('t','geom',4326,'POINT',2)");
        assert_eq!(sql[2], "ALTER TABLE \"t\" ALTER COLUMN \"geom\" SET NOT NULL");
        assert_eq!(
            sql[3],
            "ALTER TABLE \"t\" ALTER COLUMN \"geom\" SET DEFAULT 'SRID=4326;POINT(0 0)'::geometry"
        );
    }

    #[test]
    fn test_geography_column_is_inline() {
        let table = Table::new("t")
            .column(Column::new("geog", "geography").with_geometry_type("point").with_nullable(true));

        let sql = generate(&table).unwrap();
        assert_eq!(sql.len(), 1);
        assert!(sql[0].contains("geography(Point,4326)"));
    }

    #[test]
    fn test_schema_qualified_registration() {
        let table = Table::new("gis.parcels")
            .column(Column::new("geom", "geometry(MultiPolygon,4326)").with_nullable(true));

        let sql = generate(&table).unwrap();
        assert_eq!(
            sql[1],
            "SELECT AddGeometryColumn('gis','parcels','geom',4326,'MULTIPOLYGON',2)"
        );
    }

    #[test]
    fn test_index_order_and_comments() {
        let table = Table::new("t")
            .column(Column::new("id", "integer"))
            .column(Column::new("name", "text").with_comment("label"))
            .column(Column::new("geom", "geometry(Point,4326)").with_nullable(true))
            .index(IndexDescriptor::new("idx_t_name", ["name"]))
            .index(IndexDescriptor::new("idx_t_geom", ["geom"]).spatial());

        let sql = generate(&table).unwrap();
        assert_eq!(sql.len(), 5);
        assert_eq!(sql[2], "COMMENT ON COLUMN \"t\".\"name\" IS 'label'");
        assert_eq!(sql[3], "CREATE INDEX idx_t_geom ON t USING GIST (geom)");
        assert!(sql[4].contains("\"idx_t_name\""));
    }

    #[test]
    fn test_unknown_family_fails_before_output() {
        let table = Table::new("t")
            .column(Column::new("id", "integer"))
            .column(Column::new("geom", "geomtry").with_geometry_type("POINT"));

        assert!(matches!(generate(&table), Err(SpatialError::Configuration(_))));
    }

    #[test]
    fn test_primary_key_on_registered_column_is_rejected() {
        let table = Table::new("t")
            .column(Column::new("geom", "geometry(Point,4326)"))
            .primary_key(["geom"]);

        let err = generate(&table).unwrap_err();
        assert!(matches!(err, SpatialError::Configuration(msg) if msg.contains("only registered after")));
    }

    #[test]
    fn test_unknown_index_column_is_rejected() {
        let table = Table::new("t")
            .column(Column::new("id", "integer"))
            .index(IndexDescriptor::new("idx_t_missing", ["missing"]));

        assert!(matches!(generate(&table), Err(SpatialError::Configuration(_))));
    }

    #[test]
    fn test_primary_index_supplies_primary_key() {
        let mut pk = IndexDescriptor::new("t_pkey", ["id"]);
        pk.primary = true;
        let table = Table::new("t").column(Column::new("id", "integer")).index(pk);

        let sql = generate(&table).unwrap();
        assert_eq!(sql.len(), 1);
        assert!(sql[0].contains("PRIMARY KEY"));
    }
}
