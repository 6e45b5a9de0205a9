//! `ALTER TABLE` generation for tables with spatial columns.
//!
//! Statement order for one diff:
//! 1. generic statements for the spatial-free part of the diff, which include
//!    the drops of every removed or changed spatial index and the rename
//! 2. `AddGeometryColumn` for added geometry columns
//! 3. ordinary `CREATE INDEX` over those columns
//! 4. SRID relabels
//! 5. spatial `CREATE INDEX`
//!
//! Steps 2 to 5 address the table by its effective (post-rename) name.

use super::classifier::IndexClassifier;
use super::column::Column;
use super::create_table::add_geometry_column_sql;
use super::diff::{ColumnDiff, ColumnProperty, TableDiff};
use super::index::IndexDescriptor;
use super::platform::Platform;
use super::spatial_index::SpatialIndexSqlGenerator;
use super::{quote_ident, quote_literal, TableRef};
use crate::config::SpatialConfig;
use crate::error::{Result, SpatialError};
use crate::spatial::{SpatialColumnDescriptor, TypeFamily};

pub struct AlterTableSqlGenerator<'a, P: Platform + ?Sized> {
    platform: &'a P,
    config: &'a SpatialConfig,
}

impl<'a, P: Platform + ?Sized> AlterTableSqlGenerator<'a, P> {
    pub fn new(platform: &'a P, config: &'a SpatialConfig) -> Self {
        Self { platform, config }
    }

    /// Generate the statements for `diff`, or fail before producing any.
    ///
    /// Type family and subtype changes of spatial columns are rejected with
    /// [`SpatialError::UnsupportedMigration`].
    pub fn generate(&self, mut diff: TableDiff) -> Result<Vec<String>> {
        let spatial_indexes = IndexClassifier::classify(&mut diff);

        let old = TableRef::parse(&diff.name);
        let effective = match &diff.new_name {
            Some(new_name) => TableRef {
                schema: old.schema.clone(),
                name: TableRef::parse(new_name).name,
            },
            None => old.clone(),
        };

        let mut relabels = Vec::new();
        let mut changed_columns = Vec::with_capacity(diff.changed_columns.len());
        for change in &diff.changed_columns {
            if let Some(sql) = self.check_column_change(&effective, change)? {
                relabels.push(sql);
            }
            if let Some(generic) = self.generic_change(change)? {
                changed_columns.push(generic);
            }
        }

        let mut registrations = Vec::new();
        let mut registered = Vec::new();
        let mut added_columns = Vec::with_capacity(diff.added_columns.len());
        for column in &diff.added_columns {
            match column.spatial_descriptor(self.config)? {
                Some(descriptor) if descriptor.type_family == TypeFamily::Geometry => {
                    registrations.extend(self.register_column(&effective, column, &descriptor));
                    registered.push(column.name.clone());
                }
                Some(descriptor) => added_columns.push(Column {
                    type_name: descriptor.type_constraint(),
                    geometry_type: None,
                    srid: None,
                    ..column.clone()
                }),
                None => added_columns.push(column.clone()),
            }
        }

        diff.changed_columns = changed_columns;
        diff.added_columns = added_columns;

        // Ordinary indexes over registered columns wait for AddGeometryColumn
        let on_registered =
            |index: &IndexDescriptor| index.columns.iter().any(|c| registered.contains(c));
        let (deferred, added): (Vec<_>, Vec<_>) =
            diff.added_indexes.drain(..).partition(|i| on_registered(i));
        let (deferred_changed, changed): (Vec<_>, Vec<_>) =
            diff.changed_indexes.drain(..).partition(|i| on_registered(i));
        diff.added_indexes = added;
        diff.changed_indexes = changed;
        for index in &deferred_changed {
            if !diff.removed_indexes.iter().any(|i| i.name == index.name) {
                diff.removed_indexes.push(index.clone());
            }
        }

        let mut sql = self.platform.alter_table_sql(&diff)?;
        sql.extend(registrations);
        for index in deferred.iter().chain(&deferred_changed) {
            sql.push(self.platform.create_index_sql(index, &effective));
        }
        sql.extend(relabels);

        let spatial = SpatialIndexSqlGenerator::new(self.config);
        for index in &spatial_indexes {
            sql.push(spatial.create_index_sql(index, &effective));
        }

        log::debug!("Generated {} statements to alter table {}", sql.len(), old);
        Ok(sql)
    }

    /// Reject unsupported changes; return the SRID relabel statement, if any.
    ///
    /// A column that ends up ordinary is left to the generic path, including
    /// a spatial column changed to an ordinary type.
    fn check_column_change(&self, effective: &TableRef, change: &ColumnDiff) -> Result<Option<String>> {
        let Some(to) = change.column.spatial_descriptor(self.config)? else {
            return Ok(None);
        };
        let from = match &change.from_column {
            Some(column) => column.spatial_descriptor(self.config)?,
            None => None,
        };

        if change.has_changed(ColumnProperty::Type) {
            return Err(SpatialError::UnsupportedMigration {
                property: ColumnProperty::Type.name(),
                table: effective.to_string(),
                column: change.column.name.clone(),
                from: match (&from, &change.from_column) {
                    (Some(d), _) => Some(d.type_family.name().to_string()),
                    (None, Some(column)) => Some(column.type_name.clone()),
                    (None, None) => None,
                },
                to: to.type_family.name().to_string(),
            });
        }

        if change.has_changed(ColumnProperty::GeometryType) {
            return Err(SpatialError::UnsupportedMigration {
                property: ColumnProperty::GeometryType.name(),
                table: effective.to_string(),
                column: change.column.name.clone(),
                from: from.as_ref().map(|d| d.subtype_name()),
                to: to.subtype_name(),
            });
        }

        if !change.has_changed(ColumnProperty::Srid) {
            return Ok(None);
        }

        log::warn!(
            "Changing the SRID of {}.{} to {} relabels the column only; stored coordinates are not reprojected",
            effective,
            change.column.name,
            to.srid
        );
        Ok(Some(match to.type_family {
            TypeFamily::Geometry => update_geometry_srid_sql(effective, &change.column.name, to.srid),
            TypeFamily::Geography => relabel_geography_sql(effective, &change.column.name, &to),
        }))
    }

    /// The part of a column change the generic path handles, with spatial
    /// columns normalized to their type constraint.
    fn generic_change(&self, change: &ColumnDiff) -> Result<Option<ColumnDiff>> {
        let changed: Vec<ColumnProperty> = change
            .changed_properties
            .iter()
            .copied()
            .filter(|p| !p.is_spatial())
            .collect();
        if changed.is_empty() && change.old_column_name == change.column.name {
            return Ok(None);
        }

        let from_column = change
            .from_column
            .as_ref()
            .map(|c| c.normalized(self.config))
            .transpose()?;
        Ok(Some(ColumnDiff {
            old_column_name: change.old_column_name.clone(),
            column: change.column.normalized(self.config)?,
            from_column,
            changed_properties: changed.into_iter().collect(),
        }))
    }

    fn register_column(
        &self,
        table: &TableRef,
        column: &Column,
        descriptor: &SpatialColumnDescriptor,
    ) -> Vec<String> {
        let mut sql = vec![add_geometry_column_sql(table, &column.name, descriptor)];

        let mut follow_up = Vec::new();
        if !column.nullable {
            follow_up.push(ColumnProperty::NotNull);
        }
        if column.default.is_some() {
            follow_up.push(ColumnProperty::Default);
        }
        if !follow_up.is_empty() {
            let change = ColumnDiff::new(column.clone(), None, follow_up);
            sql.extend(self.platform.alter_column_sql(table, &change));
        }
        if let Some(comment) = &column.comment {
            sql.push(self.platform.column_comment_sql(table, &column.name, Some(comment)));
        }
        sql
    }
}

/// `SELECT UpdateGeometrySRID(...)`; metadata only.
fn update_geometry_srid_sql(table: &TableRef, column: &str, srid: i32) -> String {
    let schema = table
        .schema
        .as_deref()
        .map(|s| format!("{},", quote_literal(s)))
        .unwrap_or_default();
    format!(
        "SELECT UpdateGeometrySRID({}{},{}, {})",
        schema,
        quote_literal(&table.name),
        quote_literal(column),
        srid
    )
}

/// Geography columns are not registered, so the typmod is rewritten in place.
fn relabel_geography_sql(table: &TableRef, column: &str, descriptor: &SpatialColumnDescriptor) -> String {
    let column = quote_ident(column);
    format!(
        "ALTER TABLE {} ALTER COLUMN {column} TYPE {} USING ST_SetSRID({column}::geometry, {})::geography",
        table.quoted(),
        descriptor.type_constraint(),
        descriptor.srid
    )
}
