use super::catalog::{CatalogColumnRow, SpatialCatalog};
use super::TableRef;
use crate::error::{Result, SpatialError};
use crate::spatial::{SpatialColumnDescriptor, TypeFamily};

/// Resolves spatial column descriptions from the metadata catalog.
///
/// Read-only. A column missing from the catalog is not an error: it simply
/// is not a registered spatial column.
pub struct ColumnInfoResolver<'a> {
    catalog: &'a dyn SpatialCatalog,
}

impl<'a> ColumnInfoResolver<'a> {
    pub fn new(catalog: &'a dyn SpatialCatalog) -> Self {
        Self { catalog }
    }

    /// Describe `table.column`, or `Ok(None)` when the catalog does not list it.
    ///
    /// `table` may be schema-qualified (`gis.parcels`).
    pub fn resolve(
        &self,
        table: &str,
        column: &str,
        family: TypeFamily,
    ) -> Result<Option<SpatialColumnDescriptor>> {
        let table = TableRef::parse(table);
        let rows = self.catalog.spatial_column_rows(family, &table, Some(column))?;

        match rows.iter().find(|row| row.column == column) {
            Some(row) => descriptor_from_row(family, &table, row).map(Some),
            None => {
                log::debug!("{table}.{column} is not registered in {}", family.catalog_view());
                Ok(None)
            }
        }
    }

    /// Every registered spatial column of `table`, geometry columns first.
    pub fn resolve_all(&self, table: &str) -> Result<Vec<(String, SpatialColumnDescriptor)>> {
        let table = TableRef::parse(table);
        let mut resolved = Vec::new();
        for family in TypeFamily::ALL {
            for row in self.catalog.spatial_column_rows(family, &table, None)? {
                let descriptor = descriptor_from_row(family, &table, &row)?;
                resolved.push((row.column, descriptor));
            }
        }
        Ok(resolved)
    }
}

fn descriptor_from_row(
    family: TypeFamily,
    table: &TableRef,
    row: &CatalogColumnRow,
) -> Result<SpatialColumnDescriptor> {
    let missing = |field: &str| {
        SpatialError::Metadata(format!(
            "{} row for {}.{} has no {field}",
            family.catalog_view(),
            table,
            row.column
        ))
    };

    let type_name = row.type_name.as_deref().ok_or_else(|| missing("type"))?;
    let coord_dimension = row.coord_dimension.ok_or_else(|| missing("coord_dimension"))?;
    let srid = row.srid.ok_or_else(|| missing("srid"))?;

    SpatialColumnDescriptor::from_catalog(family, type_name, coord_dimension, srid)
}
