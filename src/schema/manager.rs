//! Introspection read path.
//!
//! [`SpatialSchemaManager`] is bound to exactly one connection (through its
//! [`SpatialCatalog`]) and caches what it resolves for that connection. It
//! turns generic column and index introspection into spatial descriptions.

use super::catalog::SpatialCatalog;
use super::column::Column;
use super::index::IndexDescriptor;
use super::resolver::ColumnInfoResolver;
use crate::config::SpatialConfig;
use crate::error::{Result, SpatialError};
use crate::spatial::{SpatialColumnDescriptor, TypeFamily};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

/// A column as reported by generic introspection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawColumn {
    pub field: String,
    /// Generic type name (`geometry`, `geography`, `integer`, ...)
    pub type_name: String,
    pub default: Option<String>,
    pub not_null: bool,
    pub comment: Option<String>,
}

impl RawColumn {
    pub fn new<F: Into<String>, T: Into<String>>(field: F, type_name: T) -> Self {
        Self {
            field: field.into(),
            type_name: type_name.into(),
            ..Default::default()
        }
    }
}

type ColumnKey = (String, String, TypeFamily);

pub struct SpatialSchemaManager {
    config: SpatialConfig,
    catalog: Option<Rc<dyn SpatialCatalog>>,
    columns: RefCell<HashMap<ColumnKey, Option<SpatialColumnDescriptor>>>,
    indexes: RefCell<HashMap<String, BTreeMap<String, IndexDescriptor>>>,
}

impl SpatialSchemaManager {
    pub fn new(config: SpatialConfig) -> Self {
        Self {
            config,
            catalog: None,
            columns: RefCell::new(HashMap::new()),
            indexes: RefCell::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &SpatialConfig {
        &self.config
    }

    pub fn is_bound(&self) -> bool {
        self.catalog.is_some()
    }

    /// Bind to a connection.
    ///
    /// Binding the connection already bound is a no-op. Binding a different
    /// one fails with [`SpatialError::AlreadyBound`] until [`Self::reset`].
    pub fn bind(&mut self, catalog: Rc<dyn SpatialCatalog>) -> Result<()> {
        if let Some(bound) = &self.catalog {
            if bound.connection_id() == catalog.connection_id() {
                return Ok(());
            }
            return Err(SpatialError::AlreadyBound {
                bound: bound.connection_id(),
                requested: catalog.connection_id(),
            });
        }

        log::info!("Spatial schema manager bound to connection #{}", catalog.connection_id());
        self.catalog = Some(catalog);
        Ok(())
    }

    /// Unbind and drop every cached lookup.
    pub fn reset(&mut self) {
        self.catalog = None;
        self.clear_cache();
    }

    /// Drop cached lookups; call after applying DDL through the bound connection.
    pub fn clear_cache(&self) {
        self.columns.borrow_mut().clear();
        self.indexes.borrow_mut().clear();
    }

    fn catalog(&self) -> Result<&dyn SpatialCatalog> {
        self.catalog.as_deref().ok_or(SpatialError::NotBound)
    }

    /// Resolve one column through the catalog, cached per connection.
    pub fn resolve_column(
        &self,
        table: &str,
        column: &str,
        family: TypeFamily,
    ) -> Result<Option<SpatialColumnDescriptor>> {
        let key = (table.to_string(), column.to_string(), family);
        if let Some(cached) = self.columns.borrow().get(&key) {
            return Ok(cached.clone());
        }

        let resolved = ColumnInfoResolver::new(self.catalog()?).resolve(table, column, family)?;
        log::debug!("Resolved {table}.{column} as {resolved:?}");
        self.columns.borrow_mut().insert(key, resolved.clone());
        Ok(resolved)
    }

    /// Every registered spatial column of `table`.
    pub fn list_spatial_columns(&self, table: &str) -> Result<Vec<(String, SpatialColumnDescriptor)>> {
        ColumnInfoResolver::new(self.catalog()?).resolve_all(table)
    }

    /// Spatial indexes of `table`, by name.
    pub fn list_spatial_indexes(&self, table: &str) -> Result<BTreeMap<String, IndexDescriptor>> {
        if let Some(cached) = self.indexes.borrow().get(table) {
            return Ok(cached.clone());
        }

        let rows = self
            .catalog()?
            .spatial_index_rows(&super::TableRef::parse(table))?;
        let indexes: BTreeMap<String, IndexDescriptor> = rows
            .into_iter()
            .map(|row| {
                let index = IndexDescriptor {
                    name: row.name.clone(),
                    columns: row.columns,
                    unique: row.unique,
                    primary: row.primary,
                    spatial: true,
                    partial_where: None,
                };
                (row.name, index)
            })
            .collect();

        self.indexes.borrow_mut().insert(table.to_string(), indexes.clone());
        Ok(indexes)
    }

    /// Tag an index from generic introspection: spatial iff the catalog
    /// lists it as a spatial index of `table`. Other flags are kept.
    pub fn index_definition(&self, table: &str, mut index: IndexDescriptor) -> Result<IndexDescriptor> {
        index.spatial = self.list_spatial_indexes(table)?.contains_key(&index.name);
        Ok(index)
    }

    /// Replace a generic `geometry` / `geography` column with its spatial description.
    ///
    /// Returns `Ok(None)` for non-spatial columns and for spatial columns the
    /// catalog does not list, leaving them to generic handling.
    pub fn column_definition(&self, table: &str, raw: &RawColumn) -> Result<Option<Column>> {
        let Ok(family) = raw.type_name.parse::<TypeFamily>() else {
            return Ok(None);
        };
        let Some(descriptor) = self.resolve_column(table, &raw.field, family)? else {
            return Ok(None);
        };

        let mut descriptor = descriptor.with_nullable(!raw.not_null);
        descriptor.default_literal = sanitize_default(raw.default.as_deref());

        let mut column = Column::from_descriptor(raw.field.clone(), &descriptor);
        column.comment = raw.comment.clone();
        Ok(Some(column))
    }
}

/// Catalog rendering of a NULL default is not a real default.
pub(crate) fn sanitize_default(default: Option<&str>) -> Option<String> {
    let default = default?.trim();
    let is_null = default.eq_ignore_ascii_case("NULL")
        || TypeFamily::ALL
            .iter()
            .any(|f| default.eq_ignore_ascii_case(f.null_default_literal()));
    if is_null || default.is_empty() {
        None
    } else {
        Some(default.to_string())
    }
}
