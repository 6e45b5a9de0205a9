//! Table and column differences.
//!
//! A [`TableDiff`] is consumed once by the alter generator. It can be built by
//! hand or computed from two table definitions with [`TableDiff::between`].

use super::column::Column;
use super::index::IndexDescriptor;
use super::table::Table;
use crate::config::SpatialConfig;
use crate::error::Result;
use std::collections::BTreeSet;
use std::fmt;

/// Named column attribute that a diff can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColumnProperty {
    Type,
    GeometryType,
    Srid,
    NotNull,
    Default,
    Comment,
}

impl ColumnProperty {
    pub const fn name(self) -> &'static str {
        match self {
            ColumnProperty::Type => "type",
            ColumnProperty::GeometryType => "geometry_type",
            ColumnProperty::Srid => "srid",
            ColumnProperty::NotNull => "notnull",
            ColumnProperty::Default => "default",
            ColumnProperty::Comment => "comment",
        }
    }

    /// Properties that only the spatial path understands
    pub const fn is_spatial(self) -> bool {
        matches!(self, ColumnProperty::GeometryType | ColumnProperty::Srid)
    }
}

impl fmt::Display for ColumnProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDiff {
    pub old_column_name: String,
    /// Column after the change
    pub column: Column,
    /// Column before the change, when known
    pub from_column: Option<Column>,
    pub changed_properties: BTreeSet<ColumnProperty>,
}

impl ColumnDiff {
    pub fn new<I>(column: Column, from_column: Option<Column>, changed: I) -> Self
    where
        I: IntoIterator<Item = ColumnProperty>,
    {
        Self {
            old_column_name: from_column
                .as_ref()
                .map_or_else(|| column.name.clone(), |c| c.name.clone()),
            column,
            from_column,
            changed_properties: changed.into_iter().collect(),
        }
    }

    pub fn has_changed(&self, property: ColumnProperty) -> bool {
        self.changed_properties.contains(&property)
    }

    /// Compare two versions of a column. Returns `None` when nothing changed.
    pub fn between(from: &Column, to: &Column, config: &SpatialConfig) -> Result<Option<Self>> {
        let mut changed = BTreeSet::new();

        match (from.spatial_descriptor(config)?, to.spatial_descriptor(config)?) {
            (Some(old), Some(new)) => {
                if old.type_family != new.type_family {
                    changed.insert(ColumnProperty::Type);
                }
                if old.geometry_subtype != new.geometry_subtype
                    || old.dimension_modifier != new.dimension_modifier
                {
                    changed.insert(ColumnProperty::GeometryType);
                }
                if old.srid != new.srid {
                    changed.insert(ColumnProperty::Srid);
                }
            }
            (None, None) => {
                if !from.type_name.trim().eq_ignore_ascii_case(to.type_name.trim()) {
                    changed.insert(ColumnProperty::Type);
                }
            }
            _ => {
                changed.insert(ColumnProperty::Type);
            }
        }

        if from.nullable != to.nullable {
            changed.insert(ColumnProperty::NotNull);
        }
        if from.default != to.default {
            changed.insert(ColumnProperty::Default);
        }
        if from.comment != to.comment {
            changed.insert(ColumnProperty::Comment);
        }

        if changed.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self::new(to.clone(), Some(from.clone()), changed)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableDiff {
    pub name: String,
    pub new_name: Option<String>,
    pub added_columns: Vec<Column>,
    pub changed_columns: Vec<ColumnDiff>,
    pub removed_columns: Vec<Column>,
    pub added_indexes: Vec<IndexDescriptor>,
    pub changed_indexes: Vec<IndexDescriptor>,
    pub removed_indexes: Vec<IndexDescriptor>,
}

impl TableDiff {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Name the table has once the diff is applied
    pub fn effective_name(&self) -> &str {
        self.new_name.as_deref().unwrap_or(&self.name)
    }

    pub fn is_empty(&self) -> bool {
        self.new_name.is_none()
            && self.added_columns.is_empty()
            && self.changed_columns.is_empty()
            && self.removed_columns.is_empty()
            && self.added_indexes.is_empty()
            && self.changed_indexes.is_empty()
            && self.removed_indexes.is_empty()
    }

    /// Compute the diff that turns `from` into `to`.
    ///
    /// Columns and indexes are matched by name, so a renamed column shows up
    /// as removed plus added. The `spatial_indexes` option of both tables is
    /// applied before comparing indexes.
    pub fn between(from: &Table, to: &Table, config: &SpatialConfig) -> Result<Self> {
        let mut diff = TableDiff::new(from.name.clone());
        if from.name != to.name {
            diff.new_name = Some(to.name.clone());
        }

        for column in &to.columns {
            match from.get_column(&column.name) {
                Some(old) => {
                    if let Some(change) = ColumnDiff::between(old, column, config)? {
                        diff.changed_columns.push(change);
                    }
                }
                None => diff.added_columns.push(column.clone()),
            }
        }
        diff.removed_columns = from
            .columns
            .iter()
            .filter(|c| to.get_column(&c.name).is_none())
            .cloned()
            .collect();

        let old_indexes = from.tagged_indexes();
        let new_indexes = to.tagged_indexes();
        for index in &new_indexes {
            match old_indexes.iter().find(|i| i.name == index.name) {
                Some(old) if old.same_definition(index) => {}
                Some(_) => diff.changed_indexes.push(index.clone()),
                None => diff.added_indexes.push(index.clone()),
            }
        }
        diff.removed_indexes = old_indexes
            .into_iter()
            .filter(|old| !new_indexes.iter().any(|i| i.name == old.name))
            .collect();

        Ok(diff)
    }
}
