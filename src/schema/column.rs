//! Column and foreign key definitions.
//!
//! A [`Column`] carries its SQL type as a string. Spatial columns are spelled
//! either as a full type constraint (`geometry(Point,4326)`) or as a bare
//! family name plus `geometry_type` / `srid` options, the way the TOML schema
//! files used by the migration CLI write them.

use crate::config::SpatialConfig;
use crate::error::{Result, SpatialError};
use crate::spatial::{parse_type_constraint, SpatialColumnDescriptor, TypeFamily};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    /// Spatial subtype option (`POINT`, `PolygonZ`, ...)
    #[serde(default)]
    pub geometry_type: Option<String>,
    /// Spatial reference option
    #[serde(default)]
    pub srid: Option<i32>,
}

impl Column {
    /// A `NOT NULL` column without default.
    pub fn new<N: Into<String>, T: Into<String>>(name: N, type_name: T) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            nullable: false,
            default: None,
            comment: None,
            geometry_type: None,
            srid: None,
        }
    }

    /// Column whose type, nullability and default come from a descriptor.
    pub fn from_descriptor<N: Into<String>>(name: N, descriptor: &SpatialColumnDescriptor) -> Self {
        Self {
            name: name.into(),
            type_name: descriptor.type_constraint(),
            nullable: descriptor.nullable,
            default: descriptor.default_literal.clone(),
            comment: None,
            geometry_type: None,
            srid: None,
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_default<S: Into<String>>(mut self, default: S) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_comment<S: Into<String>>(mut self, comment: S) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_geometry_type<S: Into<String>>(mut self, geometry_type: S) -> Self {
        self.geometry_type = Some(geometry_type.into());
        self
    }

    pub fn with_srid(mut self, srid: i32) -> Self {
        self.srid = Some(srid);
        self
    }

    fn has_spatial_options(&self) -> bool {
        self.geometry_type.is_some() || self.srid.is_some()
    }

    /// Family named by the type, if it is a spatial one.
    pub fn type_family(&self) -> Option<TypeFamily> {
        let family = self.type_name.split('(').next().unwrap_or_default();
        family.parse().ok()
    }

    /// Resolve the spatial description of this column.
    ///
    /// Returns `Ok(None)` for ordinary columns. A column carrying spatial
    /// options under a type that is not a spatial family is a configuration
    /// error, as is an unknown subtype or an out-of-range SRID.
    pub fn spatial_descriptor(&self, config: &SpatialConfig) -> Result<Option<SpatialColumnDescriptor>> {
        if self.type_family().is_none() {
            if self.has_spatial_options() {
                return Err(SpatialError::Configuration(format!(
                    "Column \"{}\" has spatial options but its type \"{}\" is not a recognized spatial type family",
                    self.name, self.type_name
                )));
            }
            return Ok(None);
        }

        let (family, subtype, srid) = parse_type_constraint(&self.type_name)?;
        let descriptor = SpatialColumnDescriptor::from_options(
            family,
            self.geometry_type.as_deref().or(subtype),
            self.srid.or(srid),
            config,
        )?
        .with_nullable(self.nullable);

        Ok(Some(match &self.default {
            Some(default) => descriptor.with_default(default.clone()),
            None => descriptor,
        }))
    }

    /// Copy with spatial options folded into the type constraint, so the
    /// generic DDL path sees a plain SQL type such as `geography(Point,4326)`.
    pub fn normalized(&self, config: &SpatialConfig) -> Result<Column> {
        match self.spatial_descriptor(config)? {
            Some(descriptor) => Ok(Column {
                type_name: descriptor.type_constraint(),
                geometry_type: None,
                srid: None,
                ..self.clone()
            }),
            None => Ok(self.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    #[serde(default)]
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub foreign_table: String,
    pub foreign_columns: Vec<String>,
    /// `CASCADE`, `SET NULL`, `SET DEFAULT`, `RESTRICT` or `NO ACTION`
    #[serde(default)]
    pub on_delete: Option<String>,
    #[serde(default)]
    pub on_update: Option<String>,
}

impl ForeignKey {
    pub fn new<I, J, S, T>(columns: I, foreign_table: &str, foreign_columns: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            name: None,
            columns: columns.into_iter().map(Into::into).collect(),
            foreign_table: foreign_table.to_string(),
            foreign_columns: foreign_columns.into_iter().map(Into::into).collect(),
            on_delete: None,
            on_update: None,
        }
    }

    pub fn on_delete<S: Into<String>>(mut self, action: S) -> Self {
        self.on_delete = Some(action.into());
        self
    }

    /// Explicit name, or `fk_<table>_<columns>`
    pub fn constraint_name(&self, table: &str) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!(
                "fk_{}_{}",
                super::sanitize_constraint_name(table),
                super::sanitize_constraint_name(&self.columns.join("_"))
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::DimensionModifier;

    #[test]
    fn test_ordinary_column_is_not_spatial() {
        let config = SpatialConfig::default();
        let column = Column::new("name", "text");
        assert_eq!(column.spatial_descriptor(&config).unwrap(), None);
        assert_eq!(column.type_family(), None);
    }

    #[test]
    fn test_type_constraint_spelling() {
        let config = SpatialConfig::default();
        let column = Column::new("geom", "geometry(PointZ,4326)").with_nullable(true);
        let d = column.spatial_descriptor(&config).unwrap().unwrap();
        assert_eq!(d.type_family, TypeFamily::Geometry);
        assert_eq!(d.geometry_subtype, "POINT");
        assert_eq!(d.dimension_modifier, DimensionModifier::Z);
        assert_eq!(d.srid, 4326);
        assert!(d.nullable);
    }

    #[test]
    fn test_option_spelling_uses_config_defaults() {
        let config = SpatialConfig {
            default_geometry_srid: 3857,
            ..Default::default()
        };
        let column = Column::new("geom", "geometry").with_geometry_type("polygon");
        let d = column.spatial_descriptor(&config).unwrap().unwrap();
        assert_eq!(d.geometry_subtype, "POLYGON");
        assert_eq!(d.srid, 3857);
        assert!(!d.nullable);
    }

    #[test]
    fn test_options_override_type_constraint() {
        let config = SpatialConfig::default();
        let column = Column::new("geom", "geometry(Point,4326)").with_srid(3857);
        let d = column.spatial_descriptor(&config).unwrap().unwrap();
        assert_eq!(d.srid, 3857);
        assert_eq!(d.geometry_subtype, "POINT");
    }

    #[test]
    fn test_spatial_options_on_unknown_family() {
        let config = SpatialConfig::default();
        let column = Column::new("geom", "geometri").with_srid(4326);
        assert!(matches!(
            column.spatial_descriptor(&config),
            Err(SpatialError::Configuration(msg)) if msg.contains("geometri")
        ));
    }

    #[test]
    fn test_normalized_folds_options() {
        let config = SpatialConfig::default();
        let column = Column::new("geog", "geography")
            .with_geometry_type("point")
            .with_comment("site");
        let normalized = column.normalized(&config).unwrap();
        assert_eq!(normalized.type_name, "geography(Point,4326)");
        assert_eq!(normalized.geometry_type, None);
        assert_eq!(normalized.comment.as_deref(), Some("site"));
    }

    #[test]
    fn test_foreign_key_constraint_name() {
        let fk = ForeignKey::new(["owner_id"], "owners", ["id"]);
        assert_eq!(fk.constraint_name("land-parcels"), "fk_land_parcels_owner_id");
    }
}
