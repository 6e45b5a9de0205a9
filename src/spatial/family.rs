use crate::config::SpatialConfig;
use crate::error::SpatialError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse spatial value type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeFamily {
    Geometry,
    Geography,
}

impl TypeFamily {
    pub const ALL: [TypeFamily; 2] = [TypeFamily::Geometry, TypeFamily::Geography];

    /// SQL type name, as reported by generic column introspection
    pub const fn name(self) -> &'static str {
        match self {
            TypeFamily::Geometry => "geometry",
            TypeFamily::Geography => "geography",
        }
    }

    /// Metadata view listing registered columns of this family
    pub const fn catalog_view(self) -> &'static str {
        match self {
            TypeFamily::Geometry => "geometry_columns",
            TypeFamily::Geography => "geography_columns",
        }
    }

    /// Column-name field of [`Self::catalog_view`]
    pub const fn catalog_column_field(self) -> &'static str {
        match self {
            TypeFamily::Geometry => "f_geometry_column",
            TypeFamily::Geography => "f_geography_column",
        }
    }

    /// How the catalog renders a NULL default for this family
    pub const fn null_default_literal(self) -> &'static str {
        match self {
            TypeFamily::Geometry => "NULL::geometry",
            TypeFamily::Geography => "NULL::geography",
        }
    }

    /// SRID used when a column leaves it unspecified
    pub fn default_srid(self, config: &SpatialConfig) -> i32 {
        match self {
            TypeFamily::Geometry => config.default_geometry_srid,
            TypeFamily::Geography => config.default_geography_srid,
        }
    }

    /// Wrap a bound value (usually a placeholder) so EWKT input is stored as this family.
    pub fn to_database_value_sql(self, expr: &str) -> String {
        match self {
            TypeFamily::Geometry => format!("ST_GeomFromEWKT({expr})"),
            TypeFamily::Geography => format!("ST_GeogFromText({expr})"),
        }
    }

    /// Wrap a column expression so it is read back as EWKT.
    pub fn to_value_sql(self, expr: &str) -> String {
        format!("ST_AsEWKT({expr})")
    }
}

impl fmt::Display for TypeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TypeFamily {
    type Err = SpatialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "geometry" => Ok(TypeFamily::Geometry),
            "geography" => Ok(TypeFamily::Geography),
            other => Err(SpatialError::Configuration(format!(
                "Unrecognized spatial type family \"{other}\" (expected \"geometry\" or \"geography\")"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("GEOMETRY".parse::<TypeFamily>().unwrap(), TypeFamily::Geometry);
        assert_eq!(" geography ".parse::<TypeFamily>().unwrap(), TypeFamily::Geography);
    }

    #[test]
    fn test_unknown_family_is_configuration_error() {
        let err = "raster".parse::<TypeFamily>().unwrap_err();
        assert!(matches!(err, SpatialError::Configuration(msg) if msg.contains("raster")));
    }

    #[test]
    fn test_value_conversion_sql() {
        assert_eq!(TypeFamily::Geometry.to_database_value_sql("$1"), "ST_GeomFromEWKT($1)");
        assert_eq!(TypeFamily::Geography.to_database_value_sql("$1"), "ST_GeogFromText($1)");
        assert_eq!(TypeFamily::Geography.to_value_sql("p.geog"), "ST_AsEWKT(p.geog)");
    }

    #[test]
    fn test_default_srid_follows_config() {
        let config = SpatialConfig::default();
        assert_eq!(TypeFamily::Geometry.default_srid(&config), 0);
        assert_eq!(TypeFamily::Geography.default_srid(&config), 4326);
    }
}
