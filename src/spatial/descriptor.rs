use super::{is_valid_srid, normalize_srid, TypeFamily, SRID_MAXIMUM};
use crate::config::SpatialConfig;
use crate::error::{Result, SpatialError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Known geometry subtypes: catalog spelling and typmod spelling.
pub const GEOMETRY_SUBTYPES: &[(&str, &str)] = &[
    ("GEOMETRY", "Geometry"),
    ("POINT", "Point"),
    ("LINESTRING", "LineString"),
    ("POLYGON", "Polygon"),
    ("MULTIPOINT", "MultiPoint"),
    ("MULTILINESTRING", "MultiLineString"),
    ("MULTIPOLYGON", "MultiPolygon"),
    ("GEOMETRYCOLLECTION", "GeometryCollection"),
    ("CIRCULARSTRING", "CircularString"),
    ("COMPOUNDCURVE", "CompoundCurve"),
    ("CURVEPOLYGON", "CurvePolygon"),
    ("MULTICURVE", "MultiCurve"),
    ("MULTISURFACE", "MultiSurface"),
    ("POLYHEDRALSURFACE", "PolyhedralSurface"),
    ("TRIANGLE", "Triangle"),
    ("TIN", "Tin"),
];

static TYPE_CONSTRAINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*([a-z_]+)\s*(?:\(\s*([a-z]+)\s*(?:,\s*(-?\d+)\s*)?\))?\s*$")
        .expect("type constraint pattern is valid")
});

/// Extra ordinates carried beyond X/Y.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DimensionModifier {
    #[default]
    None,
    Z,
    M,
    ZM,
}

impl DimensionModifier {
    pub const fn suffix(self) -> &'static str {
        match self {
            DimensionModifier::None => "",
            DimensionModifier::Z => "Z",
            DimensionModifier::M => "M",
            DimensionModifier::ZM => "ZM",
        }
    }

    /// Coordinate dimension as stored in `geometry_columns.coord_dimension`
    pub const fn coord_dimension(self) -> i32 {
        match self {
            DimensionModifier::None => 2,
            DimensionModifier::Z | DimensionModifier::M => 3,
            DimensionModifier::ZM => 4,
        }
    }

    /// A bare dimension of 3 means Z; M-only columns always carry the suffix.
    fn from_coord_dimension(dimension: i32) -> Option<Self> {
        match dimension {
            2 => Some(DimensionModifier::None),
            3 => Some(DimensionModifier::Z),
            4 => Some(DimensionModifier::ZM),
            _ => None,
        }
    }
}

/// Split `POINTZM` into (`POINT`, `ZM`). Returns `None` for unknown subtypes.
fn split_subtype(raw: &str) -> Option<(&'static str, DimensionModifier)> {
    let upper = raw.trim().to_ascii_uppercase();
    let lookup = |base: &str| {
        GEOMETRY_SUBTYPES
            .iter()
            .find(|(name, _)| *name == base)
            .map(|(name, _)| *name)
    };

    if let Some(base) = lookup(upper.as_str()) {
        return Some((base, DimensionModifier::None));
    }
    for modifier in [DimensionModifier::ZM, DimensionModifier::Z, DimensionModifier::M] {
        if let Some(base) = upper.strip_suffix(modifier.suffix()).and_then(lookup) {
            return Some((base, modifier));
        }
    }
    None
}

/// PostGIS reads a geography without SRID as WGS 84, so 0 is never stored for it.
const GEOGRAPHY_DEFAULT_SRID: i32 = 4326;

fn family_srid(type_family: TypeFamily, srid: i32) -> i32 {
    match (type_family, normalize_srid(srid)) {
        (TypeFamily::Geography, 0) => GEOGRAPHY_DEFAULT_SRID,
        (_, srid) => srid,
    }
}

fn typmod_name(subtype: &str) -> &'static str {
    GEOMETRY_SUBTYPES
        .iter()
        .find(|(name, _)| *name == subtype)
        .map(|(_, typmod)| *typmod)
        .unwrap_or("Geometry")
}

/// Description of one spatial column.
///
/// `geometry_subtype` always holds the bare uppercase subtype (`POINT`); the
/// Z/M ordinates live in `dimension_modifier`. `srid` is never negative: the
/// legacy `-1` is stored as `0`. Build through the constructors to keep those
/// invariants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpatialColumnDescriptor {
    pub type_family: TypeFamily,
    pub geometry_subtype: String,
    pub dimension_modifier: DimensionModifier,
    pub srid: i32,
    pub nullable: bool,
    /// Real default expression; the catalog's `NULL::geometry` rendering is never stored here
    pub default_literal: Option<String>,
}

impl SpatialColumnDescriptor {
    /// Create a nullable descriptor without default.
    ///
    /// `subtype` may carry a dimension suffix (`PointZ`, `POLYGONM`). A
    /// geography SRID of 0 or -1 is stored as 4326.
    pub fn new(type_family: TypeFamily, subtype: &str, srid: i32) -> Result<Self> {
        let (base, modifier) = split_subtype(subtype).ok_or_else(|| {
            SpatialError::Configuration(format!("Unknown geometry type \"{subtype}\""))
        })?;
        if !is_valid_srid(srid) {
            return Err(SpatialError::Configuration(format!(
                "SRID {srid} is out of range (-1..={SRID_MAXIMUM})"
            )));
        }

        Ok(Self {
            type_family,
            geometry_subtype: base.to_string(),
            dimension_modifier: modifier,
            srid: family_srid(type_family, srid),
            nullable: true,
            default_literal: None,
        })
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_default<S: Into<String>>(mut self, default: S) -> Self {
        self.default_literal = Some(default.into());
        self
    }

    /// Normalize raw column options: the subtype defaults to `GEOMETRY`, the
    /// SRID to the family default, and a geography SRID of 0 becomes the
    /// configured geography default.
    pub fn from_options(
        type_family: TypeFamily,
        geometry_type: Option<&str>,
        srid: Option<i32>,
        config: &SpatialConfig,
    ) -> Result<Self> {
        let mut srid = srid.unwrap_or_else(|| type_family.default_srid(config));
        if type_family == TypeFamily::Geography && normalize_srid(srid) == 0 {
            srid = config.default_geography_srid;
        }
        Self::new(type_family, geometry_type.unwrap_or("GEOMETRY"), srid)
    }

    /// Build from a row of `geometry_columns` / `geography_columns`.
    ///
    /// Malformed rows are [`SpatialError::Metadata`], never configuration errors.
    pub fn from_catalog(
        type_family: TypeFamily,
        type_name: &str,
        coord_dimension: i32,
        srid: i32,
    ) -> Result<Self> {
        let (base, suffix) = split_subtype(type_name).ok_or_else(|| {
            SpatialError::Metadata(format!("Catalog reports unknown geometry type \"{type_name}\""))
        })?;

        let modifier = match suffix {
            DimensionModifier::None => DimensionModifier::from_coord_dimension(coord_dimension)
                .ok_or_else(|| {
                    SpatialError::Metadata(format!(
                        "Catalog reports coordinate dimension {coord_dimension} for type \"{type_name}\""
                    ))
                })?,
            explicit if explicit.coord_dimension() == coord_dimension => explicit,
            explicit => {
                return Err(SpatialError::Metadata(format!(
                    "Catalog type \"{type_name}\" implies {} dimensions, but coord_dimension is {coord_dimension}",
                    explicit.coord_dimension()
                )))
            }
        };

        if !is_valid_srid(srid) {
            return Err(SpatialError::Metadata(format!(
                "Catalog reports SRID {srid}, outside -1..={SRID_MAXIMUM}"
            )));
        }

        Ok(Self {
            type_family,
            geometry_subtype: base.to_string(),
            dimension_modifier: modifier,
            srid: family_srid(type_family, srid),
            nullable: true,
            default_literal: None,
        })
    }

    /// Subtype with its dimension suffix, uppercased (`POINTZ`)
    pub fn subtype_name(&self) -> String {
        format!("{}{}", self.geometry_subtype, self.dimension_modifier.suffix())
    }

    /// Type argument for `AddGeometryColumn`: only the M suffix is spelled out,
    /// Z and ZM are conveyed by the dimension argument.
    pub fn registration_type_name(&self) -> String {
        match self.dimension_modifier {
            DimensionModifier::M => format!("{}M", self.geometry_subtype),
            _ => self.geometry_subtype.clone(),
        }
    }

    pub fn coord_dimension(&self) -> i32 {
        self.dimension_modifier.coord_dimension()
    }

    /// Catalog type constraint, e.g. `geometry(PointZ,4326)`.
    pub fn type_constraint(&self) -> String {
        let family = self.type_family.name();
        if self.geometry_subtype == "GEOMETRY"
            && self.dimension_modifier == DimensionModifier::None
            && self.srid == 0
        {
            return family.to_string();
        }

        let subtype = format!(
            "{}{}",
            typmod_name(&self.geometry_subtype),
            self.dimension_modifier.suffix()
        );
        if self.srid == 0 {
            format!("{family}({subtype})")
        } else {
            format!("{family}({subtype},{})", self.srid)
        }
    }

    /// True when both describe the same stored type, ignoring nullability and default.
    pub fn same_type_as(&self, other: &Self) -> bool {
        self.type_family == other.type_family
            && self.geometry_subtype == other.geometry_subtype
            && self.dimension_modifier == other.dimension_modifier
            && self.srid == other.srid
    }
}

impl fmt::Display for SpatialColumnDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_constraint())
    }
}

/// Parses a type constraint: `geometry`, `geometry(Point)`, `geography(PointZ, 4326)`.
/// An omitted SRID is 0 for geometry and 4326 for geography.
impl FromStr for SpatialColumnDescriptor {
    type Err = SpatialError;

    fn from_str(s: &str) -> Result<Self> {
        let (family, subtype, srid) = parse_type_constraint(s)?;
        let srid = srid.unwrap_or(match family {
            TypeFamily::Geometry => 0,
            TypeFamily::Geography => GEOGRAPHY_DEFAULT_SRID,
        });
        Self::new(family, subtype.unwrap_or("GEOMETRY"), srid)
    }
}

/// Split a type constraint into family, optional subtype and optional SRID.
pub(crate) fn parse_type_constraint(s: &str) -> Result<(TypeFamily, Option<&str>, Option<i32>)> {
    let caps = TYPE_CONSTRAINT.captures(s).ok_or_else(|| {
        SpatialError::Configuration(format!("Malformed spatial type \"{s}\""))
    })?;

    let family: TypeFamily = caps[1].parse()?;
    let subtype = caps.get(2).map(|m| m.as_str());
    let srid = caps
        .get(3)
        .map(|m| {
            m.as_str().parse::<i32>().map_err(|_| {
                SpatialError::Configuration(format!("SRID in \"{s}\" is out of range"))
            })
        })
        .transpose()?;

    Ok((family, subtype, srid))
}
