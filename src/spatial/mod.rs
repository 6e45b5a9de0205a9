//! Spatial value model.
//!
//! [`SpatialColumnDescriptor`] is the one description of a spatial column shared
//! by the DDL generators and the catalog resolver. Its family, subtype,
//! dimension modifier and SRID together determine the catalog type constraint
//! (`geometry(PointZ,4326)`).

mod descriptor;
mod family;

pub use descriptor::{DimensionModifier, SpatialColumnDescriptor, GEOMETRY_SUBTYPES};
pub(crate) use descriptor::parse_type_constraint;
pub use family::TypeFamily;

/// Largest SRID PostGIS accepts
pub const SRID_MAXIMUM: i32 = 999_999;

/// `-1` and `0` both mean "unspecified"
pub fn is_valid_srid(srid: i32) -> bool {
    (-1..=SRID_MAXIMUM).contains(&srid)
}

/// Collapse the legacy `-1` "unknown SRID" onto PostGIS 2's `0`.
pub fn normalize_srid(srid: i32) -> i32 {
    srid.max(0)
}
