//! Static catalog of PostGIS SQL functions.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

/// Section of the PostGIS reference a function belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionCategory {
    Types,
    Constructors,
    Accessors,
    Editors,
    Outputs,
    RelationshipsMeasurements,
    Processing,
    Miscellaneous,
}

impl FunctionCategory {
    pub const fn title(self) -> &'static str {
        match self {
            FunctionCategory::Types => "PostGIS Geometry/Geography/Box Types",
            FunctionCategory::Constructors => "Geometry Constructors",
            FunctionCategory::Accessors => "Geometry Accessors",
            FunctionCategory::Editors => "Geometry Editors",
            FunctionCategory::Outputs => "Geometry Outputs",
            FunctionCategory::RelationshipsMeasurements => "Spatial Relationships and Measurements",
            FunctionCategory::Processing => "Geometry Processing",
            FunctionCategory::Miscellaneous => "Miscellaneous Functions",
        }
    }
}

/// Kind of value a function returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnType {
    String,
    Numeric,
    Boolean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FunctionSpec {
    pub name: &'static str,
    pub category: FunctionCategory,
    pub required_arguments: usize,
    pub total_arguments: usize,
    pub return_type: ReturnType,
}

impl FunctionSpec {
    const fn new(
        name: &'static str,
        category: FunctionCategory,
        required_arguments: usize,
        total_arguments: usize,
        return_type: ReturnType,
    ) -> Self {
        Self {
            name,
            category,
            required_arguments,
            total_arguments,
            return_type,
        }
    }

    pub fn accepts(&self, arguments: usize) -> bool {
        (self.required_arguments..=self.total_arguments).contains(&arguments)
    }
}

use FunctionCategory::*;
use ReturnType::{Boolean as B, Numeric as N, String as S};

const fn spec(name: &'static str, category: FunctionCategory, required: usize, total: usize, ret: ReturnType) -> FunctionSpec {
    FunctionSpec::new(name, category, required, total, ret)
}

pub const SPATIAL_FUNCTIONS: &[FunctionSpec] = &[
    spec("Box2D", Types, 1, 1, S),
    spec("Box3D", Types, 1, 1, S),
    spec("Geometry", Types, 1, 1, S),
    spec("Geography", Types, 1, 1, S),
    spec("ST_Collect", Constructors, 1, 2, S),
    spec("ST_GeogFromText", Constructors, 1, 1, S),
    spec("ST_GeographyFromText", Constructors, 1, 1, S),
    spec("ST_GeomCollFromText", Constructors, 1, 2, S),
    spec("ST_GeomFromEWKB", Constructors, 1, 1, S),
    spec("ST_GeomFromEWKT", Constructors, 1, 1, S),
    spec("ST_GeomFromGeoJSON", Constructors, 1, 1, S),
    spec("ST_GeomFromText", Constructors, 1, 2, S),
    spec("ST_GeomFromWKB", Constructors, 1, 2, S),
    spec("ST_LineFromMultiPoint", Constructors, 1, 1, S),
    spec("ST_LineFromText", Constructors, 1, 2, S),
    spec("ST_MLineFromText", Constructors, 1, 2, S),
    spec("ST_MPointFromText", Constructors, 1, 2, S),
    spec("ST_MPolyFromText", Constructors, 1, 2, S),
    spec("ST_MakeBox2D", Constructors, 2, 2, S),
    spec("ST_3DMakeBox", Constructors, 2, 2, S),
    spec("ST_MakeEnvelope", Constructors, 4, 5, S),
    spec("ST_MakeLine", Constructors, 1, 2, S),
    spec("ST_MakePoint", Constructors, 2, 4, S),
    spec("ST_MakePointM", Constructors, 3, 3, S),
    spec("ST_MakePolygon", Constructors, 1, 2, S),
    spec("ST_Point", Constructors, 2, 3, S),
    spec("ST_PointFromText", Constructors, 1, 2, S),
    spec("ST_Polygon", Constructors, 2, 2, S),
    spec("ST_PolygonFromText", Constructors, 1, 2, S),
    spec("ST_TileEnvelope", Constructors, 3, 5, S),
    spec("GeometryType", Accessors, 1, 1, S),
    spec("ST_Boundary", Accessors, 1, 1, S),
    spec("ST_CoordDim", Accessors, 1, 1, N),
    spec("ST_Dimension", Accessors, 1, 1, N),
    spec("ST_EndPoint", Accessors, 1, 1, S),
    spec("ST_Envelope", Accessors, 1, 1, S),
    spec("ST_ExteriorRing", Accessors, 1, 1, S),
    spec("ST_GeometryN", Accessors, 2, 2, S),
    spec("ST_GeometryType", Accessors, 1, 1, S),
    spec("ST_InteriorRingN", Accessors, 2, 2, S),
    spec("ST_IsClosed", Accessors, 1, 1, B),
    spec("ST_IsCollection", Accessors, 1, 1, B),
    spec("ST_IsEmpty", Accessors, 1, 1, B),
    spec("ST_IsRing", Accessors, 1, 1, B),
    spec("ST_IsSimple", Accessors, 1, 1, B),
    spec("ST_IsValid", Accessors, 1, 2, B),
    spec("ST_IsValidReason", Accessors, 1, 2, S),
    spec("ST_M", Accessors, 1, 1, N),
    spec("ST_NDims", Accessors, 1, 1, N),
    spec("ST_NPoints", Accessors, 1, 1, N),
    spec("ST_NRings", Accessors, 1, 1, N),
    spec("ST_NumGeometries", Accessors, 1, 1, N),
    spec("ST_NumInteriorRings", Accessors, 1, 1, N),
    spec("ST_NumPoints", Accessors, 1, 1, N),
    spec("ST_PointN", Accessors, 2, 2, S),
    spec("ST_SRID", Accessors, 1, 1, N),
    spec("ST_StartPoint", Accessors, 1, 1, S),
    spec("ST_Summary", Accessors, 1, 1, S),
    spec("ST_X", Accessors, 1, 1, N),
    spec("ST_XMax", Accessors, 1, 1, N),
    spec("ST_XMin", Accessors, 1, 1, N),
    spec("ST_Y", Accessors, 1, 1, N),
    spec("ST_YMax", Accessors, 1, 1, N),
    spec("ST_YMin", Accessors, 1, 1, N),
    spec("ST_Z", Accessors, 1, 1, N),
    spec("ST_ZMax", Accessors, 1, 1, N),
    spec("ST_ZMin", Accessors, 1, 1, N),
    spec("ST_Zmflag", Accessors, 1, 1, N),
    spec("ST_AddPoint", Editors, 2, 3, S),
    spec("ST_Affine", Editors, 7, 13, S),
    spec("ST_CollectionExtract", Editors, 1, 2, S),
    spec("ST_FlipCoordinates", Editors, 1, 1, S),
    spec("ST_Force2D", Editors, 1, 1, S),
    spec("ST_Force3D", Editors, 1, 2, S),
    spec("ST_Force3DM", Editors, 1, 2, S),
    spec("ST_Force3DZ", Editors, 1, 2, S),
    spec("ST_Force4D", Editors, 1, 3, S),
    spec("ST_ForceCollection", Editors, 1, 1, S),
    spec("ST_ForcePolygonCCW", Editors, 1, 1, S),
    spec("ST_ForcePolygonCW", Editors, 1, 1, S),
    spec("ST_ForceRHR", Editors, 1, 1, S),
    spec("ST_LineMerge", Editors, 1, 2, S),
    spec("ST_Multi", Editors, 1, 1, S),
    spec("ST_Normalize", Editors, 1, 1, S),
    spec("ST_RemovePoint", Editors, 2, 2, S),
    spec("ST_Reverse", Editors, 1, 1, S),
    spec("ST_Rotate", Editors, 2, 4, S),
    spec("ST_RotateX", Editors, 2, 2, S),
    spec("ST_RotateY", Editors, 2, 2, S),
    spec("ST_RotateZ", Editors, 2, 2, S),
    spec("ST_Scale", Editors, 2, 4, S),
    spec("ST_Segmentize", Editors, 2, 2, S),
    spec("ST_SetPoint", Editors, 3, 3, S),
    spec("ST_SetSRID", Editors, 2, 2, S),
    spec("ST_Snap", Editors, 3, 3, S),
    spec("ST_SnapToGrid", Editors, 2, 6, S),
    spec("ST_Transform", Editors, 2, 3, S),
    spec("ST_TransScale", Editors, 5, 5, S),
    spec("ST_Translate", Editors, 3, 4, S),
    spec("ST_AsBinary", Outputs, 1, 2, S),
    spec("ST_AsEWKB", Outputs, 1, 2, S),
    spec("ST_AsEWKT", Outputs, 1, 2, S),
    spec("ST_AsGeoJSON", Outputs, 1, 4, S),
    spec("ST_AsGML", Outputs, 1, 6, S),
    spec("ST_AsHEXEWKB", Outputs, 1, 2, S),
    spec("ST_AsKML", Outputs, 1, 3, S),
    spec("ST_AsLatLonText", Outputs, 1, 2, S),
    spec("ST_AsMVTGeom", Outputs, 2, 5, S),
    spec("ST_AsSVG", Outputs, 1, 3, S),
    spec("ST_AsText", Outputs, 1, 2, S),
    spec("ST_GeoHash", Outputs, 1, 2, S),
    spec("ST_3DClosestPoint", RelationshipsMeasurements, 2, 2, S),
    spec("ST_3DDFullyWithin", RelationshipsMeasurements, 3, 3, B),
    spec("ST_3DDWithin", RelationshipsMeasurements, 3, 3, B),
    spec("ST_3DDistance", RelationshipsMeasurements, 2, 2, N),
    spec("ST_3DIntersects", RelationshipsMeasurements, 2, 2, B),
    spec("ST_3DLength", RelationshipsMeasurements, 1, 1, N),
    spec("ST_3DLongestLine", RelationshipsMeasurements, 2, 2, S),
    spec("ST_3DMaxDistance", RelationshipsMeasurements, 2, 2, N),
    spec("ST_3DShortestLine", RelationshipsMeasurements, 2, 2, S),
    spec("ST_Area", RelationshipsMeasurements, 1, 2, N),
    spec("ST_Azimuth", RelationshipsMeasurements, 2, 2, N),
    spec("ST_Centroid", RelationshipsMeasurements, 1, 2, S),
    spec("ST_ClosestPoint", RelationshipsMeasurements, 2, 2, S),
    spec("ST_Contains", RelationshipsMeasurements, 2, 2, B),
    spec("ST_ContainsProperly", RelationshipsMeasurements, 2, 2, B),
    spec("ST_CoveredBy", RelationshipsMeasurements, 2, 2, B),
    spec("ST_Covers", RelationshipsMeasurements, 2, 2, B),
    spec("ST_Crosses", RelationshipsMeasurements, 2, 2, B),
    spec("ST_DFullyWithin", RelationshipsMeasurements, 3, 3, B),
    spec("ST_DWithin", RelationshipsMeasurements, 3, 4, B),
    spec("ST_Disjoint", RelationshipsMeasurements, 2, 2, B),
    spec("ST_Distance", RelationshipsMeasurements, 2, 3, N),
    spec("ST_DistanceSphere", RelationshipsMeasurements, 2, 2, N),
    spec("ST_DistanceSpheroid", RelationshipsMeasurements, 3, 3, N),
    spec("ST_Equals", RelationshipsMeasurements, 2, 2, B),
    spec("ST_FrechetDistance", RelationshipsMeasurements, 2, 3, N),
    spec("ST_HausdorffDistance", RelationshipsMeasurements, 2, 3, N),
    spec("ST_Intersects", RelationshipsMeasurements, 2, 2, B),
    spec("ST_Length", RelationshipsMeasurements, 1, 2, N),
    spec("ST_Length2D", RelationshipsMeasurements, 1, 1, N),
    spec("ST_LengthSpheroid", RelationshipsMeasurements, 2, 2, N),
    spec("ST_LineCrossingDirection", RelationshipsMeasurements, 2, 2, N),
    spec("ST_LongestLine", RelationshipsMeasurements, 2, 2, S),
    spec("ST_MaxDistance", RelationshipsMeasurements, 2, 2, N),
    spec("ST_OrderingEquals", RelationshipsMeasurements, 2, 2, B),
    spec("ST_Overlaps", RelationshipsMeasurements, 2, 2, B),
    spec("ST_Perimeter", RelationshipsMeasurements, 1, 2, N),
    spec("ST_PointOnSurface", RelationshipsMeasurements, 1, 1, S),
    spec("ST_Project", RelationshipsMeasurements, 3, 3, S),
    spec("ST_Relate", RelationshipsMeasurements, 2, 3, S),
    spec("ST_ShortestLine", RelationshipsMeasurements, 2, 2, S),
    spec("ST_Touches", RelationshipsMeasurements, 2, 2, B),
    spec("ST_Within", RelationshipsMeasurements, 2, 2, B),
    spec("ST_AddMeasure", Processing, 3, 3, S),
    spec("ST_Buffer", Processing, 2, 3, S),
    spec("ST_BuildArea", Processing, 1, 1, S),
    spec("ST_ChaikinSmoothing", Processing, 1, 3, S),
    spec("ST_ClipByBox2D", Processing, 2, 2, S),
    spec("ST_ConcaveHull", Processing, 2, 3, S),
    spec("ST_ConvexHull", Processing, 1, 1, S),
    spec("ST_CurveToLine", Processing, 1, 4, S),
    spec("ST_DelaunayTriangles", Processing, 1, 3, S),
    spec("ST_Difference", Processing, 2, 3, S),
    spec("ST_GeneratePoints", Processing, 2, 3, S),
    spec("ST_Intersection", Processing, 2, 3, S),
    spec("ST_LineInterpolatePoint", Processing, 2, 2, S),
    spec("ST_LineLocatePoint", Processing, 2, 2, N),
    spec("ST_LineSubstring", Processing, 3, 3, S),
    spec("ST_LineToCurve", Processing, 1, 1, S),
    spec("ST_LocateAlong", Processing, 2, 3, S),
    spec("ST_LocateBetween", Processing, 3, 4, S),
    spec("ST_MakeValid", Processing, 1, 2, S),
    spec("ST_MemUnion", Processing, 1, 1, S),
    spec("ST_MinimumBoundingCircle", Processing, 1, 2, S),
    spec("ST_Node", Processing, 1, 1, S),
    spec("ST_OffsetCurve", Processing, 2, 3, S),
    spec("ST_Polygonize", Processing, 1, 1, S),
    spec("ST_RemoveRepeatedPoints", Processing, 1, 2, S),
    spec("ST_SharedPaths", Processing, 2, 2, S),
    spec("ST_ShiftLongitude", Processing, 1, 1, S),
    spec("ST_Simplify", Processing, 2, 3, S),
    spec("ST_SimplifyPreserveTopology", Processing, 2, 2, S),
    spec("ST_Split", Processing, 2, 2, S),
    spec("ST_SymDifference", Processing, 2, 3, S),
    spec("ST_UnaryUnion", Processing, 1, 2, S),
    spec("ST_Union", Processing, 1, 3, S),
    spec("ST_VoronoiPolygons", Processing, 1, 3, S),
    spec("ST_3DExtent", Miscellaneous, 1, 1, S),
    spec("ST_EstimatedExtent", Miscellaneous, 2, 4, S),
    spec("ST_Expand", Miscellaneous, 2, 5, S),
    spec("ST_Extent", Miscellaneous, 1, 1, S),
    spec("ST_MemSize", Miscellaneous, 1, 1, N),
    spec("PostGIS_Full_Version", Miscellaneous, 0, 0, S),
    spec("PostGIS_Lib_Version", Miscellaneous, 0, 0, S),
    spec("PostGIS_Version", Miscellaneous, 0, 0, S),
];

static BY_NAME: Lazy<HashMap<String, &'static FunctionSpec>> = Lazy::new(|| {
    SPATIAL_FUNCTIONS
        .iter()
        .map(|f| (f.name.to_ascii_uppercase(), f))
        .collect()
});

/// Case-insensitive lookup
pub fn lookup(name: &str) -> Option<&'static FunctionSpec> {
    BY_NAME.get(&name.trim().to_ascii_uppercase()).copied()
}

/// Functions of one category, in catalog order
pub fn by_category(category: FunctionCategory) -> impl Iterator<Item = &'static FunctionSpec> {
    SPATIAL_FUNCTIONS.iter().filter(move |f| f.category == category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<String> = SPATIAL_FUNCTIONS
            .iter()
            .map(|f| f.name.to_ascii_uppercase())
            .collect();
        assert_eq!(names.len(), SPATIAL_FUNCTIONS.len());
    }

    #[test]
    fn test_arity_bounds_are_ordered() {
        for f in SPATIAL_FUNCTIONS {
            assert!(f.required_arguments <= f.total_arguments, "{}", f.name);
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let f = lookup("st_dfullywithin").unwrap();
        assert_eq!(f.name, "ST_DFullyWithin");
        assert_eq!((f.required_arguments, f.total_arguments), (3, 3));
        assert_eq!(f.return_type, ReturnType::Boolean);

        let f = lookup("ST_INTERIORRINGN").unwrap();
        assert_eq!(f.name, "ST_InteriorRingN");
        assert!(f.accepts(2));
        assert!(!f.accepts(1));

        assert!(lookup("ST_Teleport").is_none());
    }

    #[test]
    fn test_by_category() {
        assert!(by_category(FunctionCategory::Outputs).any(|f| f.name == "ST_AsEWKT"));
        assert!(by_category(FunctionCategory::Types).all(|f| f.total_arguments == 1));
    }
}
