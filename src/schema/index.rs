use serde::{Deserialize, Serialize};

/// Index description.
///
/// `spatial` selects the DDL path: spatial indexes are built with the spatial
/// access method and can never be altered in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub spatial: bool,
    /// Partial index predicate (ordinary indexes only)
    #[serde(default)]
    pub partial_where: Option<String>,
}

impl IndexDescriptor {
    pub fn new<N, I, S>(name: N, columns: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            unique: false,
            primary: false,
            spatial: false,
            partial_where: None,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn spatial(mut self) -> Self {
        self.spatial = true;
        self
    }

    pub fn with_where<S: Into<String>>(mut self, predicate: S) -> Self {
        self.partial_where = Some(predicate.into());
        self
    }

    /// Same definition, ignoring the name
    pub fn same_definition(&self, other: &IndexDescriptor) -> bool {
        self.columns == other.columns
            && self.unique == other.unique
            && self.primary == other.primary
            && self.spatial == other.spatial
            && self.partial_where == other.partial_where
    }
}
