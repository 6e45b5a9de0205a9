use super::column::{Column, ForeignKey};
use super::create_table::CreateTableOptions;
use super::index::IndexDescriptor;
use serde::{Deserialize, Serialize};

/// Desired table definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub primary_key: Vec<String>,
    #[serde(default)]
    pub indexes: Vec<IndexDescriptor>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
    /// Names of entries in `indexes` to build with the spatial access method
    #[serde(default)]
    pub spatial_indexes: Vec<String>,
}

impl Table {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn index(mut self, index: IndexDescriptor) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Indexes with the `spatial_indexes` table option applied.
    ///
    /// Names that match no index are ignored.
    pub fn tagged_indexes(&self) -> Vec<IndexDescriptor> {
        for name in &self.spatial_indexes {
            if !self.indexes.iter().any(|i| &i.name == name) {
                log::debug!("Table {}: spatial index option names unknown index {}", self.name, name);
            }
        }

        self.indexes
            .iter()
            .cloned()
            .map(|mut index| {
                if self.spatial_indexes.contains(&index.name) {
                    index.spatial = true;
                }
                index
            })
            .collect()
    }

    pub fn create_options(&self) -> CreateTableOptions {
        CreateTableOptions {
            primary_key: self.primary_key.clone(),
            indexes: self.tagged_indexes(),
            foreign_keys: self.foreign_keys.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spatial_index_option_tags_indexes() {
        let table = Table {
            spatial_indexes: vec!["idx_geom".to_string(), "missing".to_string()],
            ..Table::new("parcels")
        }
        .index(IndexDescriptor::new("idx_geom", ["geom"]))
        .index(IndexDescriptor::new("idx_name", ["name"]));

        let indexes = table.tagged_indexes();
        assert_eq!(indexes.len(), 2);
        assert!(indexes[0].spatial);
        assert!(!indexes[1].spatial);
    }

    #[test]
    fn test_deserialize_from_toml_shape() {
        let json = serde_json::json!({
            "name": "parcels",
            "columns": [
                {"name": "id", "type": "integer"},
                {"name": "geom", "type": "geometry", "geometry_type": "point", "srid": 4326, "nullable": true}
            ],
            "primary_key": ["id"],
            "indexes": [{"name": "idx_parcels_geom", "columns": ["geom"], "spatial": true}]
        });
        let table: Table = serde_json::from_value(json).unwrap();
        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.columns[1].srid, Some(4326));
        assert!(!table.columns[0].nullable);
        assert!(table.indexes[0].spatial);
    }
}
