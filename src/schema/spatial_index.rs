use super::index::IndexDescriptor;
use super::TableRef;
use crate::config::SpatialConfig;

/// Renders spatial index DDL with the configured access method.
pub struct SpatialIndexSqlGenerator<'a> {
    config: &'a SpatialConfig,
}

impl<'a> SpatialIndexSqlGenerator<'a> {
    pub fn new(config: &'a SpatialConfig) -> Self {
        Self { config }
    }

    /// `CREATE INDEX <name> ON <table> USING GIST (<columns>)`
    pub fn create_index_sql(&self, index: &IndexDescriptor, table: &TableRef) -> String {
        format!(
            "CREATE INDEX {} ON {} USING {} ({})",
            index.name,
            table,
            self.config.spatial_index_method.to_uppercase(),
            index.columns.join(", ")
        )
    }
}
