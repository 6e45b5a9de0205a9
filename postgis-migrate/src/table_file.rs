//! TOML table definition files.
//!
//! A file describes one table:
//!
//! ```toml
//! name = "gis.parcels"
//! primary_key = ["id"]
//! spatial_indexes = ["idx_parcels_geom"]
//!
//! [[columns]]
//! name = "id"
//! type = "integer"
//!
//! [[columns]]
//! name = "geom"
//! type = "geometry"
//! geometry_type = "POLYGON"
//! srid = 4326
//! nullable = true
//!
//! [[indexes]]
//! name = "idx_parcels_geom"
//! columns = ["geom"]
//! ```

use lifeguard_postgis::schema::Table;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableFileError {
    #[error("Table definition file does not exist: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid table definition in {path}: {message}")]
    Invalid { path: PathBuf, message: String },
}

/// Read and check one table definition.
pub fn load_table(path: &Path) -> Result<Table, TableFileError> {
    if !path.exists() {
        return Err(TableFileError::NotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|source| TableFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = parse_table(&content).map_err(|source| TableFileError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate(&table).map_err(|message| TableFileError::Invalid {
        path: path.to_path_buf(),
        message,
    })?;
    log::debug!("Loaded table {} from {}", table.name, path.display());
    Ok(table)
}

pub fn parse_table(content: &str) -> Result<Table, toml::de::Error> {
    toml::from_str(content)
}

/// Structural checks only; type and SRID errors surface from the generators.
fn validate(table: &Table) -> Result<(), String> {
    if table.name.trim().is_empty() {
        return Err("table name is empty".to_string());
    }

    let mut seen = HashSet::new();
    for column in &table.columns {
        if !seen.insert(column.name.as_str()) {
            return Err(format!("column \"{}\" is declared twice", column.name));
        }
    }

    let mut seen = HashSet::new();
    for index in &table.indexes {
        if !seen.insert(index.name.as_str()) {
            return Err(format!("index \"{}\" is declared twice", index.name));
        }
        if index.columns.is_empty() {
            return Err(format!("index \"{}\" has no columns", index.name));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_spatial_options() {
        let table = parse_table(
            r#"
            name = "parcels"

            [[columns]]
            name = "geom"
            type = "geography"
            geometry_type = "PointZ"
            "#,
        )
        .unwrap();

        let column = table.get_column("geom").unwrap();
        assert_eq!(column.geometry_type.as_deref(), Some("PointZ"));
        assert_eq!(column.srid, None);
        assert!(!column.nullable);
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let table = parse_table(
            r#"
            name = "parcels"

            [[columns]]
            name = "id"
            type = "integer"

            [[columns]]
            name = "id"
            type = "bigint"
            "#,
        )
        .unwrap();
        assert!(validate(&table).unwrap_err().contains("declared twice"));
    }
}
