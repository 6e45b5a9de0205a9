//! Tests for the CLI commands over table definition files

use lifeguard_postgis::{LifeError, LifeExecutor, SpatialConfig};
use lifeguard_postgis_migrate::commands;
use lifeguard_postgis_migrate::table_file::{load_table, TableFileError};
use may_postgres::types::ToSql;
use may_postgres::Row;
use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const PARCELS: &str = r#"
name = "parcels"
primary_key = ["id"]
spatial_indexes = ["idx_parcels_geom"]

[[columns]]
name = "id"
type = "integer"

[[columns]]
name = "geom"
type = "geometry"
geometry_type = "POLYGON"
srid = 4326
nullable = true

[[indexes]]
name = "idx_parcels_geom"
columns = ["geom"]
"#;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_create_table_from_file() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "parcels.toml", PARCELS);

    let sql = commands::create_table(&file, &SpatialConfig::default()).unwrap();
    assert_eq!(sql.len(), 3);
    assert!(sql[0].starts_with("CREATE TABLE \"parcels\""));
    assert_eq!(sql[1], "SELECT AddGeometryColumn('parcels','geom',4326,'POLYGON',2)");
    assert_eq!(sql[2], "CREATE INDEX idx_parcels_geom ON parcels USING GIST (geom)");
}

#[test]
fn test_diff_relabels_srid() {
    let dir = TempDir::new().unwrap();
    let from = write(&dir, "from.toml", PARCELS);
    let to = write(&dir, "to.toml", &PARCELS.replace("srid = 4326", "srid = 3857"));

    let sql = commands::diff(&from, &to, &SpatialConfig::default()).unwrap();
    assert_eq!(sql, ["SELECT UpdateGeometrySRID('parcels','geom', 3857)"]);
}

#[test]
fn test_diff_of_identical_files_is_empty() {
    let dir = TempDir::new().unwrap();
    let from = write(&dir, "from.toml", PARCELS);
    let to = write(&dir, "to.toml", PARCELS);

    assert!(commands::diff(&from, &to, &SpatialConfig::default()).unwrap().is_empty());
}

#[test]
fn test_diff_rejects_subtype_change() {
    let dir = TempDir::new().unwrap();
    let from = write(&dir, "from.toml", PARCELS);
    let to = write(&dir, "to.toml", &PARCELS.replace("\"POLYGON\"", "\"MULTIPOLYGON\""));

    let err = commands::diff(&from, &to, &SpatialConfig::default()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("geometry_type"), "{message}");
    assert!(message.contains("MULTIPOLYGON"), "{message}");
}

#[test]
fn test_load_errors() {
    let dir = TempDir::new().unwrap();

    let missing = dir.path().join("missing.toml");
    assert!(matches!(load_table(&missing), Err(TableFileError::NotFound(_))));

    let broken = write(&dir, "broken.toml", "name = ");
    assert!(matches!(load_table(&broken), Err(TableFileError::Parse { .. })));

    let unnamed = write(&dir, "unnamed.toml", "name = \"\"");
    match load_table(&unnamed) {
        Err(TableFileError::Invalid { message, .. }) => assert!(message.contains("empty")),
        other => panic!("expected invalid definition, got {other:?}"),
    }
}

#[test]
fn test_function_filter() {
    let matches = commands::functions(Some("dwithin"));
    let names: Vec<&str> = matches.iter().map(|f| f.name).collect();
    assert!(names.contains(&"ST_DWithin"));
    assert!(names.iter().all(|n| n.to_ascii_lowercase().contains("dwithin")));

    assert!(commands::functions(None).len() > matches.len());
}

#[derive(Default)]
struct RecordingExecutor {
    executed: RefCell<Vec<String>>,
    fail_on: Option<&'static str>,
}

impl LifeExecutor for RecordingExecutor {
    fn execute(&self, query: &str, _params: &[&dyn ToSql]) -> Result<u64, LifeError> {
        if self.fail_on == Some(query) {
            return Err(LifeError::QueryError(format!("rejected: {query}")));
        }
        self.executed.borrow_mut().push(query.to_string());
        Ok(0)
    }

    fn query_all(&self, _query: &str, _params: &[&dyn ToSql]) -> Result<Vec<Row>, LifeError> {
        Ok(Vec::new())
    }
}

#[test]
fn test_apply_runs_in_one_transaction() {
    let sql = vec!["CREATE TABLE t ()".to_string(), "SELECT 1".to_string()];

    let executor = RecordingExecutor::default();
    assert_eq!(commands::apply(&executor, &sql).unwrap(), 2);
    assert_eq!(
        *executor.executed.borrow(),
        ["BEGIN", "CREATE TABLE t ()", "SELECT 1", "COMMIT"]
    );
}

#[test]
fn test_apply_rolls_back_on_failure() {
    let sql = vec!["CREATE TABLE t ()".to_string(), "SELECT 1".to_string()];

    let failing = RecordingExecutor {
        fail_on: Some("SELECT 1"),
        ..Default::default()
    };
    assert!(commands::apply(&failing, &sql).is_err());
    assert_eq!(*failing.executed.borrow(), ["BEGIN", "CREATE TABLE t ()", "ROLLBACK"]);
}
