//! Command implementations, independent of argument parsing and printing.

use crate::table_file::load_table;
use lifeguard_postgis::functions::{FunctionSpec, SPATIAL_FUNCTIONS};
use lifeguard_postgis::schema::{AlterTableSqlGenerator, CreateTableSqlGenerator, TableDiff};
use lifeguard_postgis::{LifeError, LifeExecutor, PostgresPlatform, SpatialConfig};
use std::path::Path;

/// Statements creating the table defined in `file`.
pub fn create_table(file: &Path, config: &SpatialConfig) -> anyhow::Result<Vec<String>> {
    let table = load_table(file)?;
    let sql = CreateTableSqlGenerator::new(&PostgresPlatform, config).generate_table(&table)?;
    Ok(sql)
}

/// Statements migrating the table defined in `from` to the one in `to`.
pub fn diff(from: &Path, to: &Path, config: &SpatialConfig) -> anyhow::Result<Vec<String>> {
    let from = load_table(from)?;
    let to = load_table(to)?;

    let diff = TableDiff::between(&from, &to, config)?;
    if diff.is_empty() {
        log::info!("Table {} is up to date", from.name);
        return Ok(Vec::new());
    }
    let sql = AlterTableSqlGenerator::new(&PostgresPlatform, config).generate(diff)?;
    Ok(sql)
}

/// Catalog functions whose name contains `filter`, case-insensitively.
pub fn functions(filter: Option<&str>) -> Vec<&'static FunctionSpec> {
    let filter = filter.map(str::to_ascii_lowercase);
    SPATIAL_FUNCTIONS
        .iter()
        .filter(|f| {
            filter
                .as_deref()
                .map_or(true, |needle| f.name.to_ascii_lowercase().contains(needle))
        })
        .collect()
}

/// Execute statements in order inside one transaction.
///
/// The first failure rolls the whole sequence back.
pub fn apply(executor: &dyn LifeExecutor, sql: &[String]) -> Result<usize, LifeError> {
    executor.execute("BEGIN", &[])?;

    for (i, statement) in sql.iter().enumerate() {
        log::debug!("Executing statement {}/{}: {}", i + 1, sql.len(), statement);
        if let Err(e) = executor.execute(statement, &[]) {
            log::error!("Statement {} failed, rolling back: {}", i + 1, statement);
            if let Err(rollback) = executor.execute("ROLLBACK", &[]) {
                log::error!("Rollback failed: {}", rollback);
            }
            return Err(e);
        }
    }

    executor.execute("COMMIT", &[])?;
    log::info!("Applied {} statement(s)", sql.len());
    Ok(sql.len())
}
