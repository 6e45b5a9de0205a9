//! Text and JSON rendering of command results.
//!
//! Every renderer returns the full output as a `String`; `main` only prints.

use colored::Colorize;
use lifeguard_postgis::functions::{FunctionSpec, SpatialFunction};
use lifeguard_postgis::schema::IndexDescriptor;
use lifeguard_postgis::spatial::SpatialColumnDescriptor;
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// One statement per line, `;`-terminated, ready to pipe into `psql`.
pub fn statements(sql: &[String], format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(sql.iter().map(|s| format!("{s};\n")).collect()),
        OutputFormat::Json => serde_json::to_string_pretty(&json!({ "statements": sql })),
    }
}

/// Functions grouped under their category title, in catalog order.
pub fn functions(specs: &[&FunctionSpec], format: OutputFormat) -> Result<String, serde_json::Error> {
    if format == OutputFormat::Json {
        return serde_json::to_string_pretty(specs);
    }

    let mut out = String::new();
    let mut current = None;
    for spec in specs {
        if current != Some(spec.category) {
            current = Some(spec.category);
            let _ = writeln!(out, "\n{}", spec.category.title().bold());
        }
        let arity = if spec.required_arguments == spec.total_arguments {
            spec.required_arguments.to_string()
        } else {
            format!("{}..{}", spec.required_arguments, spec.total_arguments)
        };
        let _ = writeln!(
            out,
            "  {:<28} args {:<6} returns {:?}",
            spec.name.green(),
            arity,
            spec.return_type
        );
    }
    let _ = writeln!(out, "\n{} function(s)", specs.len());
    Ok(out)
}

pub fn call(function: &SpatialFunction, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(format!("{}\n", function.sql())),
        OutputFormat::Json => serde_json::to_string_pretty(&json!({
            "function": function.spec(),
            "arguments": function.arguments(),
            "sql": function.sql(),
        })),
    }
}

/// Spatial columns and indexes of one table.
pub fn introspection(
    table: &str,
    columns: &[(String, SpatialColumnDescriptor)],
    indexes: &BTreeMap<String, IndexDescriptor>,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    if format == OutputFormat::Json {
        let columns: Vec<_> = columns
            .iter()
            .map(|(name, descriptor)| {
                json!({
                    "name": name,
                    "type": descriptor.type_constraint(),
                    "descriptor": descriptor,
                })
            })
            .collect();
        let indexes: Vec<_> = indexes.values().collect();
        return serde_json::to_string_pretty(&json!({
            "table": table,
            "columns": columns,
            "indexes": indexes,
        }));
    }

    let mut out = String::new();
    let _ = writeln!(out, "{}", format!("Spatial columns of {table}").bold());
    if columns.is_empty() {
        let _ = writeln!(out, "  {}", "none".yellow());
    }
    for (name, descriptor) in columns {
        let _ = writeln!(out, "  {:<24} {}", name.green(), descriptor);
    }

    let _ = writeln!(out, "{}", format!("Spatial indexes of {table}").bold());
    if indexes.is_empty() {
        let _ = writeln!(out, "  {}", "none".yellow());
    }
    for index in indexes.values() {
        let _ = writeln!(out, "  {:<24} ({})", index.name.green(), index.columns.join(", "));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifeguard_postgis::functions::lookup;

    #[test]
    fn test_text_statements_are_terminated() {
        let sql = vec!["CREATE TABLE t ()".to_string(), "SELECT 1".to_string()];
        assert_eq!(
            statements(&sql, OutputFormat::Text).unwrap(),
            "CREATE TABLE t ();\nSELECT 1;\n"
        );
    }

    #[test]
    fn test_json_function_list() {
        let specs = vec![lookup("ST_DWithin").unwrap()];
        let value: serde_json::Value =
            serde_json::from_str(&functions(&specs, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(value[0]["name"], "ST_DWithin");
        assert_eq!(value[0]["return_type"], "boolean");
    }
}
