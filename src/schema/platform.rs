//! Generic (non-spatial) DDL.
//!
//! The spatial generators never emit ordinary DDL themselves: they prepare a
//! spatial-free view of the table or diff and hand it to a [`Platform`].
//! [`PostgresPlatform`] renders it with sea-query's `PostgresQueryBuilder`.

use super::column::{Column, ForeignKey};
use super::diff::{ColumnDiff, ColumnProperty, TableDiff};
use super::index::IndexDescriptor;
use super::{quote_ident, quote_literal, TableRef};
use crate::error::{Result, SpatialError};
use sea_query::{
    Alias, ColumnDef, Expr, ForeignKey as ForeignKeyStatement, ForeignKeyAction, Index, IntoIden,
    PostgresQueryBuilder, SchemaName, Table, TableName,
};

/// Renders ordinary DDL statements.
///
/// Implementors provide the single-statement primitives; [`Platform::alter_table_sql`]
/// sequences them for a whole diff.
pub trait Platform {
    /// `CREATE TABLE` with inline primary key and foreign keys.
    ///
    /// `columns` must already be normalized (no spatial options).
    fn create_table_sql(
        &self,
        table: &TableRef,
        columns: &[Column],
        primary_key: &[String],
        foreign_keys: &[ForeignKey],
    ) -> Result<String>;

    fn create_index_sql(&self, index: &IndexDescriptor, table: &TableRef) -> String;

    fn drop_index_sql(&self, index: &IndexDescriptor, table: &TableRef) -> String;

    fn add_column_sql(&self, table: &TableRef, column: &Column) -> String;

    fn drop_column_sql(&self, table: &TableRef, column: &str) -> String;

    /// Type, nullability and default changes of one column, one statement each
    fn alter_column_sql(&self, table: &TableRef, change: &ColumnDiff) -> Vec<String>;

    fn rename_column_sql(&self, table: &TableRef, from: &str, to: &str) -> String;

    /// `COMMENT ON COLUMN`; `None` clears the comment
    fn column_comment_sql(&self, table: &TableRef, column: &str, comment: Option<&str>) -> String;

    fn rename_table_sql(&self, table: &TableRef, new_name: &str) -> String;

    /// Statements for a whole diff.
    ///
    /// Order: index drops, column changes and renames on the old table name, comment changes,
    /// rename, then index creation on the effective name. `geometry_type`
    /// and `srid` changes are ignored here.
    fn alter_table_sql(&self, diff: &TableDiff) -> Result<Vec<String>> {
        let old = TableRef::parse(&diff.name);
        let effective = match &diff.new_name {
            Some(new_name) => TableRef {
                schema: old.schema.clone(),
                name: TableRef::parse(new_name).name,
            },
            None => old.clone(),
        };

        let mut sql = Vec::new();

        for index in diff.removed_indexes.iter().chain(&diff.changed_indexes) {
            sql.push(self.drop_index_sql(index, &old));
        }

        for column in &diff.removed_columns {
            sql.push(self.drop_column_sql(&old, &column.name));
        }
        for column in &diff.added_columns {
            sql.push(self.add_column_sql(&old, column));
        }
        for change in &diff.changed_columns {
            sql.extend(self.alter_column_sql(&old, change));
            if change.old_column_name != change.column.name {
                sql.push(self.rename_column_sql(&old, &change.old_column_name, &change.column.name));
            }
        }

        for column in &diff.added_columns {
            if let Some(comment) = &column.comment {
                sql.push(self.column_comment_sql(&old, &column.name, Some(comment)));
            }
        }
        for change in &diff.changed_columns {
            if change.has_changed(ColumnProperty::Comment) {
                sql.push(self.column_comment_sql(
                    &old,
                    &change.column.name,
                    change.column.comment.as_deref(),
                ));
            }
        }

        if diff.new_name.is_some() {
            sql.push(self.rename_table_sql(&old, &effective.name));
        }

        for index in diff.added_indexes.iter().chain(&diff.changed_indexes) {
            sql.push(self.create_index_sql(index, &effective));
        }

        Ok(sql)
    }
}

/// PostgreSQL rendering through sea-query.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresPlatform;

/// Build a sea-query table reference, schema-qualified when needed
fn table_name(table: &TableRef) -> TableName {
    match &table.schema {
        Some(schema) => TableName(Some(SchemaName::from(schema.clone())), table.name.clone().into_iden()),
        None => TableName(None, table.name.clone().into_iden()),
    }
}

/// Map a type alias to its PostgreSQL spelling.
///
/// Unknown types (including `varchar(255)` and spatial constraints) pass
/// through verbatim.
pub fn postgres_type_name(type_name: &str) -> String {
    let trimmed = type_name.trim();
    let mapped = match trimmed.to_lowercase().as_str() {
        "integer" | "i32" | "int" | "int4" => "integer",
        "bigint" | "i64" | "big_integer" | "int8" => "bigint",
        "smallint" | "i16" | "int2" => "smallint",
        "string" | "text" => "text",
        "boolean" | "bool" => "boolean",
        "float" | "f32" | "real" | "float4" => "real",
        "double" | "f64" | "double_precision" | "float8" => "double precision",
        "json" => "json",
        "jsonb" => "jsonb",
        "timestamp" | "datetime" => "timestamp",
        "timestamptz" => "timestamptz",
        "date" => "date",
        "time" => "time",
        "uuid" => "uuid",
        "binary" | "bytes" | "bytea" | "blob" => "bytea",
        "serial" => "serial",
        "bigserial" => "bigserial",
        _ => return trimmed.to_string(),
    };
    mapped.to_string()
}

fn column_def(column: &Column) -> ColumnDef {
    let mut def = ColumnDef::new(column.name.clone());
    def.custom(Alias::new(postgres_type_name(&column.type_name)));
    if column.nullable {
        def.null();
    } else {
        def.not_null();
    }
    if let Some(default) = &column.default {
        def.default(Expr::cust(default.clone()));
    }
    def
}

fn foreign_key_action(action: &str) -> Result<ForeignKeyAction> {
    match action.trim().to_uppercase().as_str() {
        "CASCADE" => Ok(ForeignKeyAction::Cascade),
        "SET NULL" => Ok(ForeignKeyAction::SetNull),
        "SET DEFAULT" => Ok(ForeignKeyAction::SetDefault),
        "RESTRICT" => Ok(ForeignKeyAction::Restrict),
        "NO ACTION" => Ok(ForeignKeyAction::NoAction),
        other => Err(SpatialError::Configuration(format!(
            "Unknown foreign key action \"{other}\""
        ))),
    }
}

impl Platform for PostgresPlatform {
    fn create_table_sql(
        &self,
        table: &TableRef,
        columns: &[Column],
        primary_key: &[String],
        foreign_keys: &[ForeignKey],
    ) -> Result<String> {
        let mut stmt = Table::create();
        stmt.table(table_name(table));

        for column in columns {
            let mut def = column_def(column);
            stmt.col(&mut def);
        }

        if !primary_key.is_empty() {
            let mut pk = Index::create();
            for name in primary_key {
                pk.col(Alias::new(name));
            }
            stmt.primary_key(&mut pk);
        }

        for fk in foreign_keys {
            let mut fk_stmt = ForeignKeyStatement::create();
            fk_stmt
                .name(fk.constraint_name(&table.name))
                .from_tbl(table_name(table))
                .to_tbl(table_name(&TableRef::parse(&fk.foreign_table)));
            for name in &fk.columns {
                fk_stmt.from_col(Alias::new(name));
            }
            for name in &fk.foreign_columns {
                fk_stmt.to_col(Alias::new(name));
            }
            if let Some(action) = &fk.on_delete {
                fk_stmt.on_delete(foreign_key_action(action)?);
            }
            if let Some(action) = &fk.on_update {
                fk_stmt.on_update(foreign_key_action(action)?);
            }
            stmt.foreign_key(&mut fk_stmt);
        }

        Ok(stmt.build(PostgresQueryBuilder))
    }

    fn create_index_sql(&self, index: &IndexDescriptor, table: &TableRef) -> String {
        let mut stmt = Index::create();
        stmt.name(index.name.clone()).table(table_name(table));
        for name in &index.columns {
            stmt.col(Alias::new(name));
        }
        if index.unique {
            stmt.unique();
        }

        let mut sql = stmt.build(PostgresQueryBuilder);
        if let Some(predicate) = &index.partial_where {
            sql.push_str(" WHERE ");
            sql.push_str(predicate);
        }
        sql
    }

    fn drop_index_sql(&self, index: &IndexDescriptor, table: &TableRef) -> String {
        Index::drop()
            .name(index.name.clone())
            .table(table_name(table))
            .to_owned()
            .build(PostgresQueryBuilder)
    }

    fn add_column_sql(&self, table: &TableRef, column: &Column) -> String {
        Table::alter()
            .table(table_name(table))
            .add_column(column_def(column))
            .to_owned()
            .build(PostgresQueryBuilder)
    }

    fn drop_column_sql(&self, table: &TableRef, column: &str) -> String {
        Table::alter()
            .table(table_name(table))
            .drop_column(Alias::new(column))
            .to_owned()
            .build(PostgresQueryBuilder)
    }

    fn alter_column_sql(&self, table: &TableRef, change: &ColumnDiff) -> Vec<String> {
        let prefix = format!(
            "ALTER TABLE {} ALTER COLUMN {}",
            table.quoted(),
            quote_ident(&change.old_column_name)
        );
        let column = &change.column;
        let mut sql = Vec::new();

        if change.has_changed(ColumnProperty::Type) {
            sql.push(format!("{prefix} TYPE {}", postgres_type_name(&column.type_name)));
        }
        if change.has_changed(ColumnProperty::NotNull) {
            if column.nullable {
                sql.push(format!("{prefix} DROP NOT NULL"));
            } else {
                sql.push(format!("{prefix} SET NOT NULL"));
            }
        }
        if change.has_changed(ColumnProperty::Default) {
            match &column.default {
                Some(default) => sql.push(format!("{prefix} SET DEFAULT {default}")),
                None => sql.push(format!("{prefix} DROP DEFAULT")),
            }
        }
        sql
    }

    fn rename_column_sql(&self, table: &TableRef, from: &str, to: &str) -> String {
        Table::alter()
            .table(table_name(table))
            .rename_column(Alias::new(from), Alias::new(to))
            .to_owned()
            .build(PostgresQueryBuilder)
    }

    fn column_comment_sql(&self, table: &TableRef, column: &str, comment: Option<&str>) -> String {
        format!(
            "COMMENT ON COLUMN {}.{} IS {}",
            table.quoted(),
            quote_ident(column),
            comment.map_or_else(|| "NULL".to_string(), quote_literal)
        )
    }

    fn rename_table_sql(&self, table: &TableRef, new_name: &str) -> String {
        Table::rename()
            .table(table_name(table), TableName(None, new_name.to_string().into_iden()))
            .to_owned()
            .build(PostgresQueryBuilder)
    }
}
