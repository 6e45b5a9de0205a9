//! In-memory stand-in for the PostGIS metadata catalog.
//!
//! Applies generated DDL the way PostGIS would record it: `AddGeometryColumn`
//! registers a `geometry_columns` row, inline `geography(...)` columns appear in
//! `geography_columns`, `UpdateGeometrySRID` rewrites the SRID and GiST index
//! statements maintain the spatial index list.

#![allow(dead_code)]

use lifeguard_postgis::schema::{CatalogColumnRow, CatalogIndexRow, SpatialCatalog, TableRef};
use lifeguard_postgis::spatial::TypeFamily;
use lifeguard_postgis::SpatialError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::cell::RefCell;
use std::collections::HashMap;

static ADD_GEOMETRY_COLUMN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^SELECT AddGeometryColumn\((?:'(\w+)',)?'(\w+)','(\w+)',(-?\d+),'(\w+)',(\d)\)$").unwrap()
});
static UPDATE_SRID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^SELECT UpdateGeometrySRID\((?:'(\w+)',)?'(\w+)','(\w+)', (-?\d+)\)$").unwrap()
});
static CREATE_TABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^CREATE TABLE (?:"(\w+)"\.)?"(\w+)""#).unwrap());
static INLINE_GEOGRAPHY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""(\w+)" geography\((\w+)(?:,(\d+))?\)"#).unwrap());
static SPATIAL_INDEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^CREATE INDEX (\w+) ON (?:(\w+)\.)?(\w+) USING GIST \(([\w, ]+)\)$").unwrap()
});
static DROP_INDEX: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^DROP INDEX (?:"\w+"\.)?"(\w+)""#).unwrap());
static RENAME_TABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^ALTER TABLE (?:"\w+"\.)?"(\w+)" RENAME TO "(\w+)""#).unwrap());

#[derive(Default)]
struct State {
    geometry: HashMap<String, Vec<CatalogColumnRow>>,
    geography: HashMap<String, Vec<CatalogColumnRow>>,
    indexes: HashMap<String, Vec<CatalogIndexRow>>,
}

#[derive(Default)]
pub struct SimulatedCatalog {
    id: u64,
    state: RefCell<State>,
    queries: RefCell<usize>,
}

fn coord_dimension(subtype: &str) -> i32 {
    let upper = subtype.to_ascii_uppercase();
    if upper.ends_with("ZM") {
        4
    } else if upper.ends_with('Z') || upper.ends_with('M') {
        3
    } else {
        2
    }
}

impl SimulatedCatalog {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn queries(&self) -> usize {
        *self.queries.borrow()
    }

    /// Record the catalog effects of each statement; other statements are ignored.
    pub fn apply_all(&self, statements: &[String]) {
        for sql in statements {
            self.apply(sql);
        }
    }

    pub fn apply(&self, sql: &str) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;

        if let Some(caps) = ADD_GEOMETRY_COLUMN.captures(sql) {
            state.geometry.entry(caps[2].to_string()).or_default().push(CatalogColumnRow {
                column: caps[3].to_string(),
                type_name: Some(caps[5].to_string()),
                coord_dimension: caps[6].parse().ok(),
                srid: caps[4].parse().ok(),
            });
        } else if let Some(caps) = UPDATE_SRID.captures(sql) {
            if let Some(rows) = state.geometry.get_mut(&caps[2]) {
                for row in rows.iter_mut().filter(|r| r.column == caps[3]) {
                    row.srid = caps[4].parse().ok();
                }
            }
        } else if let Some(caps) = CREATE_TABLE.captures(sql) {
            let table = caps[2].to_string();
            for column in INLINE_GEOGRAPHY.captures_iter(sql) {
                state.geography.entry(table.clone()).or_default().push(CatalogColumnRow {
                    column: column[1].to_string(),
                    type_name: Some(column[2].to_string()),
                    coord_dimension: Some(coord_dimension(&column[2])),
                    srid: Some(column.get(3).map_or(0, |m| m.as_str().parse().unwrap_or(0))),
                });
            }
        } else if let Some(caps) = SPATIAL_INDEX.captures(sql) {
            state.indexes.entry(caps[3].to_string()).or_default().push(CatalogIndexRow {
                name: caps[1].to_string(),
                columns: caps[4].split(", ").map(str::to_string).collect(),
                unique: false,
                primary: false,
            });
        } else if let Some(caps) = DROP_INDEX.captures(sql) {
            for rows in state.indexes.values_mut() {
                rows.retain(|r| r.name != caps[1]);
            }
        } else if let Some(caps) = RENAME_TABLE.captures(sql) {
            let (from, to) = (caps[1].to_string(), caps[2].to_string());
            for map in [&mut state.geometry, &mut state.geography] {
                if let Some(rows) = map.remove(&from) {
                    map.insert(to.clone(), rows);
                }
            }
            if let Some(rows) = state.indexes.remove(&from) {
                state.indexes.insert(to, rows);
            }
        }
    }
}

impl SpatialCatalog for SimulatedCatalog {
    fn connection_id(&self) -> u64 {
        self.id
    }

    fn spatial_column_rows(
        &self,
        family: TypeFamily,
        table: &TableRef,
        column: Option<&str>,
    ) -> Result<Vec<CatalogColumnRow>, SpatialError> {
        *self.queries.borrow_mut() += 1;
        let state = self.state.borrow();
        let map = match family {
            TypeFamily::Geometry => &state.geometry,
            TypeFamily::Geography => &state.geography,
        };
        Ok(map
            .get(&table.name)
            .map(|rows| {
                rows.iter()
                    .filter(|r| column.map_or(true, |c| r.column == c))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn spatial_index_rows(&self, table: &TableRef) -> Result<Vec<CatalogIndexRow>, SpatialError> {
        *self.queries.borrow_mut() += 1;
        Ok(self
            .state
            .borrow()
            .indexes
            .get(&table.name)
            .cloned()
            .unwrap_or_default())
    }
}
