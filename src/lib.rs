//! # Lifeguard PostGIS
//!
//! PostGIS spatial columns, spatial indexes and spatial SQL functions for
//! Lifeguard's PostgreSQL schema tooling.
//!
//! - [`spatial`]: the spatial column value model (`geometry(PointZ,4326)`)
//! - [`schema`]: `CREATE TABLE` / `ALTER TABLE` generation and catalog introspection
//! - [`functions`]: the PostGIS function catalog and call adapter
//!
//! DDL generation is pure. Only [`schema::SpatialSchemaManager`] talks to the
//! database, through a [`LifeExecutor`].
//!
//! See [README on GitHub](https://github.com/microscaler/lifeguard) for the wider project.

pub mod config;
pub mod connection;
pub mod error;
pub mod executor;
pub mod functions;
pub mod schema;
pub mod spatial;

pub use config::SpatialConfig;
pub use connection::connect;
pub use error::SpatialError;
pub use executor::{LifeError, LifeExecutor, MayPostgresExecutor};
pub use schema::PostgresPlatform;
