//! Lifeguard PostGIS migration library
//!
//! Backs the `lifeguard-postgis-migrate` CLI: table definition loading,
//! command implementations and output rendering.

pub mod commands;
pub mod output;
pub mod table_file;
