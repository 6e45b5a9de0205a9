//! Error types for spatial schema operations
//!
//! Every generator in this crate either returns a complete statement sequence
//! or one of these errors; nothing is emitted alongside a failure.

use crate::executor::LifeError;
use std::fmt;

/// Spatial schema errors
#[derive(Debug)]
pub enum SpatialError {
    /// Invalid input supplied by the caller (unknown type family, bad SRID,
    /// key constraints over late-registered columns, unknown functions).
    Configuration(String),
    /// A column change that can never be migrated automatically
    UnsupportedMigration {
        /// Attribute that changed (`type` or `geometry_type`)
        property: &'static str,
        table: String,
        column: String,
        /// Previous value, when known
        from: Option<String>,
        to: String,
    },
    /// A catalog row is missing fields or carries out-of-range values
    Metadata(String),
    /// The schema manager has no connection bound
    NotBound,
    /// The schema manager is bound to another connection
    AlreadyBound { bound: u64, requested: u64 },
    /// Catalog query failed
    Database(LifeError),
}

impl fmt::Display for SpatialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpatialError::Configuration(msg) => write!(f, "Spatial configuration error: {msg}"),
            SpatialError::UnsupportedMigration {
                property,
                table,
                column,
                from,
                to,
            } => {
                write!(
                    f,
                    "The {} of a spatial column cannot be changed (Requested changing type from \"{}\" to \"{}\" for column \"{}\" in table \"{}\")",
                    property,
                    from.as_deref().unwrap_or("N/A"),
                    to,
                    column,
                    table
                )
            }
            SpatialError::Metadata(msg) => write!(f, "Spatial metadata error: {msg}"),
            SpatialError::NotBound => write!(
                f,
                "The spatial schema manager is not bound to a connection. Call bind() first."
            ),
            SpatialError::AlreadyBound { bound, requested } => write!(
                f,
                "The spatial schema manager is bound to connection #{bound} and cannot be bound to connection #{requested}.\n\
                 Register one schema manager per connection, or call reset() before rebinding."
            ),
            SpatialError::Database(e) => write!(f, "Database error: {e}"),
        }
    }
}

impl std::error::Error for SpatialError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SpatialError::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LifeError> for SpatialError {
    fn from(error: LifeError) -> Self {
        SpatialError::Database(error)
    }
}

pub type Result<T> = std::result::Result<T, SpatialError>;
