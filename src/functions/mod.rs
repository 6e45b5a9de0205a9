//! Spatial SQL functions.
//!
//! One adapter, [`SpatialFunction`], covers every function in
//! [`catalog::SPATIAL_FUNCTIONS`]: it validates the argument count against the
//! catalog entry and renders the call with the catalog's spelling.
//!
//! ```rust
//! use lifeguard_postgis::functions::SpatialFunction;
//!
//! let call = SpatialFunction::parse("st_dwithin(p.geom, ST_GeomFromText('POINT(1 1)'), 20)")?;
//! assert_eq!(call.sql(), "ST_DWithin(p.geom, ST_GeomFromText('POINT(1 1)'), 20)");
//! # Ok::<(), lifeguard_postgis::SpatialError>(())
//! ```

pub mod catalog;

pub use catalog::{lookup, FunctionCategory, FunctionSpec, ReturnType, SPATIAL_FUNCTIONS};

use crate::error::{Result, SpatialError};
use sea_query::{Alias, Expr, Func, FunctionCall};
use std::fmt;

/// A validated call of a catalog function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpatialFunction {
    spec: &'static FunctionSpec,
    arguments: Vec<String>,
}

impl SpatialFunction {
    /// Build a call from SQL argument expressions.
    pub fn new<I, S>(name: &str, arguments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = lookup(name).ok_or_else(|| {
            SpatialError::Configuration(format!("Unknown spatial function \"{}\"", name.trim()))
        })?;
        let arguments: Vec<String> = arguments.into_iter().map(Into::into).collect();

        if !spec.accepts(arguments.len()) {
            let expected = if spec.required_arguments == spec.total_arguments {
                spec.required_arguments.to_string()
            } else {
                format!("{} to {}", spec.required_arguments, spec.total_arguments)
            };
            return Err(SpatialError::Configuration(format!(
                "{} expects {expected} argument(s), got {}",
                spec.name,
                arguments.len()
            )));
        }

        Ok(Self { spec, arguments })
    }

    /// Parse `NAME(arg, ...)`.
    ///
    /// Arguments are split on top-level commas; nested calls and quoted
    /// strings are kept whole.
    pub fn parse(expression: &str) -> Result<Self> {
        let expression = expression.trim();
        let malformed =
            || SpatialError::Configuration(format!("Malformed function call \"{expression}\""));

        let open = expression.find('(').ok_or_else(malformed)?;
        let body = expression[open + 1..].strip_suffix(')').ok_or_else(malformed)?;
        let name = expression[..open].trim();
        if name.is_empty() {
            return Err(malformed());
        }

        let arguments = split_arguments(body).ok_or_else(malformed)?;
        Self::new(name, arguments)
    }

    pub fn spec(&self) -> &'static FunctionSpec {
        self.spec
    }

    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// `NAME(arg1, arg2)`
    pub fn sql(&self) -> String {
        format!("{}({})", self.spec.name, self.arguments.join(", "))
    }

    /// The call as a sea-query function expression, for use in query builders.
    pub fn to_function_call(&self) -> FunctionCall {
        Func::cust(Alias::new(self.spec.name)).args(self.arguments.iter().map(|a| Expr::cust(a.clone())))
    }
}

impl fmt::Display for SpatialFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql())
    }
}

/// Split a call body on top-level commas. `None` on unbalanced input.
fn split_arguments(body: &str) -> Option<Vec<String>> {
    let mut arguments = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in body.chars() {
        match quote {
            Some(q) => {
                // a doubled quote closes and reopens, which leaves the string intact
                if c == q {
                    quote = None;
                }
                current.push(c);
            }
            None => match c {
                '\'' | '"' => {
                    quote = Some(c);
                    current.push(c);
                }
                '(' => {
                    depth += 1;
                    current.push(c);
                }
                ')' => {
                    depth = depth.checked_sub(1)?;
                    current.push(c);
                }
                ',' if depth == 0 => {
                    arguments.push(current.trim().to_string());
                    current.clear();
                }
                _ => current.push(c),
            },
        }
    }

    if quote.is_some() || depth != 0 {
        return None;
    }
    let last = current.trim();
    if !last.is_empty() || !arguments.is_empty() {
        arguments.push(last.to_string());
    }
    if arguments.iter().any(String::is_empty) {
        return None;
    }
    Some(arguments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_query::{PostgresQueryBuilder, Query};

    #[test]
    fn test_parse_nested_call() {
        let call = SpatialFunction::parse(
            "ST_DFullyWithin(ST_GeomFromText('POINT(1 1)'), ST_GeomFromText('LINESTRING(1 5, 2 7, 1 9, 14 12)'), 20)",
        )
        .unwrap();
        assert_eq!(call.name(), "ST_DFullyWithin");
        assert_eq!(
            call.arguments(),
            [
                "ST_GeomFromText('POINT(1 1)')",
                "ST_GeomFromText('LINESTRING(1 5, 2 7, 1 9, 14 12)')",
                "20"
            ]
        );
    }

    #[test]
    fn test_quoted_commas_and_escaped_quotes() {
        let call = SpatialFunction::parse("ST_GeomFromText('it''s, odd', 4326)").unwrap();
        assert_eq!(call.arguments(), ["'it''s, odd'", "4326"]);
    }

    #[test]
    fn test_canonical_spelling() {
        let call = SpatialFunction::new("st_interiorringn", ["p.geom", "1"]).unwrap();
        assert_eq!(call.sql(), "ST_InteriorRingN(p.geom, 1)");
        assert_eq!(call.to_string(), call.sql());
    }

    #[test]
    fn test_zero_argument_function() {
        let call = SpatialFunction::parse("postgis_version()").unwrap();
        assert_eq!(call.sql(), "PostGIS_Version()");
        assert!(call.arguments().is_empty());
    }

    #[test]
    fn test_arity_is_checked() {
        let err = SpatialFunction::new("ST_InteriorRingN", ["p.geom"]).unwrap_err();
        assert!(matches!(err, SpatialError::Configuration(msg) if msg.contains("expects 2 argument(s), got 1")));

        let err = SpatialFunction::new("ST_Distance", ["a", "b", "c", "d"]).unwrap_err();
        assert!(matches!(err, SpatialError::Configuration(msg) if msg.contains("2 to 3")));
    }

    #[test]
    fn test_rejects_unknown_and_malformed() {
        assert!(SpatialFunction::parse("ST_Teleport(a)").is_err());
        assert!(SpatialFunction::parse("ST_Area(a").is_err());
        assert!(SpatialFunction::parse("ST_Area(f(a)").is_err());
        assert!(SpatialFunction::parse("ST_Distance(a, , b)").is_err());
        assert!(SpatialFunction::parse("(a)").is_err());
    }

    #[test]
    fn test_function_call_in_query_builder() {
        let call = SpatialFunction::new("st_area", ["geom"]).unwrap();
        let (sql, _) = Query::select()
            .expr(call.to_function_call())
            .from("parcels")
            .to_owned()
            .build(PostgresQueryBuilder);
        assert!(sql.contains("ST_Area(geom)"));
    }
}
