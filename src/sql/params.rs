//! Bind values for statements run through the `Any` driver.

use sqlx::any::{Any, AnyArguments};
use sqlx::query::Query;

/// A value bound as a statement parameter. Only the types the pet schema stores.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BindValue {
    Int(i64),
    Text(String),
}

impl From<i64> for BindValue {
    fn from(n: i64) -> Self {
        BindValue::Int(n)
    }
}

impl From<&str> for BindValue {
    fn from(s: &str) -> Self {
        BindValue::Text(s.to_string())
    }
}

impl From<String> for BindValue {
    fn from(s: String) -> Self {
        BindValue::Text(s)
    }
}

/// Bind every parameter in order ($1, $2, ...).
pub fn bind_params<'q>(
    mut query: Query<'q, Any, AnyArguments<'q>>,
    params: &[BindValue],
) -> Query<'q, Any, AnyArguments<'q>> {
    for p in params {
        query = match p {
            BindValue::Int(n) => query.bind(*n),
            BindValue::Text(s) => query.bind(s.clone()),
        };
    }
    query
}
