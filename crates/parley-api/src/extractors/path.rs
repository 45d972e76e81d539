//! Path parameter parsing

use parley_core::Snowflake;

use crate::response::ApiError;

/// Parse a snowflake path segment, naming the parameter on failure
pub fn parse_snowflake(raw: &str, name: &str) -> Result<Snowflake, ApiError> {
    raw.parse::<Snowflake>()
        .map_err(|_| ApiError::invalid_path(format!("invalid {name} format")))
}
