//! The `year_built` tile attribute.

pub const YEAR_ATTRIBUTE: &str = "year_built";

/// Value written for buildings without a usable construction year.
pub const UNKNOWN_YEAR: i32 = 0;
