/// Date parsing and normalization helpers.
pub mod date_helpers;
