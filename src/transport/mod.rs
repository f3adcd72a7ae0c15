/// Local filesystem listing and JSON persistence helpers.
pub mod fs;
