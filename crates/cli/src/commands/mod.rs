//! CLI command implementations

pub mod codes;
pub mod interactive;
pub mod predict;
