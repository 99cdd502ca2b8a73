//! CLI command implementations.

pub mod build;
pub mod cluster;
pub mod color;
pub mod common;
pub mod evaluate;
pub mod generate;
pub mod groups;
pub mod models;
pub mod runs;
pub mod version;
