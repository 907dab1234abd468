//! Configuration for the superxbr command-line tool
//!
//! Provides types and loading for the optional `superxbr.toml` file.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
