//! Engine module: CLI plumbing, hashing, catalog storage and path helpers

pub mod arg_parser;
pub mod cli;
pub mod db_ops;
pub mod handlers;
pub mod hashing;
pub mod progress;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::{Cli, Commands, GlobalArgs};
pub use cli::handle_run;
pub use db_ops::{CatalogStore, open_db, open_db_in_memory};
pub use hashing::{hash_file, short_tag};
pub use tools::{canonicalize_existing, glob_match, path_to_db_string, should_include_in_walk};
