pub mod commands;
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{RunOptions, expand_path, handle_render, load_visits, run, verbosity_level};
