//! Engine module: CLI surface, progress display, path filters

pub mod arg_parser;
pub mod cli;
pub mod progress;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use cli::{build_opts, handle_run};
pub use tools::{companion_audio_name, glob_match, is_os_hidden_file, path_relative_to};
