//! Server-side Lua for the multi-key mutations the Redis backend must apply atomically.

pub mod commands;
pub mod executor;
pub mod scripts;

pub use executor::run_script;
