//! Execution modes
//!
//! - Server mode (HTTP server, default)
//! - One-shot commands (`config generate`, `hash-password`)

pub mod cli;
pub mod server;

pub use cli::{run_config_command, run_hash_password};
pub use server::run_server;
