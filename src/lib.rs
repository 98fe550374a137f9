//! ReviewHub - curated product review catalog
//!
//! # Architecture
//! - `services`: outbound link resolver, review input parsing, catalog search
//! - `storage`: SeaORM-backed review store with lazy single-flight connection
//! - `api`: HTTP handlers, admin session and middleware
//! - `config`: TOML + environment configuration
//! - `runtime`: server lifecycle and one-shot commands
//! - `system`: logging setup

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
