//! File-system storage for the daemon: TOML configuration persistence.

pub mod config;
