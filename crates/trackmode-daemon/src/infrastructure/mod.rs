//! Infrastructure layer for the daemon.
//!
//! Contains the runtime-facing adapters: the Tokio timer scheduler, TOML
//! configuration storage, the vendor-HID feature-report channel, and the
//! simulated keyboard used by the headless binary and the tests.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `trackmode_core`, but MUST NOT be imported by the application layer.

pub mod hid;
pub mod scheduler;
pub mod simulated;
pub mod storage;
