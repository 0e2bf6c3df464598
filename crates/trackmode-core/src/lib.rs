//! # trackmode-core
//!
//! Shared library for the trackmode pointing-device controller containing the
//! domain state-machine logic and the vendor wire-format helpers.
//!
//! This crate is used by the daemon and is intended to be reusable from a
//! firmware-side port. It has zero dependencies on OS APIs, transports, or
//! async runtimes.
//!
//! # Architecture overview
//!
//! A trackmode keyboard carries an integrated trackball whose behaviour is
//! steered from the keyboard's layer system: holding a scroll layer turns
//! ball motion into scrolling, holding a snipe layer drops the sensor DPI for
//! precision work. A separate "automouse" layer is raised automatically while
//! the host signals pointer use through the Scroll Lock indicator bit.
//!
//! This crate defines:
//!
//! - **`domain`** – Pure business logic. The input-mode classification over
//!   active layers, the mode-transition command table, and the immutable
//!   interface configuration.
//!
//! - **`protocol`** – The wire constants shared with the host: the HID LED
//!   indicator bitmask and the vendor feature-report format used by the
//!   secondary indicator channel.

// Declare the two top-level modules. Rust will look for each in a
// subdirectory with the same name (e.g., src/domain/mod.rs).
pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `trackmode_core::InputMode` instead of `trackmode_core::domain::mode::InputMode`.
pub use domain::config::InterfaceConfig;
pub use domain::layers::{ActiveLayers, LayerId, MAX_LAYERS};
pub use domain::mode::{classify, classify_with, transition_commands, InputMode, PointerCommand};
pub use protocol::feature_report::{decode_feature_report, ReportError, VENDOR_REPORT_ID};
pub use protocol::indicators::IndicatorFlags;
