//! Immutable interface configuration.
//!
//! Built once at startup by the daemon's configuration loader, which is also
//! where validation lives (layer-ID range checks, overlap checks). This type
//! assumes it is handed sane values and only answers questions.

use std::time::Duration;

use super::layers::LayerId;

/// Configuration for one pointing-device interface.
///
/// The layer lists are ordered: earlier entries win when several configured
/// layers are active at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceConfig {
    scroll_layers: Vec<LayerId>,
    snipe_layers: Vec<LayerId>,
    automouse_layer: LayerId,
    automouse_timeout: Duration,
}

impl InterfaceConfig {
    /// Creates a new configuration.
    ///
    /// No validation happens here; the loader in the daemon crate rejects
    /// out-of-range and overlapping layer IDs before constructing this.
    pub fn new(
        scroll_layers: Vec<LayerId>,
        snipe_layers: Vec<LayerId>,
        automouse_layer: LayerId,
        automouse_timeout: Duration,
    ) -> Self {
        Self {
            scroll_layers,
            snipe_layers,
            automouse_layer,
            automouse_timeout,
        }
    }

    /// Scroll-mode layers in scan-priority order.
    pub fn scroll_layers(&self) -> &[LayerId] {
        &self.scroll_layers
    }

    /// Snipe-mode layers in scan-priority order.
    pub fn snipe_layers(&self) -> &[LayerId] {
        &self.snipe_layers
    }

    /// The layer raised and dropped by the automouse controller.
    pub fn automouse_layer(&self) -> LayerId {
        self.automouse_layer
    }

    /// How long the automouse layer stays up after the indicator goes off.
    pub fn automouse_timeout(&self) -> Duration {
        self.automouse_timeout
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_return_constructor_values() {
        let cfg = InterfaceConfig::new(vec![3, 4], vec![5], 7, Duration::from_millis(400));

        assert_eq!(cfg.scroll_layers(), &[3, 4]);
        assert_eq!(cfg.snipe_layers(), &[5]);
        assert_eq!(cfg.automouse_layer(), 7);
        assert_eq!(cfg.automouse_timeout(), Duration::from_millis(400));
    }

    #[test]
    fn test_layer_list_order_is_preserved() {
        // Scan priority is positional, so construction must not reorder.
        let cfg = InterfaceConfig::new(vec![9, 2, 6], vec![], 1, Duration::ZERO);
        assert_eq!(cfg.scroll_layers(), &[9, 2, 6]);
    }

    #[test]
    fn test_empty_layer_lists_are_representable() {
        let cfg = InterfaceConfig::new(vec![], vec![], 0, Duration::from_millis(100));
        assert!(cfg.scroll_layers().is_empty());
        assert!(cfg.snipe_layers().is_empty());
    }
}
