//! Layer identifiers and the active-layer set.
//!
//! The keyboard firmware represents its layer state as a 32-bit word with one
//! bit per layer; [`ActiveLayers`] mirrors that representation so snapshots
//! can cross the wire unchanged.

/// Identifies a single keymap layer.
pub type LayerId = u8;

/// Number of layers the firmware supports; layer IDs are `0..MAX_LAYERS`.
pub const MAX_LAYERS: u8 = 32;

/// A value-type set of currently active layers.
///
/// Bit `n` set means layer `n` is active. Out-of-range layer IDs are never
/// members and are ignored by the mutating helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActiveLayers(u32);

impl ActiveLayers {
    /// Returns the empty set.
    pub fn empty() -> Self {
        Self(0)
    }

    /// Returns the raw layer-state word.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Returns `true` if `layer` is active.
    pub fn contains(self, layer: LayerId) -> bool {
        layer < MAX_LAYERS && self.0 & (1 << layer) != 0
    }

    /// Returns a copy with `layer` active.
    pub fn with(self, layer: LayerId) -> Self {
        if layer < MAX_LAYERS {
            Self(self.0 | 1 << layer)
        } else {
            self
        }
    }

    /// Returns a copy with `layer` inactive.
    pub fn without(self, layer: LayerId) -> Self {
        if layer < MAX_LAYERS {
            Self(self.0 & !(1 << layer))
        } else {
            self
        }
    }

    /// Returns `true` if no layer is active.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<LayerId> for ActiveLayers {
    fn from_iter<I: IntoIterator<Item = LayerId>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
