//! Input-mode classification and the mode-transition command table.
//!
//! The trackball peripheral holds two independent hardware toggles: a
//! scroll-emulation toggle and a DPI-cycle toggle. The interface never reads
//! those toggles back; it keeps them consistent purely by emitting the right
//! toggle sequence on every mode transition. [`transition_commands`] encodes
//! that sequence for all mode pairs.

use super::config::InterfaceConfig;
use super::layers::{ActiveLayers, LayerId};

/// The behavioural mode of the pointing device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Plain cursor movement.
    #[default]
    Move,
    /// Ball motion drives the scroll wheel.
    Scroll,
    /// Reduced-DPI precision movement.
    Snipe,
}

/// A toggle command dispatched to the peripheral's behaviour queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerCommand {
    /// Flip the scroll-emulation toggle.
    ToggleScroll,
    /// Advance the DPI cycle (normal ↔ snipe resolution).
    CycleDpi,
}

/// Derives the input mode from a snapshot of active layers.
///
/// Scroll layers are scanned first, in configuration order; any hit selects
/// [`InputMode::Scroll`] even when snipe layers are active at the same time.
/// Snipe layers are scanned next; no hit in either list means
/// [`InputMode::Move`]. Pure and idempotent.
pub fn classify(cfg: &InterfaceConfig, active: ActiveLayers) -> InputMode {
    classify_with(cfg, |layer| active.contains(layer))
}

/// [`classify`] over a live layer-active predicate instead of a snapshot.
///
/// The daemon uses this form so classification always reflects the layer
/// system's current answers rather than a possibly stale copy.
pub fn classify_with(cfg: &InterfaceConfig, is_active: impl Fn(LayerId) -> bool) -> InputMode {
    if cfg.scroll_layers().iter().any(|&layer| is_active(layer)) {
        return InputMode::Scroll;
    }
    if cfg.snipe_layers().iter().any(|&layer| is_active(layer)) {
        return InputMode::Snipe;
    }
    InputMode::Move
}

/// Returns the ordered command sequence that moves the peripheral from
/// `prev` to `next`.
///
/// The Scroll↔Snipe transitions need two commands because the scroll and DPI
/// toggles are independent and each must be flipped exactly once. Identical
/// modes yield an empty sequence.
pub fn transition_commands(prev: InputMode, next: InputMode) -> &'static [PointerCommand] {
    use InputMode::*;
    use PointerCommand::*;

    match (prev, next) {
        (Move, Scroll) | (Scroll, Move) => &[ToggleScroll],
        (Move, Snipe) | (Snipe, Move) => &[CycleDpi],
        (Scroll, Snipe) => &[CycleDpi, ToggleScroll],
        (Snipe, Scroll) => &[ToggleScroll, CycleDpi],
        (Move, Move) | (Scroll, Scroll) | (Snipe, Snipe) => &[],
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn make_config() -> InterfaceConfig {
        InterfaceConfig::new(vec![3, 4], vec![5, 6], 7, Duration::from_millis(400))
    }

    // ── classify ──────────────────────────────────────────────────────────────

    #[test]
    fn test_classify_returns_move_when_no_configured_layer_active() {
        let cfg = make_config();
        let active = ActiveLayers::empty().with(0).with(12);
        assert_eq!(classify(&cfg, active), InputMode::Move);
    }

    #[test]
    fn test_classify_returns_scroll_when_any_scroll_layer_active() {
        let cfg = make_config();
        assert_eq!(classify(&cfg, ActiveLayers::empty().with(3)), InputMode::Scroll);
        assert_eq!(classify(&cfg, ActiveLayers::empty().with(4)), InputMode::Scroll);
    }

    #[test]
    fn test_classify_returns_snipe_when_only_snipe_layer_active() {
        let cfg = make_config();
        assert_eq!(classify(&cfg, ActiveLayers::empty().with(5)), InputMode::Snipe);
        assert_eq!(classify(&cfg, ActiveLayers::empty().with(6)), InputMode::Snipe);
    }

    #[test]
    fn test_classify_scroll_dominates_snipe_when_both_active() {
        let cfg = make_config();
        let active = ActiveLayers::empty().with(5).with(3);
        assert_eq!(classify(&cfg, active), InputMode::Scroll);
    }

    #[test]
    fn test_classify_with_empty_lists_always_returns_move() {
        let cfg = InterfaceConfig::new(vec![], vec![], 7, Duration::ZERO);
        let active = ActiveLayers::empty().with(3).with(5);
        assert_eq!(classify(&cfg, active), InputMode::Move);
    }

    #[test]
    fn test_classify_is_idempotent_over_repeated_calls() {
        let cfg = make_config();
        let active = ActiveLayers::empty().with(5);
        let first = classify(&cfg, active);
        assert_eq!(classify(&cfg, active), first);
        assert_eq!(classify(&cfg, active), first);
    }

    #[test]
    fn test_classify_with_predicate_matches_snapshot_classification() {
        let cfg = make_config();
        let active = ActiveLayers::empty().with(4).with(6);

        let via_snapshot = classify(&cfg, active);
        let via_predicate = classify_with(&cfg, |layer| active.contains(layer));

        assert_eq!(via_snapshot, via_predicate);
    }

    // ── transition_commands ───────────────────────────────────────────────────

    #[test]
    fn test_transition_to_same_mode_emits_nothing() {
        for mode in [InputMode::Move, InputMode::Scroll, InputMode::Snipe] {
            assert!(transition_commands(mode, mode).is_empty());
        }
    }

    #[test]
    fn test_transition_move_to_scroll_is_single_scroll_toggle() {
        assert_eq!(
            transition_commands(InputMode::Move, InputMode::Scroll),
            &[PointerCommand::ToggleScroll]
        );
    }

    #[test]
    fn test_transition_move_to_snipe_is_single_dpi_cycle() {
        assert_eq!(
            transition_commands(InputMode::Move, InputMode::Snipe),
            &[PointerCommand::CycleDpi]
        );
    }

    #[test]
    fn test_transition_scroll_to_snipe_flips_both_toggles_dpi_first() {
        assert_eq!(
            transition_commands(InputMode::Scroll, InputMode::Snipe),
            &[PointerCommand::CycleDpi, PointerCommand::ToggleScroll]
        );
    }

    #[test]
    fn test_transition_snipe_to_scroll_flips_both_toggles_scroll_first() {
        assert_eq!(
            transition_commands(InputMode::Snipe, InputMode::Scroll),
            &[PointerCommand::ToggleScroll, PointerCommand::CycleDpi]
        );
    }

    #[test]
    fn test_direct_transitions_are_their_own_inverse() {
        // Every command is a toggle, so A→B followed by B→A must flip each
        // toggle an even number of times, leaving net peripheral state
        // unchanged.
        let modes = [InputMode::Move, InputMode::Scroll, InputMode::Snipe];
        for a in modes {
            for b in modes {
                let mut scroll_flips = 0u32;
                let mut dpi_flips = 0u32;
                for cmd in transition_commands(a, b)
                    .iter()
                    .chain(transition_commands(b, a))
                {
                    match cmd {
                        PointerCommand::ToggleScroll => scroll_flips += 1,
                        PointerCommand::CycleDpi => dpi_flips += 1,
                    }
                }
                assert_eq!(scroll_flips % 2, 0, "scroll toggle parity for {a:?}↔{b:?}");
                assert_eq!(dpi_flips % 2, 0, "dpi toggle parity for {a:?}↔{b:?}");
            }
        }
    }

    #[test]
    fn test_default_mode_is_move() {
        assert_eq!(InputMode::default(), InputMode::Move);
    }
}
