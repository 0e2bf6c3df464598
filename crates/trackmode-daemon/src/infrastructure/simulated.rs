//! Simulated keyboard for the headless binary and the tests.
//!
//! Stands in for the firmware-side collaborators — the layer system, the
//! behaviour command queue, and the activity tracker — behind the same traits
//! the production integration implements. Layer mutations optionally emit
//! [`InterfaceEvent::LayerStateChanged`] into a connected event channel, so a
//! test or demo session sees the same notification flow as real hardware.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;
use trackmode_core::{ActiveLayers, IndicatorFlags, LayerId, PointerCommand};

use crate::application::automouse::{HostActivity, LayerControl};
use crate::application::event_loop::InterfaceEvent;
use crate::application::mode_switch::{CommandSink, LayerQuery};

/// An in-process keyboard double.
#[derive(Default)]
pub struct SimulatedKeyboard {
    layers: Mutex<ActiveLayers>,
    commands: Mutex<Vec<PointerCommand>>,
    awake: AtomicBool,
    wake_motions: AtomicU64,
    events: Mutex<Option<UnboundedSender<InterfaceEvent>>>,
}

impl SimulatedKeyboard {
    /// Creates a keyboard with no layers active and the host awake.
    pub fn new() -> Self {
        Self {
            awake: AtomicBool::new(true),
            ..Self::default()
        }
    }

    /// Connects the event channel that layer mutations notify into.
    pub fn connect_events(&self, sender: UnboundedSender<InterfaceEvent>) {
        *self.events.lock().expect("lock poisoned") = Some(sender);
    }

    /// Sets one layer's state, emitting a layer-changed notification when
    /// connected.
    pub fn set_layer(&self, layer: LayerId, active: bool) {
        {
            let mut layers = self.layers.lock().expect("lock poisoned");
            *layers = if active { layers.with(layer) } else { layers.without(layer) };
        }
        self.notify_layer_change();
    }

    /// Returns one layer's state.
    pub fn layer_active(&self, layer: LayerId) -> bool {
        self.layers.lock().expect("lock poisoned").contains(layer)
    }

    /// Sets the simulated host activity state.
    pub fn set_awake(&self, awake: bool) {
        self.awake.store(awake, Ordering::Relaxed);
    }

    /// Drives the primary indicator adapter: emits the indicator byte as an
    /// indicator-changed notification when connected.
    pub fn set_indicators(&self, flags: IndicatorFlags) {
        if let Some(sender) = self.events.lock().expect("lock poisoned").as_ref() {
            let _ = sender.send(InterfaceEvent::IndicatorsChanged(flags));
        }
    }

    /// Commands enqueued so far, in dispatch order.
    pub fn commands(&self) -> Vec<PointerCommand> {
        self.commands.lock().expect("lock poisoned").clone()
    }

    /// Number of synthetic wake motions injected so far.
    pub fn wake_motion_count(&self) -> u64 {
        self.wake_motions.load(Ordering::Relaxed)
    }

    fn notify_layer_change(&self) {
        if let Some(sender) = self.events.lock().expect("lock poisoned").as_ref() {
            // Receiver teardown during shutdown is not an error here.
            let _ = sender.send(InterfaceEvent::LayerStateChanged);
        }
    }
}

impl LayerQuery for SimulatedKeyboard {
    fn is_active(&self, layer: LayerId) -> bool {
        self.layer_active(layer)
    }
}

impl CommandSink for SimulatedKeyboard {
    fn enqueue(&self, command: PointerCommand) {
        debug!(?command, "command enqueued");
        self.commands.lock().expect("lock poisoned").push(command);
    }
}

impl LayerControl for SimulatedKeyboard {
    fn is_active(&self, layer: LayerId) -> bool {
        self.layer_active(layer)
    }

    fn activate(&self, layer: LayerId) {
        self.set_layer(layer, true);
    }

    fn deactivate(&self, layer: LayerId) {
        self.set_layer(layer, false);
    }
}

impl HostActivity for SimulatedKeyboard {
    fn is_awake(&self) -> bool {
        self.awake.load(Ordering::Relaxed)
    }

    fn report_wake_motion(&self) {
        self.wake_motions.fetch_add(1, Ordering::Relaxed);
        // A real host leaves idle on the first injected motion.
        self.awake.store(true, Ordering::Relaxed);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_new_keyboard_is_awake_with_no_layers() {
        let keyboard = SimulatedKeyboard::new();
        assert!(HostActivity::is_awake(&keyboard));
        assert!(!keyboard.layer_active(3));
        assert!(keyboard.commands().is_empty());
    }

    #[test]
    fn test_set_layer_round_trips_through_both_query_traits() {
        let keyboard = SimulatedKeyboard::new();
        keyboard.set_layer(5, true);

        assert!(LayerQuery::is_active(&keyboard, 5));
        assert!(LayerControl::is_active(&keyboard, 5));

        keyboard.set_layer(5, false);
        assert!(!LayerQuery::is_active(&keyboard, 5));
    }

    #[test]
    fn test_layer_mutations_notify_connected_channel() {
        let keyboard = SimulatedKeyboard::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        keyboard.connect_events(tx);

        keyboard.set_layer(3, true);
        keyboard.deactivate(3);

        assert_eq!(rx.try_recv().unwrap(), InterfaceEvent::LayerStateChanged);
        assert_eq!(rx.try_recv().unwrap(), InterfaceEvent::LayerStateChanged);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_set_indicators_emits_indicator_changed_event() {
        let keyboard = SimulatedKeyboard::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        keyboard.connect_events(tx);

        keyboard.set_indicators(IndicatorFlags::from_bits(IndicatorFlags::SCROLL_LOCK));

        match rx.try_recv().unwrap() {
            InterfaceEvent::IndicatorsChanged(flags) => assert!(flags.scroll_lock()),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_commands_are_recorded_in_dispatch_order() {
        let keyboard = SimulatedKeyboard::new();
        keyboard.enqueue(PointerCommand::CycleDpi);
        keyboard.enqueue(PointerCommand::ToggleScroll);

        assert_eq!(
            keyboard.commands(),
            vec![PointerCommand::CycleDpi, PointerCommand::ToggleScroll]
        );
    }

    #[test]
    fn test_wake_motion_counts_and_wakes_the_host() {
        let keyboard = SimulatedKeyboard::new();
        keyboard.set_awake(false);
        assert!(!HostActivity::is_awake(&keyboard));

        keyboard.report_wake_motion();

        assert_eq!(keyboard.wake_motion_count(), 1);
        assert!(HostActivity::is_awake(&keyboard));
    }
}
