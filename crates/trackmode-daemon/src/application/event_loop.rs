//! The single-consumer event pump that feeds both controllers.
//!
//! Every signal source — the layer-state notifier, both indicator transports,
//! and timer expiries — sends [`InterfaceEvent`]s into one unbounded channel.
//! The loop processes them strictly one at a time to completion, which gives
//! the controllers the serialized, no-locking-required execution model they
//! are written against. No handler blocks or suspends.

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;
use trackmode_core::IndicatorFlags;

use super::automouse::{AutomouseTimer, AutomouseUseCase};
use super::mode_switch::ModeSwitchUseCase;

/// An event consumed by the interface event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceEvent {
    /// The set of active layers changed; carries no payload — the mode is
    /// re-derived from live layer queries.
    LayerStateChanged,
    /// The host's indicator byte changed, from either transport. Only the
    /// Scroll Lock bit is meaningful to the controllers.
    IndicatorsChanged(IndicatorFlags),
    /// A scheduled automouse timer expired.
    TimerFired { timer: AutomouseTimer, token: u64 },
}

/// Owns the two controllers and dispatches events to them.
pub struct InterfaceEventLoop {
    mode_switch: ModeSwitchUseCase,
    automouse: AutomouseUseCase,
    events: UnboundedReceiver<InterfaceEvent>,
}

impl InterfaceEventLoop {
    /// Creates a new loop over `events`.
    pub fn new(
        mode_switch: ModeSwitchUseCase,
        automouse: AutomouseUseCase,
        events: UnboundedReceiver<InterfaceEvent>,
    ) -> Self {
        Self {
            mode_switch,
            automouse,
            events,
        }
    }

    /// Runs until every sender has been dropped.
    pub async fn run(mut self) {
        while let Some(event) = self.events.recv().await {
            self.handle_event(event);
        }
        debug!("event channel closed, interface event loop stopping");
    }

    /// Dispatches a single event. Public so tests can drive the loop
    /// synchronously.
    pub fn handle_event(&mut self, event: InterfaceEvent) {
        match event {
            InterfaceEvent::LayerStateChanged => self.mode_switch.on_layer_state_changed(),
            InterfaceEvent::IndicatorsChanged(flags) => {
                self.automouse.on_indicator(flags.scroll_lock())
            }
            InterfaceEvent::TimerFired { timer, token } => self.automouse.on_timer(timer, token),
        }
    }

    /// Read access to the mode-switch controller (used by tests and status
    /// reporting).
    pub fn mode_switch(&self) -> &ModeSwitchUseCase {
        &self.mode_switch
    }

    /// Read access to the automouse controller.
    pub fn automouse(&self) -> &AutomouseUseCase {
        &self.automouse
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::mpsc;
    use trackmode_core::{ActiveLayers, InputMode, InterfaceConfig, LayerId, PointerCommand};

    use crate::application::automouse::{
        AutomouseTimer, DelayScheduler, HostActivity, LayerControl, TimerHandle,
    };
    use crate::application::mode_switch::{CommandSink, LayerQuery};

    // ── Test doubles ──────────────────────────────────────────────────────────

    /// Keyboard double covering every collaborator trait the loop wires up.
    #[derive(Default)]
    struct FakeKeyboard {
        layers: Mutex<ActiveLayers>,
        commands: Mutex<Vec<PointerCommand>>,
        awake: AtomicBool,
    }

    impl FakeKeyboard {
        fn set_layer(&self, layer: LayerId, active: bool) {
            let mut layers = self.layers.lock().unwrap();
            *layers = if active { layers.with(layer) } else { layers.without(layer) };
        }

        fn layer_active(&self, layer: LayerId) -> bool {
            self.layers.lock().unwrap().contains(layer)
        }
    }

    impl LayerQuery for FakeKeyboard {
        fn is_active(&self, layer: LayerId) -> bool {
            self.layer_active(layer)
        }
    }

    impl CommandSink for FakeKeyboard {
        fn enqueue(&self, command: PointerCommand) {
            self.commands.lock().unwrap().push(command);
        }
    }

    impl LayerControl for FakeKeyboard {
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

    impl HostActivity for FakeKeyboard {
        fn is_awake(&self) -> bool {
            self.awake.load(Ordering::Relaxed)
        }

        fn report_wake_motion(&self) {}
    }

    /// Scheduler double that hands out handles without ever delivering.
    #[derive(Default)]
    struct InertScheduler {
        next_token: AtomicU64,
    }

    impl DelayScheduler for InertScheduler {
        fn schedule(&self, _delay: Duration, timer: AutomouseTimer) -> TimerHandle {
            TimerHandle {
                timer,
                token: self.next_token.fetch_add(1, Ordering::Relaxed),
            }
        }

        fn cancel(&self, _handle: &TimerHandle) {}

        fn is_pending(&self, _handle: &TimerHandle) -> bool {
            false
        }
    }

    fn make_config() -> InterfaceConfig {
        InterfaceConfig::new(vec![3], vec![5], 7, Duration::from_millis(40))
    }

    fn make_loop() -> (
        InterfaceEventLoop,
        Arc<FakeKeyboard>,
        mpsc::UnboundedSender<InterfaceEvent>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let keyboard = Arc::new(FakeKeyboard::default());
        keyboard.awake.store(true, Ordering::Relaxed);
        let mode_switch = ModeSwitchUseCase::new(
            make_config(),
            Arc::clone(&keyboard) as Arc<dyn LayerQuery>,
            Arc::clone(&keyboard) as Arc<dyn CommandSink>,
        );
        let automouse = AutomouseUseCase::new(
            make_config(),
            Arc::clone(&keyboard) as Arc<dyn LayerControl>,
            Arc::clone(&keyboard) as Arc<dyn HostActivity>,
            Arc::new(InertScheduler::default()),
        );
        let event_loop = InterfaceEventLoop::new(mode_switch, automouse, rx);
        (event_loop, keyboard, tx)
    }

    // ── Dispatch ──────────────────────────────────────────────────────────────

    #[test]
    fn test_layer_event_dispatches_to_mode_switch() {
        // Arrange
        let (mut event_loop, keyboard, _tx) = make_loop();
        keyboard.set_layer(3, true);

        // Act
        event_loop.handle_event(InterfaceEvent::LayerStateChanged);

        // Assert
        assert_eq!(event_loop.mode_switch().current_mode(), InputMode::Scroll);
        assert_eq!(
            keyboard.commands.lock().unwrap().clone(),
            vec![PointerCommand::ToggleScroll]
        );
    }

    #[test]
    fn test_indicator_event_dispatches_to_automouse() {
        // Arrange
        let (mut event_loop, keyboard, _tx) = make_loop();

        // Act
        event_loop.handle_event(InterfaceEvent::IndicatorsChanged(IndicatorFlags::from_bits(
            IndicatorFlags::SCROLL_LOCK,
        )));

        // Assert
        assert!(event_loop.automouse().automouse_active());
        assert!(keyboard.layer_active(7));
    }

    #[test]
    fn test_indicator_event_without_scroll_lock_bit_is_off_edge() {
        // Arrange – active, then an indicator byte with only Caps Lock set
        let (mut event_loop, keyboard, _tx) = make_loop();
        event_loop.handle_event(InterfaceEvent::IndicatorsChanged(IndicatorFlags::from_bits(
            IndicatorFlags::SCROLL_LOCK,
        )));

        // Act
        event_loop.handle_event(InterfaceEvent::IndicatorsChanged(IndicatorFlags::from_bits(
            IndicatorFlags::CAPS_LOCK,
        )));

        // Assert – deactivation countdown started, layer still up for now
        assert!(event_loop.automouse().automouse_active());
        assert!(keyboard.layer_active(7));
    }

    #[test]
    fn test_timer_event_dispatches_to_automouse() {
        // Arrange – enter the countdown, then fire its (inert) handle by hand
        let (mut event_loop, keyboard, _tx) = make_loop();
        event_loop.handle_event(InterfaceEvent::IndicatorsChanged(IndicatorFlags::from_bits(
            IndicatorFlags::SCROLL_LOCK,
        )));
        event_loop.handle_event(InterfaceEvent::IndicatorsChanged(IndicatorFlags::from_bits(0)));

        // Act – the InertScheduler handed out token 0 for the countdown
        event_loop.handle_event(InterfaceEvent::TimerFired {
            timer: AutomouseTimer::Deactivate,
            token: 0,
        });

        // Assert
        assert!(!event_loop.automouse().automouse_active());
        assert!(!keyboard.layer_active(7));
    }

    #[test]
    fn test_run_returns_when_all_senders_dropped() {
        tokio_test::block_on(async {
            let (event_loop, _keyboard, tx) = make_loop();
            drop(tx);
            // With every sender gone recv() yields None immediately and the
            // loop must terminate rather than hang.
            event_loop.run().await;
        });
    }
}
