//! ModeSwitchUseCase: keeps the peripheral's input mode in step with the
//! active keyboard layers.
//!
//! On every layer-state change this use case re-derives the input mode from
//! live layer queries and, when the classification moved, pushes the ordered
//! toggle commands through the [`CommandSink`]. Command dispatch is
//! fire-and-forget: the peripheral never reports failure back, so the tracked
//! mode is advanced unconditionally after emission.
//!
//! # Architecture
//!
//! The use case depends only on traits (`LayerQuery`, `CommandSink`) and the
//! pure functions in `trackmode-core`. All infrastructure implementations are
//! injected at construction time.

use std::sync::Arc;

use tracing::info;
use trackmode_core::{
    classify_with, transition_commands, InputMode, InterfaceConfig, LayerId, PointerCommand,
};

#[cfg(test)]
use mockall::automock;

/// Trait for asking the keyboard's layer system whether a layer is active.
#[cfg_attr(test, automock)]
pub trait LayerQuery: Send + Sync {
    /// Returns `true` if `layer` is currently active.
    fn is_active(&self, layer: LayerId) -> bool;
}

/// Trait for dispatching toggle commands to the peripheral's behaviour queue.
///
/// Dispatch is ordered and asynchronous on the peripheral side; the queue is
/// assumed eventually consistent with enqueue order and never reports errors.
pub trait CommandSink: Send + Sync {
    /// Enqueues one command for execution.
    fn enqueue(&self, command: PointerCommand);
}

/// The mode-switch use case.
///
/// Holds the last mode that commands were emitted for; two tracked mode
/// values are never separated by an un-actuated transition.
pub struct ModeSwitchUseCase {
    cfg: InterfaceConfig,
    current_mode: InputMode,
    layers: Arc<dyn LayerQuery>,
    commands: Arc<dyn CommandSink>,
}

impl ModeSwitchUseCase {
    /// Creates a new use case instance. The initial mode is [`InputMode::Move`].
    pub fn new(
        cfg: InterfaceConfig,
        layers: Arc<dyn LayerQuery>,
        commands: Arc<dyn CommandSink>,
    ) -> Self {
        Self {
            cfg,
            current_mode: InputMode::default(),
            layers,
            commands,
        }
    }

    /// Returns the last mode the actuator emitted commands for.
    pub fn current_mode(&self) -> InputMode {
        self.current_mode
    }

    /// Recomputes the input mode from live layer queries and actuates any
    /// transition.
    ///
    /// The layer-changed notification carries no payload; classification
    /// always reflects the layer system's current answers. When the mode is
    /// unchanged, nothing is emitted.
    pub fn on_layer_state_changed(&mut self) {
        let next = classify_with(&self.cfg, |layer| self.layers.is_active(layer));
        if next == self.current_mode {
            return;
        }

        info!(prev = ?self.current_mode, next = ?next, "input mode changed");
        for &command in transition_commands(self.current_mode, next) {
            self.commands.enqueue(command);
        }
        self.current_mode = next;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
