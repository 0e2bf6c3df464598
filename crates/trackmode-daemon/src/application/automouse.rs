//! AutomouseUseCase: raises and drops the automouse layer from the host's
//! Scroll Lock indicator.
//!
//! The indicator bit is host-controlled and can arrive over two transports
//! (the LED output report and the vendor feature report). Both reduce to the
//! single [`AutomouseUseCase::on_indicator`] entry point, so the two sources
//! can never diverge in behaviour.
//!
//! Two deferred actions exist, each held as at most one cancellable handle:
//!
//! - **wake-then-activate** – when the indicator turns on while the host is
//!   idle, a synthetic motion event is injected first and layer activation is
//!   postponed by a short grace period so the activity transition settles
//!   before the layer engages;
//! - **debounced deactivate** – when the indicator turns off, the layer stays
//!   up for the configured timeout, and every further off-edge restarts the
//!   countdown, so transient indicator flicker never reaches the user.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};
use trackmode_core::{InterfaceConfig, LayerId};

/// Grace period between the synthetic wake motion and layer activation.
pub const WAKE_SETTLE_DELAY: Duration = Duration::from_millis(50);

/// Trait for querying and driving the keyboard's layer-activation subsystem.
///
/// All operations are fire-and-forget from this controller's perspective; a
/// silent failure leaves the tracked flag out of step until the next
/// indicator transition corrects it.
pub trait LayerControl: Send + Sync {
    /// Returns `true` if `layer` is currently active.
    fn is_active(&self, layer: LayerId) -> bool;
    /// Activates `layer`.
    fn activate(&self, layer: LayerId);
    /// Deactivates `layer`.
    fn deactivate(&self, layer: LayerId);
}

/// Trait for the host's activity/idle subsystem.
pub trait HostActivity: Send + Sync {
    /// Returns `true` when the host is awake (not idle or suspended).
    fn is_awake(&self) -> bool;
    /// Injects a synthetic motion event whose only purpose is to nudge the
    /// host out of its idle state.
    fn report_wake_motion(&self);
}

/// Which deferred automouse action a timer drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomouseTimer {
    /// Delayed layer activation after an idle wake.
    Activate,
    /// Debounced layer deactivation.
    Deactivate,
}

/// Handle to one scheduled timer instance.
///
/// The token is unique per `schedule` call; an expiry whose token no longer
/// matches the stored handle belongs to a replaced or cancelled instance and
/// is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerHandle {
    pub timer: AutomouseTimer,
    pub token: u64,
}

/// Trait for scheduling cancellable deferred actions.
///
/// Expiry is delivered back to the owning controller as an event carrying the
/// handle's timer kind and token. Cancelling a handle that already fired, or
/// one the scheduler no longer knows, is a no-op.
pub trait DelayScheduler: Send + Sync {
    /// Schedules `timer` to fire after `delay` and returns its handle.
    fn schedule(&self, delay: Duration, timer: AutomouseTimer) -> TimerHandle;
    /// Cancels a scheduled timer.
    fn cancel(&self, handle: &TimerHandle);
    /// Returns `true` while the timer is scheduled and has not fired.
    fn is_pending(&self, handle: &TimerHandle) -> bool;
}

/// The automouse layer controller.
pub struct AutomouseUseCase {
    cfg: InterfaceConfig,
    automouse_active: bool,
    pending_activate: Option<TimerHandle>,
    pending_deactivate: Option<TimerHandle>,
    layers: Arc<dyn LayerControl>,
    activity: Arc<dyn HostActivity>,
    scheduler: Arc<dyn DelayScheduler>,
}

impl AutomouseUseCase {
    /// Creates a new controller with the layer considered inactive.
    pub fn new(
        cfg: InterfaceConfig,
        layers: Arc<dyn LayerControl>,
        activity: Arc<dyn HostActivity>,
        scheduler: Arc<dyn DelayScheduler>,
    ) -> Self {
        Self {
            cfg,
            automouse_active: false,
            pending_activate: None,
            pending_deactivate: None,
            layers,
            activity,
            scheduler,
        }
    }

    /// Returns whether this controller considers the automouse layer on.
    ///
    /// The flag is authoritative for suppressing duplicate activation; the
    /// external layer system can still be toggled by other means.
    pub fn automouse_active(&self) -> bool {
        self.automouse_active
    }

    /// Single entry point for both indicator transports.
    ///
    /// `scroll_lock` is the state of the watched indicator bit after the
    /// change that produced the event.
    pub fn on_indicator(&mut self, scroll_lock: bool) {
        if scroll_lock {
            if !self.automouse_active && !self.layers.is_active(self.cfg.automouse_layer()) {
                self.begin_activation();
            } else if let Some(handle) = self.pending_deactivate.take() {
                // The indicator flickered back on before the timeout. Cancel
                // the countdown; if it already fired, dropping the handle
                // invalidates the queued expiry's token. The layer was never
                // deactivated, so no re-activation work is needed.
                self.scheduler.cancel(&handle);
                debug!("deactivation countdown cancelled, automouse layer stays up");
            }
        } else if self.automouse_active {
            // Debounce by extension: every off-edge restarts the countdown.
            if let Some(old) = self.pending_deactivate.take() {
                self.scheduler.cancel(&old);
            }
            let handle = self
                .scheduler
                .schedule(self.cfg.automouse_timeout(), AutomouseTimer::Deactivate);
            debug!(timeout_ms = self.cfg.automouse_timeout().as_millis() as u64,
                   "automouse deactivation scheduled");
            self.pending_deactivate = Some(handle);
        }
    }

    /// Handles the expiry of a previously scheduled timer.
    ///
    /// Expiries whose token does not match the stored handle belong to a
    /// cancelled or replaced instance and are dropped.
    pub fn on_timer(&mut self, timer: AutomouseTimer, token: u64) {
        match timer {
            AutomouseTimer::Activate => {
                if !Self::matches(&self.pending_activate, token) {
                    debug!(token, "stale activation expiry ignored");
                    return;
                }
                self.pending_activate = None;
                self.layers.activate(self.cfg.automouse_layer());
                self.automouse_active = true;
                info!("automouse layer activated after idle wake");
            }
            AutomouseTimer::Deactivate => {
                if !Self::matches(&self.pending_deactivate, token) {
                    debug!(token, "stale deactivation expiry ignored");
                    return;
                }
                self.pending_deactivate = None;
                if self.layers.is_active(self.cfg.automouse_layer()) {
                    self.layers.deactivate(self.cfg.automouse_layer());
                    info!("automouse layer deactivated");
                }
                self.automouse_active = false;
            }
        }
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn begin_activation(&mut self) {
        // Cancel-before-reschedule: an activation already in flight is
        // replaced, never doubled.
        if let Some(old) = self.pending_activate.take() {
            self.scheduler.cancel(&old);
        }

        if !self.activity.is_awake() {
            // The host is idle. Its driver may drop layer work issued while
            // suspended, so the wake must be sequenced strictly before the
            // activation: inject a synthetic motion event now and engage the
            // layer only after the activity transition has settled.
            self.activity.report_wake_motion();
            self.pending_activate = Some(
                self.scheduler
                    .schedule(WAKE_SETTLE_DELAY, AutomouseTimer::Activate),
            );
            info!("host idle; automouse activation delayed for wake settle");
        } else {
            self.layers.activate(self.cfg.automouse_layer());
            self.automouse_active = true;
            info!("automouse layer activated");
        }
    }

    fn matches(stored: &Option<TimerHandle>, token: u64) -> bool {
        stored.as_ref().is_some_and(|handle| handle.token == token)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
