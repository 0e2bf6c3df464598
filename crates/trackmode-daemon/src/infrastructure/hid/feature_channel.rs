//! The optional secondary indicator transport over the vendor HID interface.
//!
//! Some hosts never deliver the boot-keyboard LED report to the firmware
//! (virtualised guests, LED-filtering KVMs), so the keyboard mirrors its
//! indicator byte onto a vendor-defined report as well. This channel opens
//! that interface with `hidapi` and runs a blocking reader thread; every
//! decoded report is forwarded into the interface event channel as
//! [`InterfaceEvent::IndicatorsChanged`], the same event the primary
//! indicator adapter produces, so both transports share one controller path.
//!
//! Failure to open the interface is a startup-time condition only: the caller
//! logs it and continues, and the primary indicator path is unaffected.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use hidapi::{HidApi, HidDevice};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};
use trackmode_core::decode_feature_report;

use crate::application::event_loop::InterfaceEvent;

/// Poll interval for the reader thread, so a stop request is noticed promptly.
const READ_TIMEOUT_MS: i32 = 250;

/// Error type for feature-channel startup.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The hidapi library context could not be initialised.
    #[error("failed to initialise hidapi: {0}")]
    Init(String),

    /// The vendor interface is not present or could not be opened.
    #[error("vendor interface not found (VID=0x{vendor_id:04x}, PID=0x{product_id:04x}): {message}")]
    Open {
        vendor_id: u16,
        product_id: u16,
        message: String,
    },
}

/// Handle to the running feature-report channel.
///
/// Dropping the handle stops the reader thread.
pub struct FeatureReportChannel {
    stop: Arc<AtomicBool>,
    reader: Option<thread::JoinHandle<()>>,
}

impl FeatureReportChannel {
    /// Opens the vendor interface and starts the reader thread.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Init`] when hidapi itself cannot start and
    /// [`ChannelError::Open`] when the device is absent. Neither affects the
    /// primary indicator path.
    pub fn open(
        vendor_id: u16,
        product_id: u16,
        events: UnboundedSender<InterfaceEvent>,
    ) -> Result<Self, ChannelError> {
        let api = HidApi::new().map_err(|e| ChannelError::Init(e.to_string()))?;
        let device = api.open(vendor_id, product_id).map_err(|e| ChannelError::Open {
            vendor_id,
            product_id,
            message: e.to_string(),
        })?;

        info!("feature-report channel open (VID=0x{vendor_id:04x}, PID=0x{product_id:04x})");

        let stop = Arc::new(AtomicBool::new(false));
        let reader_stop = Arc::clone(&stop);
        let reader = thread::Builder::new()
            .name("trackmode-feature-channel".to_string())
            .spawn(move || read_loop(device, events, reader_stop))
            .map_err(|e| ChannelError::Init(e.to_string()))?;

        Ok(Self {
            stop,
            reader: Some(reader),
        })
    }

    /// Stops the reader thread and waits for it to exit.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(reader) = self.reader.take() {
            if reader.join().is_err() {
                warn!("feature-channel reader thread panicked");
            }
        }
    }
}

impl Drop for FeatureReportChannel {
    fn drop(&mut self) {
        self.stop();
    }
}

fn read_loop(device: HidDevice, events: UnboundedSender<InterfaceEvent>, stop: Arc<AtomicBool>) {
    let mut buf = [0u8; 8];
    while !stop.load(Ordering::Relaxed) {
        match device.read_timeout(&mut buf, READ_TIMEOUT_MS) {
            Ok(0) => continue, // timeout, re-check the stop flag
            Ok(n) => forward_report(&events, &buf[..n]),
            Err(e) => {
                warn!("feature-channel read failed, channel closing: {e}");
                break;
            }
        }
    }
    debug!("feature-channel reader stopped");
}

/// Decodes one raw report and forwards it as an indicator event.
///
/// Undecodable reports (foreign report IDs, truncated transfers) are logged
/// and dropped; the channel keeps running.
fn forward_report(events: &UnboundedSender<InterfaceEvent>, buf: &[u8]) {
    match decode_feature_report(buf) {
        Ok(flags) => {
            // Receiver teardown during shutdown is not an error here.
            let _ = events.send(InterfaceEvent::IndicatorsChanged(flags));
        }
        Err(e) => debug!("ignoring undecodable vendor report: {e}"),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
