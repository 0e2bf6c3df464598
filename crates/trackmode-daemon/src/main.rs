//! Trackmode daemon entry point.
//!
//! Wires together the controllers and infrastructure and starts the Tokio
//! async runtime.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()            -- TOML settings + validation
//!  └─ start services
//!       ├─ InterfaceEventLoop   (Tokio task: both controllers)
//!       ├─ TokioDelayScheduler  (timer expiries → event channel)
//!       └─ FeatureReportChannel (optional vendor-HID reader thread)
//! ```

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use trackmode_daemon::application::automouse::{AutomouseUseCase, DelayScheduler, HostActivity, LayerControl};
use trackmode_daemon::application::event_loop::InterfaceEventLoop;
use trackmode_daemon::application::mode_switch::{CommandSink, LayerQuery, ModeSwitchUseCase};
use trackmode_daemon::infrastructure::hid::feature_channel::FeatureReportChannel;
use trackmode_daemon::infrastructure::scheduler::TokioDelayScheduler;
use trackmode_daemon::infrastructure::simulated::SimulatedKeyboard;
use trackmode_daemon::infrastructure::storage::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = config::config_file_path().context("resolving config path")?;
    let app_config = config::load_config().context("loading configuration")?;

    // Initialise structured logging. `RUST_LOG` overrides the config level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(app_config.interface.log_level.clone())),
        )
        .init();

    info!("trackmode daemon starting");

    // First run: persist the defaults so there is a file to edit.
    if !config_path.exists() {
        match config::save_config(&app_config) {
            Ok(()) => info!("wrote default config to {}", config_path.display()),
            Err(e) => warn!("could not write default config: {e}"),
        }
    }

    let interface_config = app_config
        .interface_config()
        .context("validating interface configuration")?;

    let (events_tx, events_rx) = tokio::sync::mpsc::unbounded_channel();

    // The simulated keyboard stands in for the firmware collaborators; a
    // hardware build swaps in its transport here without touching the
    // controllers.
    let keyboard = Arc::new(SimulatedKeyboard::new());
    keyboard.connect_events(events_tx.clone());

    let scheduler: Arc<dyn DelayScheduler> = Arc::new(TokioDelayScheduler::new(events_tx.clone()));

    let mode_switch = ModeSwitchUseCase::new(
        interface_config.clone(),
        Arc::clone(&keyboard) as Arc<dyn LayerQuery>,
        Arc::clone(&keyboard) as Arc<dyn CommandSink>,
    );
    let automouse = AutomouseUseCase::new(
        interface_config,
        Arc::clone(&keyboard) as Arc<dyn LayerControl>,
        Arc::clone(&keyboard) as Arc<dyn HostActivity>,
        scheduler,
    );

    let event_loop = InterfaceEventLoop::new(mode_switch, automouse, events_rx);
    let loop_task = tokio::spawn(event_loop.run());

    // ── Feature-report channel (optional) ─────────────────────────────────────
    let mut feature_channel = None;
    if app_config.device.feature_channel {
        match FeatureReportChannel::open(
            app_config.device.vendor_id,
            app_config.device.product_id,
            events_tx.clone(),
        ) {
            Ok(channel) => feature_channel = Some(channel),
            Err(e) => {
                // Startup-time condition only: the primary indicator path is
                // unaffected, that channel's functionality is simply absent.
                warn!("feature-report channel unavailable: {e}");
            }
        }
    }

    info!("trackmode daemon ready. Press Ctrl-C to exit.");

    tokio::signal::ctrl_c().await.context("waiting for shutdown signal")?;
    info!("shutdown signal received");

    if let Some(channel) = feature_channel.as_mut() {
        channel.stop();
    }
    drop(events_tx);
    loop_task.abort();

    info!("trackmode daemon stopped");
    Ok(())
}
