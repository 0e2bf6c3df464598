//! TOML-based configuration persistence for the daemon.
//!
//! Reads and writes [`AppConfig`] to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\Trackmode\config.toml`
//! - Linux:    `~/.config/trackmode/config.toml`
//! - macOS:    `~/Library/Application Support/Trackmode/config.toml`
//!
//! Fields annotated with `#[serde(default = "some_fn")]` fall back to that
//! function's value when absent from the file, so the daemon works on first
//! run and across upgrades that add fields.
//!
//! This module is also the configuration-loading collaborator that enforces
//! the core's preconditions: [`AppConfig::interface_config`] rejects layer
//! IDs the firmware cannot represent and overlapping layer roles before the
//! controllers ever see them.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use trackmode_core::{InterfaceConfig, MAX_LAYERS};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A layer ID exceeds what the firmware's layer word can represent.
    #[error("layer {layer} is out of range (layers are 0..{MAX_LAYERS})")]
    LayerOutOfRange { layer: u8 },

    /// The same layer appears twice within one list.
    #[error("layer {layer} is listed twice")]
    DuplicateLayer { layer: u8 },

    /// The automouse layer also appears in a mode layer list.
    #[error("automouse layer {layer} must not double as a scroll or snipe layer")]
    AutomouseOverlapsModeLayer { layer: u8 },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level daemon configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub interface: InterfaceSettings,
    #[serde(default)]
    pub device: DeviceSettings,
}

/// Mode and automouse behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InterfaceSettings {
    /// Layers that select scroll mode, in scan-priority order.
    #[serde(default = "default_scroll_layers")]
    pub scroll_layers: Vec<u8>,
    /// Layers that select snipe mode, in scan-priority order.
    #[serde(default = "default_snipe_layers")]
    pub snipe_layers: Vec<u8>,
    /// The layer raised while the host signals pointer use.
    #[serde(default = "default_automouse_layer")]
    pub automouse_layer: u8,
    /// How long the automouse layer stays up after the indicator goes off.
    #[serde(default = "default_automouse_timeout_ms")]
    pub automouse_timeout_ms: u64,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Vendor HID interface identity for the feature-report channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceSettings {
    /// USB vendor ID of the keyboard's vendor interface.
    #[serde(default = "default_vendor_id")]
    pub vendor_id: u16,
    /// USB product ID of the keyboard's vendor interface.
    #[serde(default = "default_product_id")]
    pub product_id: u16,
    /// Whether to open the secondary feature-report channel at startup.
    #[serde(default = "default_true")]
    pub feature_channel: bool,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_scroll_layers() -> Vec<u8> {
    vec![3]
}
fn default_snipe_layers() -> Vec<u8> {
    vec![5]
}
fn default_automouse_layer() -> u8 {
    7
}
fn default_automouse_timeout_ms() -> u64 {
    400
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_vendor_id() -> u16 {
    0x1d50
}
fn default_product_id() -> u16 {
    0x615e
}
fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            interface: InterfaceSettings::default(),
            device: DeviceSettings::default(),
        }
    }
}

impl Default for InterfaceSettings {
    fn default() -> Self {
        Self {
            scroll_layers: default_scroll_layers(),
            snipe_layers: default_snipe_layers(),
            automouse_layer: default_automouse_layer(),
            automouse_timeout_ms: default_automouse_timeout_ms(),
            log_level: default_log_level(),
        }
    }
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            vendor_id: default_vendor_id(),
            product_id: default_product_id(),
            feature_channel: default_true(),
        }
    }
}

impl AppConfig {
    /// Validates the interface settings and builds the immutable domain
    /// configuration the controllers run against.
    ///
    /// Empty scroll/snipe lists are accepted; that mode is simply never
    /// selected.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::LayerOutOfRange`], [`ConfigError::DuplicateLayer`],
    /// or [`ConfigError::AutomouseOverlapsModeLayer`] when the settings break
    /// the controllers' preconditions.
    pub fn interface_config(&self) -> Result<InterfaceConfig, ConfigError> {
        let iface = &self.interface;

        for list in [&iface.scroll_layers, &iface.snipe_layers] {
            for (idx, &layer) in list.iter().enumerate() {
                if layer >= MAX_LAYERS {
                    return Err(ConfigError::LayerOutOfRange { layer });
                }
                if list[..idx].contains(&layer) {
                    return Err(ConfigError::DuplicateLayer { layer });
                }
            }
        }
        if iface.automouse_layer >= MAX_LAYERS {
            return Err(ConfigError::LayerOutOfRange { layer: iface.automouse_layer });
        }
        if iface.scroll_layers.contains(&iface.automouse_layer)
            || iface.snipe_layers.contains(&iface.automouse_layer)
        {
            return Err(ConfigError::AutomouseOverlapsModeLayer { layer: iface.automouse_layer });
        }

        Ok(InterfaceConfig::new(
            iface.scroll_layers.clone(),
            iface.snipe_layers.clone(),
            iface.automouse_layer,
            Duration::from_millis(iface.automouse_timeout_ms),
        ))
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot
/// be determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads [`AppConfig`] from disk, returning `AppConfig::default()` if the
/// file does not yet exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let path = config_file_path()?;

    match std::fs::read_to_string(&path) {
        Ok(content) => {
            let cfg: AppConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io { path, source: e }),
    }
}

/// Persists `config` to disk.
///
/// Creates the config directory and file if they do not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    let path = config_file_path()?;

    // Ensure directory exists before writing.
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(&path, content).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(())
}

/// Resolves the platform config base directory plus the `Trackmode` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("Trackmode"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("trackmode"))
    }

    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/Trackmode
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("Trackmode")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        // Fallback for unsupported platforms.
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
