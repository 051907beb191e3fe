//! Settings and presets for the Diapason fretboard synth.
//!
//! # Features
//!
//! - **Settings file**: volume, handedness, active sound, timing and preset
//!   slots as TOML, clamped on load
//! - **Presets**: four slots holding patch, effects, tuning and mode
//! - **Paths**: platform-specific settings location
//!
//! # Example
//!
//! ```rust,no_run
//! use diapason_config::{Settings, default_settings_path};
//!
//! let path = default_settings_path();
//! let mut settings = Settings::load_or_default(&path)?;
//! settings.apply_preset(1)?;
//! settings.set_volume(5);
//! settings.save(&path)?;
//! # Ok::<(), diapason_config::ConfigError>(())
//! ```

mod error;
mod settings;
mod sound;

/// Factory preset slots.
pub mod factory_presets;

/// Platform-specific paths.
pub mod paths;

/// Number of preset slots.
pub const NUM_PRESETS: usize = 4;

pub use error::ConfigError;
pub use factory_presets::{FACTORY_PATCHES, factory_presets};
pub use paths::{default_settings_path, ensure_parent_dir, user_config_dir};
pub use settings::{Settings, TimingSettings};
pub use sound::{DistortionSettings, FilterSettings, Mode, Sound, TuningSettings};
