//! Driver configuration

use crate::error::ConfigError;

/// Upper bound for [`TouchConfig::read_samples`]
pub const MAX_READ_SAMPLES: usize = 15;
/// Upper bound for [`TouchConfig::averaging_window`]
pub const MAX_AVERAGING_WINDOW: usize = 32;

/// Configuration for touch acquisition and filtering
#[cfg_attr(feature = "with_defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TouchConfig {
    /// Number of raw X/Y readings per filtered read. Must be odd so the
    /// median is a real sample.
    pub read_samples: usize,
    /// Number of readings averaged by the raw (calibration) read path
    pub raw_samples: usize,
    /// Number of accepted points averaged by the smoother
    pub averaging_window: usize,
    /// Distance in pixels between consecutive points above which the new
    /// point is treated as a glitch
    pub jump_threshold: u16,
    /// Consecutive unreliable or jumping samples tolerated before the touch
    /// stream is restarted
    pub max_invalid_samples: u8,
    /// Required `Z2 - Z1` difference for a press
    pub pressure_threshold: i32,
    /// Minimum Z1 reading for a press
    pub min_z1: i32,
    /// Per-axis population variance above which a filtered read is discarded
    pub variance_threshold: i32,
    /// Settling time between filtered readings
    pub sample_delay_ms: u32,
    /// Settling time after chip select and after deselect for each exchange
    pub bus_settle_us: u32,
}

impl TouchConfig {
    pub const fn default() -> Self {
        Self {
            read_samples: 7,
            raw_samples: 3,
            averaging_window: 10,
            jump_threshold: 80,
            max_invalid_samples: 3,
            pressure_threshold: 500,
            min_z1: 50,
            variance_threshold: 10_000,
            sample_delay_ms: 2,
            bus_settle_us: 1000,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.read_samples == 0
            || self.read_samples % 2 == 0
            || self.read_samples > MAX_READ_SAMPLES
        {
            return Err(ConfigError::ReadSamples);
        }
        if self.raw_samples == 0 || self.raw_samples > MAX_READ_SAMPLES {
            return Err(ConfigError::RawSamples);
        }
        if self.averaging_window == 0 || self.averaging_window > MAX_AVERAGING_WINDOW {
            return Err(ConfigError::AveragingWindow);
        }
        if self.jump_threshold == 0 {
            return Err(ConfigError::JumpThreshold);
        }
        if self.max_invalid_samples == 0 {
            return Err(ConfigError::InvalidSampleCap);
        }
        Ok(())
    }
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self::default()
    }
}

pub const DEFAULT_TOUCH_CONFIG: TouchConfig = TouchConfig::default();

/// Timing of the guided calibration procedure
#[cfg_attr(feature = "with_defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WizardConfig {
    /// How long a target must be held continuously before it is captured
    pub hold_ms: u32,
    /// Delay between raw reads while waiting for or tracking a hold
    pub poll_interval_ms: u32,
    /// Pause after a capture, giving the user time to lift the finger
    pub capture_pause_ms: u32,
    /// Distance of the corner targets from the screen edges
    pub target_margin: i32,
    /// Give up after the panel stays untouched this long. `None` waits forever.
    pub wait_timeout_ms: Option<u32>,
}

impl WizardConfig {
    pub const fn default() -> Self {
        Self {
            hold_ms: 1000,
            poll_interval_ms: 50,
            capture_pause_ms: 1000,
            target_margin: 10,
            wait_timeout_ms: None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hold_ms == 0 {
            return Err(ConfigError::HoldDuration);
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::PollInterval);
        }
        Ok(())
    }
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self::default()
    }
}

pub const DEFAULT_WIZARD_CONFIG: WizardConfig = WizardConfig::default();
