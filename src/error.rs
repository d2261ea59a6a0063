//! Error definition for the crate

#[cfg(feature = "with_defmt")]
use defmt::{write, Format, Formatter};

#[cfg_attr(feature = "with_defmt", derive(Format))]
#[derive(Debug, PartialEq)]
pub enum BusError<SPIError, IRQError> {
    Spi(SPIError),
    Irq(IRQError),
}

/// Calibration bounds that would make the raw to screen scaling undefined
#[cfg_attr(feature = "with_defmt", derive(Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationError {
    /// `x_max` is not greater than `x_min`
    DegenerateX,
    /// `y_max` is not greater than `y_min`
    DegenerateY,
}

#[cfg_attr(feature = "with_defmt", derive(Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Filtered reads need an odd, non-zero number of samples
    ReadSamples,
    /// Raw reads need at least one sample
    RawSamples,
    AveragingWindow,
    JumpThreshold,
    InvalidSampleCap,
    HoldDuration,
    PollInterval,
}

#[derive(Debug, PartialEq)]
pub enum Error<SPIError, IRQError> {
    /// SPI bus or pen interrupt line error
    Bus(BusError<SPIError, IRQError>),
    /// Calibration bounds rejected
    Calibration(CalibrationError),
    /// Driver configuration out of range
    Config(ConfigError),
    /// No touch arrived while the calibration wizard waited for one
    CalibrationTimeout,
}

impl<SPIError, IRQError> From<CalibrationError> for Error<SPIError, IRQError> {
    fn from(e: CalibrationError) -> Self {
        Error::Calibration(e)
    }
}

impl<SPIError, IRQError> From<ConfigError> for Error<SPIError, IRQError> {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

#[cfg(feature = "with_defmt")]
impl<SPIError, IRQError> Format for Error<SPIError, IRQError> {
    fn format(&self, fmt: Formatter) {
        match self {
            Error::Bus(BusError::Spi(_)) => write!(fmt, "SPI bus error"),
            Error::Bus(BusError::Irq(_)) => write!(fmt, "Pen interrupt pin error"),
            Error::Calibration(e) => write!(fmt, "Rejected calibration bounds: {}", e),
            Error::Config(e) => write!(fmt, "Invalid configuration: {}", e),
            Error::CalibrationTimeout => write!(fmt, "Timed out waiting for calibration touch"),
        }
    }
}
