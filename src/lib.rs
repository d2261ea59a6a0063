#![deny(
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    unused_variables,
    unreachable_code,
    unused_comparisons,
    unused_imports,
    unused_must_use
)]
#![cfg_attr(not(test), no_std)]

//! Filtered and calibrated touch input for the XPT2046 resistive touch
//! controller, based on the
//! [`embedded-hal`](https://github.com/rust-embedded/embedded-hal) traits.
//!
//! Every [`Xpt2046::read`] call checks the pressure channels, takes a burst
//! of position readings and reduces them to a median, maps the result to
//! screen pixels and runs it through jump rejection and a moving average.
//! A call that cannot produce a trustworthy point returns `Ok(None)` and the
//! caller simply polls again.
//!

pub use crate::{
    calibration::{CalibrationParameters, CalibrationPoint, Orientation},
    config::{TouchConfig, WizardConfig, DEFAULT_TOUCH_CONFIG, DEFAULT_WIZARD_CONFIG},
    error::{BusError, CalibrationError, ConfigError, Error},
    irq::{ActiveLow, NoIrq, TouchIrq},
    session::TouchState,
    wizard::{CalibrationUi, CrosshairUi, NoUi},
};
use crate::{config::MAX_READ_SAMPLES, session::TouchSession, wizard::TargetCapture};
use embedded_graphics_core::geometry::{OriginDimensions, Point, Size};
use embedded_hal::{
    delay::DelayNs,
    spi::{Operation, SpiDevice},
};

pub mod calibration;
pub mod config;
pub mod error;
pub mod irq;
pub mod pressure;
mod sample;
pub mod session;
pub mod smoothing;
pub mod wizard;

#[cfg(test)]
mod test_support;

// The panel wiring swaps the X and Y naming of the datasheet
const CMD_X_READ: u8 = 0x90;
const CMD_Y_READ: u8 = 0xD0;
const CMD_Z1_READ: u8 = 0xB0;
const CMD_Z2_READ: u8 = 0xC0;

/// Responses carry the 12 bit conversion left aligned after one busy clock
const RESPONSE_SHIFT: u32 = 3;
/// Time between the command byte and clocking out the conversion
const CONVERSION_SETTLE_NS: u32 = 2_000;
const STARTUP_DELAY_MS: u32 = 10;

/// Screen size of the reference panel, until told otherwise
pub const DEFAULT_SCREEN_SIZE: Size = Size::new(240, 320);

#[derive(Debug)]
pub struct Xpt2046<SPI, IRQ, DELAY> {
    /// The SPI device interface
    spi: SPI,
    /// Pen interrupt line
    irq: IRQ,
    delay: DELAY,
    config: TouchConfig,
    calibration: CalibrationParameters,
    orientation: Orientation,
    screen: Size,
    /// Filter state of the current touch stream
    session: TouchSession,
    /// Settle time spent inside bus exchanges, wraps
    bus_time_us: u32,
}

impl<SPI, IRQ, DELAY> Xpt2046<SPI, IRQ, DELAY>
where
    SPI: SpiDevice<u8>,
    IRQ: TouchIrq,
    DELAY: DelayNs,
{
    pub fn new(spi: SPI, irq: IRQ, delay: DELAY, config: TouchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            spi,
            irq,
            delay,
            config,
            calibration: CalibrationParameters::DEFAULT,
            orientation: Orientation::default(),
            screen: DEFAULT_SCREEN_SIZE,
            session: TouchSession::new(
                config.averaging_window,
                config.jump_threshold,
                config.max_invalid_samples,
            ),
            bus_time_us: 0,
        })
    }

    /// Give back the bus, the interrupt line and the delay
    pub fn release(self) -> (SPI, IRQ, DELAY) {
        (self.spi, self.irq, self.delay)
    }

    pub fn config(&self) -> &TouchConfig {
        &self.config
    }

    pub fn calibration(&self) -> CalibrationParameters {
        self.calibration
    }

    /// Install new bounds, used from the next read on
    pub fn set_calibration(&mut self, calibration: CalibrationParameters) {
        self.calibration = calibration;
        self.session.reset();
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
        self.session.reset();
    }

    pub fn screen_size(&self) -> Size {
        self.screen
    }

    pub fn set_screen_size(&mut self, size: Size) {
        self.screen = size;
        self.session.reset();
    }

    /// Follow the dimensions of the display the panel is mounted on
    pub fn set_screen_size_from<D: OriginDimensions>(&mut self, display: &D) {
        self.set_screen_size(display.size());
    }

    pub fn session_state(&self) -> TouchState {
        self.session.state()
    }

    /// Forget the current touch stream
    pub fn reset(&mut self) {
        self.session.reset();
    }
}

impl<SPI, IRQ, DELAY, SPIError, IRQError> Xpt2046<SPI, IRQ, DELAY>
where
    SPI: SpiDevice<u8, Error = SPIError>,
    IRQ: TouchIrq<Error = IRQError>,
    DELAY: DelayNs,
{
    /// Send one command byte and read back the normalised conversion
    fn exchange(&mut self, command: u8) -> Result<i32, Error<SPIError, IRQError>> {
        let mut rx = [0; 2];
        let settle_ns = self.config.bus_settle_us.saturating_mul(1000);

        self.spi
            .transaction(&mut [
                Operation::DelayNs(settle_ns),
                Operation::Write(&[command]),
                Operation::DelayNs(CONVERSION_SETTLE_NS),
                Operation::Read(&mut rx),
            ])
            .map_err(|e| Error::Bus(BusError::Spi(e)))?;
        self.delay.delay_us(self.config.bus_settle_us);
        self.bus_time_us = self.bus_time_us.wrapping_add(
            self.config
                .bus_settle_us
                .saturating_mul(2)
                .saturating_add(CONVERSION_SETTLE_NS / 1000),
        );

        Ok((u16::from_be_bytes(rx) >> RESPONSE_SHIFT) as i32)
    }

    /// Reset the touch state and leave the controller in power down with
    /// PENIRQ enabled
    pub fn init(&mut self) -> Result<(), Error<SPIError, IRQError>> {
        self.session.reset();
        // Throwaway conversion, only the power down bits of the command matter
        self.exchange(CMD_X_READ)?;
        self.delay.delay_ms(STARTUP_DELAY_MS);
        Ok(())
    }

    /// Check if the display is currently touched
    pub fn is_touched(&mut self) -> Result<bool, Error<SPIError, IRQError>> {
        if !self
            .irq
            .is_pen_down()
            .map_err(|e| Error::Bus(BusError::Irq(e)))?
        {
            return Ok(false);
        }

        let z1 = self.exchange(CMD_Z1_READ)?;
        let z2 = self.exchange(CMD_Z2_READ)?;
        Ok(pressure::is_pressed(
            z1,
            z2,
            self.config.min_z1,
            self.config.pressure_threshold,
        ))
    }

    /// Median of a burst of readings, `None` if either axis is too noisy
    fn read_filtered(&mut self) -> Result<Option<Point>, Error<SPIError, IRQError>> {
        let n = self.config.read_samples;
        let mut xs = [0; MAX_READ_SAMPLES];
        let mut ys = [0; MAX_READ_SAMPLES];

        for (x, y) in xs[..n].iter_mut().zip(ys[..n].iter_mut()) {
            *x = self.exchange(CMD_X_READ)?;
            *y = self.exchange(CMD_Y_READ)?;
            self.delay.delay_ms(self.config.sample_delay_ms);
        }

        let threshold = self.config.variance_threshold;
        let x = sample::filter_axis(&xs[..n], threshold);
        let y = sample::filter_axis(&ys[..n], threshold);
        Ok(x.zip(y).map(|(x, y)| Point::new(x, y)))
    }

    /// Read the calibrated and filtered point of touch.
    ///
    /// `Ok(None)` when the panel is not touched or this cycle's readings were
    /// discarded.
    pub fn read(&mut self) -> Result<Option<Point>, Error<SPIError, IRQError>> {
        if !self.is_touched()? {
            self.session.released();
            return Ok(None);
        }

        let Some(raw) = self.read_filtered()? else {
            self.session.unreliable();
            return Ok(None);
        };

        let Some(candidate) = self.calibration.map(raw, self.screen, self.orientation) else {
            return Ok(None);
        };
        Ok(self.session.sample(candidate))
    }

    /// Read lightly averaged raw values, without calibration and without
    /// touching the filter state
    pub fn read_raw(&mut self) -> Result<Option<Point>, Error<SPIError, IRQError>> {
        if !self.is_touched()? {
            return Ok(None);
        }

        let n = self.config.raw_samples;
        let mut xs = [0; MAX_READ_SAMPLES];
        let mut ys = [0; MAX_READ_SAMPLES];
        for (x, y) in xs[..n].iter_mut().zip(ys[..n].iter_mut()) {
            *x = self.exchange(CMD_X_READ)?;
            *y = self.exchange(CMD_Y_READ)?;
        }
        Ok(Some(Point::new(
            sample::mean(&xs[..n]),
            sample::mean(&ys[..n]),
        )))
    }

    /// Guide the user through touching four corners and the center, then
    /// install the bounds spanned by the corners.
    ///
    /// The hold clock advances by the poll interval, the post-capture pause
    /// and the settle time spent in each bus exchange, so it tracks wall time
    /// as long as the SPI clock itself is fast. The wait timeout only counts
    /// poll intervals.
    ///
    /// Without a `wait_timeout_ms` this does not return until every target
    /// has been held. On any error the previous calibration stays in place.
    pub fn run_calibration_wizard<UI: CalibrationUi>(
        &mut self,
        wizard: &WizardConfig,
        ui: &mut UI,
    ) -> Result<CalibrationParameters, Error<SPIError, IRQError>> {
        wizard.validate()?;

        let poll = wizard.poll_interval_ms;
        let mut points = wizard::targets(self.screen, wizard.target_margin);
        let mut now_ms: u32 = 0;
        let mut carry_us: u32 = 0;

        for (index, point) in points.iter_mut().enumerate() {
            ui.show_target(index, point.target);
            let mut capture = TargetCapture::new(wizard.hold_ms);
            let mut untouched_ms: u32 = 0;

            loop {
                let bus_before = self.bus_time_us;
                let reading = self.read_raw()?;
                carry_us = carry_us.saturating_add(self.bus_time_us.wrapping_sub(bus_before));
                now_ms = now_ms.wrapping_add(carry_us / 1000);
                carry_us %= 1000;

                match reading {
                    Some(raw) => {
                        untouched_ms = 0;
                        if let Some(averaged) = capture.pressed(raw, now_ms) {
                            point.raw = averaged;
                            point.captured = true;
                            #[cfg(feature = "with_defmt")]
                            defmt::info!("calibration target {} captured at {}", index, averaged);
                            ui.captured(index, point);
                            break;
                        }
                        if let Some(held) = capture.held_for(now_ms) {
                            ui.hold_progress(index, held, wizard.hold_ms);
                        }
                    }
                    None => {
                        capture.released();
                        if let Some(timeout) = wizard.wait_timeout_ms {
                            if untouched_ms >= timeout {
                                return Err(Error::CalibrationTimeout);
                            }
                        }
                        untouched_ms = untouched_ms.saturating_add(poll);
                    }
                }
                self.delay.delay_ms(poll);
                now_ms = now_ms.wrapping_add(poll);
            }

            self.delay.delay_ms(wizard.capture_pause_ms);
            now_ms = now_ms.wrapping_add(wizard.capture_pause_ms);
        }

        let calibration = wizard::bounds(&points).map_err(|e| {
            #[cfg(feature = "with_defmt")]
            defmt::warn!("calibration rejected: {}", e);
            Error::Calibration(e)
        })?;

        #[cfg(feature = "with_defmt")]
        defmt::info!("new calibration {}", calibration);
        self.set_calibration(calibration);
        ui.finished(&calibration);
        Ok(calibration)
    }
}
