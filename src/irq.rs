//! Pen interrupt trait definition

use core::convert::Infallible;
use embedded_hal::digital::InputPin;

/// The XPT2046 pulls its PENIRQ output low while the panel is pressed.
/// This trait lets the driver gate pressure measurements on that line
/// without caring how the line is wired into the application.
///
/// Boards that leave PENIRQ unconnected use [`NoIrq`]; boards that route it
/// to a GPIO wrap the pin in [`ActiveLow`]:
///
/// ```ignore
/// let mut touch = Xpt2046::new(
///     touch_spi,
///     ActiveLow(touch_irq),
///     delay,
///     DEFAULT_TOUCH_CONFIG,
/// )?;
/// ```
pub trait TouchIrq {
    type Error;

    /// `false` means the controller reports no pen contact, so no bus
    /// transaction is needed to know the panel is released.
    fn is_pen_down(&mut self) -> Result<bool, Self::Error>;
}

/// No PENIRQ line, every check falls through to the pressure measurement
#[cfg_attr(feature = "with_defmt", derive(defmt::Format))]
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIrq;

impl TouchIrq for NoIrq {
    type Error = Infallible;

    fn is_pen_down(&mut self) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// PENIRQ wired to an input pin, pen down while the line is low
#[derive(Debug)]
pub struct ActiveLow<P>(pub P);

impl<P: InputPin> TouchIrq for ActiveLow<P> {
    type Error = P::Error;

    fn is_pen_down(&mut self) -> Result<bool, Self::Error> {
        self.0.is_low()
    }
}
