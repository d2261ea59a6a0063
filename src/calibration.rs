//! Raw ADC space to screen space mapping

use crate::error::CalibrationError;
use embedded_graphics_core::geometry::{Point, Size};

#[cfg(feature = "with_defmt")]
use defmt::{write, Format, Formatter};

/// Fixed wiring of the panel relative to the display.
///
/// The calibration wizard does not derive these, they have to match the
/// hardware.
#[cfg_attr(feature = "with_defmt", derive(Format))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Orientation {
    pub invert_x: bool,
    pub invert_y: bool,
    pub swap_xy: bool,
}

/// Raw ADC bounds of the visible screen area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationParameters {
    x_min: i32,
    y_min: i32,
    x_max: i32,
    y_max: i32,
}

impl CalibrationParameters {
    /// Bounds measured on the reference 240x320 panel
    pub const DEFAULT: Self = Self {
        x_min: 160,
        y_min: 215,
        x_max: 3870,
        y_max: 3910,
    };

    pub fn new(x_min: i32, y_min: i32, x_max: i32, y_max: i32) -> Result<Self, CalibrationError> {
        if x_max <= x_min {
            return Err(CalibrationError::DegenerateX);
        }
        if y_max <= y_min {
            return Err(CalibrationError::DegenerateY);
        }
        Ok(Self {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    /// Bounding box of the captured corner points
    pub fn from_corners(corners: &[Point]) -> Result<Self, CalibrationError> {
        let mut x_min = i32::MAX;
        let mut y_min = i32::MAX;
        let mut x_max = i32::MIN;
        let mut y_max = i32::MIN;

        for p in corners {
            x_min = x_min.min(p.x);
            x_max = x_max.max(p.x);
            y_min = y_min.min(p.y);
            y_max = y_max.max(p.y);
        }
        Self::new(x_min, y_min, x_max, y_max)
    }

    pub fn x_min(&self) -> i32 {
        self.x_min
    }

    pub fn y_min(&self) -> i32 {
        self.y_min
    }

    pub fn x_max(&self) -> i32 {
        self.x_max
    }

    pub fn y_max(&self) -> i32 {
        self.y_max
    }

    /// Map a raw sample to screen pixels.
    ///
    /// Returns `None` only for a zero sized screen.
    pub fn map(&self, raw: Point, screen: Size, orientation: Orientation) -> Option<Point> {
        if screen.width == 0 || screen.height == 0 {
            return None;
        }
        let (rx, ry) = if orientation.swap_xy {
            (raw.y, raw.x)
        } else {
            (raw.x, raw.y)
        };

        let x = scale_axis(
            rx,
            self.x_min,
            self.x_max,
            screen.width as i64,
            orientation.invert_x,
        );
        let y = scale_axis(
            ry,
            self.y_min,
            self.y_max,
            screen.height as i64,
            orientation.invert_y,
        );
        Some(Point::new(x, y))
    }
}

impl Default for CalibrationParameters {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(feature = "with_defmt")]
impl Format for CalibrationParameters {
    fn format(&self, fmt: Formatter) {
        write!(
            fmt,
            "x[{} - {}] y[{} - {}]",
            self.x_min, self.x_max, self.y_min, self.y_max,
        )
    }
}

fn scale_axis(v: i32, min: i32, max: i32, dim: i64, invert: bool) -> i32 {
    // offset and span are below 2^32 and dim fits u32, so the product fits u64
    let offset = (v.clamp(min, max) as i64 - min as i64) as u64;
    let span = (max as i64 - min as i64) as u64;
    let mut s = (offset * dim as u64 / span) as i64;
    if invert {
        s = dim - 1 - s;
    }
    s.clamp(0, dim - 1) as i32
}

/// One target of the guided calibration
#[cfg_attr(feature = "with_defmt", derive(Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationPoint {
    /// Where the target is drawn, in screen pixels
    pub target: Point,
    /// Averaged raw reading while the target was held
    pub raw: Point,
    pub captured: bool,
}

impl CalibrationPoint {
    pub fn new(target: Point) -> Self {
        Self {
            target,
            raw: Point::zero(),
            captured: false,
        }
    }
}
