//! Guided five point calibration

use crate::calibration::{CalibrationParameters, CalibrationPoint};
use crate::error::CalibrationError;
use embedded_graphics::{
    primitives::{Circle, Line, Primitive, PrimitiveStyle},
    Drawable,
};
use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{Point, Size},
    pixelcolor::{Rgb565, RgbColor},
};

/// Four corners followed by the center. The center is shown to the user but
/// does not contribute to the bounds.
pub const TARGET_COUNT: usize = 5;
pub const CORNER_COUNT: usize = 4;

/// Screen positions of the calibration targets
pub fn targets(screen: Size, margin: i32) -> [CalibrationPoint; TARGET_COUNT] {
    let w = screen.width as i32;
    let h = screen.height as i32;
    [
        CalibrationPoint::new(Point::new(margin, margin)),
        CalibrationPoint::new(Point::new(w - margin, margin)),
        CalibrationPoint::new(Point::new(w - margin, h - margin)),
        CalibrationPoint::new(Point::new(margin, h - margin)),
        CalibrationPoint::new(Point::new(w / 2, h / 2)),
    ]
}

/// Bounds spanned by the corner captures
pub fn bounds(
    points: &[CalibrationPoint; TARGET_COUNT],
) -> Result<CalibrationParameters, CalibrationError> {
    let mut corners = [Point::zero(); CORNER_COUNT];
    for (c, p) in corners.iter_mut().zip(points.iter()) {
        *c = p.raw;
    }
    CalibrationParameters::from_corners(&corners)
}

/// Hold detection for a single target.
///
/// Fed with the result of every raw read together with a millisecond time
/// stamp. A release before the hold duration throws the accumulated samples
/// away.
#[cfg_attr(feature = "with_defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetCapture {
    hold_ms: u32,
    started_at: Option<u32>,
    sum_x: i64,
    sum_y: i64,
    samples: u32,
}

impl TargetCapture {
    pub fn new(hold_ms: u32) -> Self {
        Self {
            hold_ms,
            started_at: None,
            sum_x: 0,
            sum_y: 0,
            samples: 0,
        }
    }

    /// Milliseconds the current press has been held, if any
    pub fn held_for(&self, now_ms: u32) -> Option<u32> {
        self.started_at.map(|t| now_ms.wrapping_sub(t))
    }

    /// Panel pressed at `raw`. Returns the averaged raw point once the press
    /// has been held long enough.
    pub fn pressed(&mut self, raw: Point, now_ms: u32) -> Option<Point> {
        if self.started_at.is_none() {
            self.started_at = Some(now_ms);
            self.sum_x = 0;
            self.sum_y = 0;
            self.samples = 0;
        }
        self.sum_x += raw.x as i64;
        self.sum_y += raw.y as i64;
        self.samples += 1;

        match self.held_for(now_ms) {
            Some(held) if held >= self.hold_ms => Some(Point::new(
                (self.sum_x / self.samples as i64) as i32,
                (self.sum_y / self.samples as i64) as i32,
            )),
            _ => None,
        }
    }

    pub fn released(&mut self) {
        self.started_at = None;
        self.sum_x = 0;
        self.sum_y = 0;
        self.samples = 0;
    }
}

/// Feedback hooks for the calibration procedure.
///
/// All methods default to doing nothing.
pub trait CalibrationUi {
    /// Target `index` of [`TARGET_COUNT`] should be touched now
    fn show_target(&mut self, _index: usize, _target: Point) {}
    /// The target has been held for `held_ms` of `hold_ms`
    fn hold_progress(&mut self, _index: usize, _held_ms: u32, _hold_ms: u32) {}
    fn captured(&mut self, _index: usize, _point: &CalibrationPoint) {}
    fn finished(&mut self, _calibration: &CalibrationParameters) {}
}

/// Runs the calibration without any feedback
#[derive(Debug, Default, Clone, Copy)]
pub struct NoUi;

impl CalibrationUi for NoUi {}

/// Draws a crosshair on each target and marks it once captured
#[derive(Debug)]
pub struct CrosshairUi<'a, DT> {
    dt: &'a mut DT,
}

impl<'a, DT: DrawTarget<Color = Rgb565>> CrosshairUi<'a, DT> {
    pub fn new(dt: &'a mut DT) -> Self {
        Self { dt }
    }
}

impl<DT: DrawTarget<Color = Rgb565>> CalibrationUi for CrosshairUi<'_, DT> {
    fn show_target(&mut self, _index: usize, target: Point) {
        let _ = self.dt.clear(Rgb565::BLACK);
        calibration_draw_point(self.dt, &target, Rgb565::RED);
    }

    fn captured(&mut self, _index: usize, point: &CalibrationPoint) {
        let _ = Circle::with_center(point.target, 16)
            .into_styled(PrimitiveStyle::with_fill(Rgb565::GREEN))
            .draw(self.dt);
    }

    fn finished(&mut self, _calibration: &CalibrationParameters) {
        let _ = self.dt.clear(Rgb565::BLACK);
    }
}

fn calibration_draw_point<DT: DrawTarget<Color = Rgb565>>(dt: &mut DT, p: &Point, color: Rgb565) {
    let _ = Line::new(Point::new(p.x - 10, p.y), Point::new(p.x + 10, p.y))
        .into_styled(PrimitiveStyle::with_stroke(color, 1))
        .draw(dt);
    let _ = Line::new(Point::new(p.x, p.y - 10), Point::new(p.x, p.y + 10))
        .into_styled(PrimitiveStyle::with_stroke(color, 1))
        .draw(dt);
    let _ = Circle::with_center(*p, 10)
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(dt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics_core::{geometry::OriginDimensions, Pixel};

    #[test]
    fn targets_cover_corners_and_center() {
        let t = targets(Size::new(240, 320), 10);
        assert_eq!(t[0].target, Point::new(10, 10));
        assert_eq!(t[1].target, Point::new(230, 10));
        assert_eq!(t[2].target, Point::new(230, 310));
        assert_eq!(t[3].target, Point::new(10, 310));
        assert_eq!(t[4].target, Point::new(120, 160));
        assert!(t.iter().all(|p| !p.captured));
    }

    #[test]
    fn capture_waits_for_the_hold_duration() {
        let mut c = TargetCapture::new(1000);
        assert_eq!(c.pressed(Point::new(100, 200), 5000), None);
        assert_eq!(c.pressed(Point::new(110, 210), 5500), None);
        assert_eq!(c.held_for(5500), Some(500));
        assert_eq!(
            c.pressed(Point::new(120, 220), 6000),
            Some(Point::new(110, 210))
        );
    }

    #[test]
    fn release_discards_the_round() {
        let mut c = TargetCapture::new(1000);
        c.pressed(Point::new(4000, 4000), 0);
        c.pressed(Point::new(4000, 4000), 900);
        c.released();
        assert_eq!(c.held_for(950), None);

        assert_eq!(c.pressed(Point::new(100, 100), 1000), None);
        assert_eq!(c.pressed(Point::new(100, 100), 2000), Some(Point::new(100, 100)));
    }

    #[test]
    fn center_does_not_affect_bounds() {
        let mut points = targets(Size::new(240, 320), 10);
        let raws = [
            Point::new(160, 215),
            Point::new(3870, 215),
            Point::new(3870, 3910),
            Point::new(160, 3910),
            Point::new(9000, -50),
        ];
        for (p, raw) in points.iter_mut().zip(raws) {
            p.raw = raw;
            p.captured = true;
        }

        let cal = bounds(&points).unwrap();
        assert_eq!(cal, CalibrationParameters::new(160, 215, 3870, 3910).unwrap());
    }

    #[test]
    fn collapsed_corners_are_rejected() {
        let mut points = targets(Size::new(240, 320), 10);
        for p in points.iter_mut() {
            p.raw = Point::new(2000, 2000);
        }
        assert_eq!(bounds(&points), Err(CalibrationError::DegenerateX));
    }

    struct CountingDisplay {
        drawn: usize,
    }

    impl OriginDimensions for CountingDisplay {
        fn size(&self) -> Size {
            Size::new(240, 320)
        }
    }

    impl DrawTarget for CountingDisplay {
        type Color = Rgb565;
        type Error = core::convert::Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            self.drawn += pixels.into_iter().count();
            Ok(())
        }
    }

    #[test]
    fn crosshair_draws_target() {
        let mut display = CountingDisplay { drawn: 0 };
        {
            let mut ui = CrosshairUi::new(&mut display);
            ui.show_target(0, Point::new(10, 10));
        }
        assert!(display.drawn > 0);
    }
}
