//! Moving average over recently accepted points

use crate::config::MAX_AVERAGING_WINDOW;
use embedded_graphics_core::geometry::Point;

/// Fixed capacity circular history of accepted points.
///
/// Averages over however many slots are filled, so the output follows the
/// finger immediately after a reset and settles into a `window` sized moving
/// average once warmed up.
#[cfg_attr(feature = "with_defmt", derive(defmt::Format))]
#[derive(Debug, Clone)]
pub struct TouchSamples {
    samples: [Point; MAX_AVERAGING_WINDOW],
    /// Slot the next point is written to
    head: usize,
    /// current number of captured samples
    counter: usize,
    window: usize,
}

impl TouchSamples {
    /// `window` must be within `1..=MAX_AVERAGING_WINDOW`
    pub fn new(window: usize) -> Self {
        Self {
            samples: [Point::zero(); MAX_AVERAGING_WINDOW],
            head: 0,
            counter: 0,
            window: window.clamp(1, MAX_AVERAGING_WINDOW),
        }
    }

    /// Record a point, evicting the oldest one when full, and return the
    /// average of the history.
    pub fn push(&mut self, point: Point) -> Point {
        self.samples[self.head] = point;
        self.head = (self.head + 1) % self.window;
        if self.counter < self.window {
            self.counter += 1;
        }
        self.average()
    }

    pub fn average(&self) -> Point {
        if self.counter == 0 {
            return Point::zero();
        }
        let mut x = 0;
        let mut y = 0;

        // the filled slots are always the first `counter` ones
        for point in &self.samples[..self.counter] {
            x += point.x;
            y += point.y;
        }
        x /= self.counter as i32;
        y /= self.counter as i32;
        Point::new(x, y)
    }

    pub fn len(&self) -> usize {
        self.counter
    }

    pub fn is_empty(&self) -> bool {
        self.counter == 0
    }

    /// Forget the history. Slot contents are left in place, only the count
    /// matters.
    pub fn clear(&mut self) {
        self.head = 0;
        self.counter = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warm_up_averages_filled_slots_only() {
        let mut ts = TouchSamples::new(4);
        assert_eq!(ts.push(Point::new(10, 20)), Point::new(10, 20));
        assert_eq!(ts.push(Point::new(20, 40)), Point::new(15, 30));
        assert_eq!(ts.len(), 2);
    }

    #[test]
    fn oldest_point_is_evicted() {
        let mut ts = TouchSamples::new(2);
        ts.push(Point::new(100, 100));
        ts.push(Point::new(10, 10));
        assert_eq!(ts.push(Point::new(20, 20)), Point::new(15, 15));
        assert_eq!(ts.len(), 2);
    }

    #[test]
    fn converges_after_a_full_window() {
        let mut ts = TouchSamples::new(10);
        for i in 0..10 {
            ts.push(Point::new(i * 50, 300 - i * 20));
        }
        let mut out = Point::zero();
        for _ in 0..10 {
            out = ts.push(Point::new(77, 133));
        }
        assert_eq!(out, Point::new(77, 133));
    }

    #[test]
    fn clear_drops_history() {
        let mut ts = TouchSamples::new(10);
        ts.push(Point::new(1000, 1000));
        ts.clear();
        assert!(ts.is_empty());
        assert_eq!(ts.push(Point::new(4, 8)), Point::new(4, 8));
    }
}
