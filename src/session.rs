//! Press / track / release lifecycle of one touch stream
//!
//! Everything here is free of I/O: the driver measures, the session decides.
//!
//! | state    | event                    | result                                  |
//! |----------|--------------------------|-----------------------------------------|
//! | any      | released                 | reset, Idle                             |
//! | any      | unreliable, below cap    | invalid += 1, no touch                  |
//! | any      | unreliable, cap reached  | reset, Idle, no touch                   |
//! | Idle     | sample                   | accept, Tracking                        |
//! | Tracking | sample within threshold  | accept, invalid = 0                     |
//! | Tracking | jump, below cap          | invalid += 1, reject, no touch          |
//! | Tracking | jump, cap reached        | clear history, invalid = 0, accept      |

use crate::smoothing::TouchSamples;
use embedded_graphics_core::geometry::Point;

/// Current state of the touch stream
#[cfg_attr(feature = "with_defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchState {
    /// No active touch
    Idle,
    /// A touch stream is in progress
    Tracking {
        /// Last accepted point before smoothing
        last: Point,
    },
}

/// Filter state of the touch stream
#[cfg_attr(feature = "with_defmt", derive(defmt::Format))]
#[derive(Debug, Clone)]
pub struct TouchSession {
    state: TouchState,
    history: TouchSamples,
    invalid_count: u8,
    max_invalid: u8,
    jump_threshold_sq: i64,
}

impl TouchSession {
    pub fn new(averaging_window: usize, jump_threshold: u16, max_invalid: u8) -> Self {
        let t = jump_threshold as i64;
        Self {
            state: TouchState::Idle,
            history: TouchSamples::new(averaging_window),
            invalid_count: 0,
            max_invalid,
            jump_threshold_sq: t * t,
        }
    }

    pub fn state(&self) -> TouchState {
        self.state
    }

    pub fn invalid_count(&self) -> u8 {
        self.invalid_count
    }

    /// Back to a cold start
    pub fn reset(&mut self) {
        self.state = TouchState::Idle;
        self.history.clear();
        self.invalid_count = 0;
    }

    /// The panel is not pressed
    pub fn released(&mut self) {
        if self.state != TouchState::Idle {
            #[cfg(feature = "with_defmt")]
            defmt::trace!("touch released");
        }
        self.reset();
    }

    /// The panel is pressed but the readings were too noisy to use
    pub fn unreliable(&mut self) {
        self.invalid_count = self.invalid_count.saturating_add(1);
        #[cfg(feature = "with_defmt")]
        defmt::debug!("unreliable sample ({}/{})", self.invalid_count, self.max_invalid);

        if self.invalid_count >= self.max_invalid {
            self.reset();
        }
    }

    /// Feed a mapped candidate point, returns the smoothed touch position
    /// when the candidate is accepted.
    pub fn sample(&mut self, candidate: Point) -> Option<Point> {
        if let TouchState::Tracking { last } = self.state {
            let d = candidate - last;
            let distance_sq = d.x as i64 * d.x as i64 + d.y as i64 * d.y as i64;

            if distance_sq > self.jump_threshold_sq {
                self.invalid_count = self.invalid_count.saturating_add(1);
                if self.invalid_count < self.max_invalid {
                    #[cfg(feature = "with_defmt")]
                    defmt::debug!("jump to {} rejected", candidate);
                    return None;
                }
                #[cfg(feature = "with_defmt")]
                defmt::debug!("jump to {} accepted as new touch", candidate);
                self.history.clear();
            }
            self.invalid_count = 0;
        }

        self.state = TouchState::Tracking { last: candidate };
        Some(self.history.push(candidate))
    }
}
