//! Press detection from the Z1/Z2 pressure channels

/// Decide whether the panel is pressed from one pair of normalised
/// pressure readings.
///
/// A press needs a minimum Z1 level, and the `Z2 - Z1` spread has to exceed
/// the configured threshold.
pub fn is_pressed(z1: i32, z2: i32, min_z1: i32, threshold: i32) -> bool {
    if z1 < min_z1 {
        return false;
    }
    z2 - z1 > threshold
}
