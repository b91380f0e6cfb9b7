//! Time of day with sun direction, color and intensity.

use std::f32::consts::TAU;

use cgmath::{InnerSpace, Vector3};
use serde::{Deserialize, Serialize};

/// Hours in one day cycle.
pub const DAY_HOURS: f32 = 24.0;

/// A named sun appearance at a fixed hour.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SunKeyframe {
    /// Hour of the day this keyframe applies at.
    pub hour: f32,
    /// Sun color, linear RGB.
    pub color: [f32; 3],
    /// Fraction of the configured sun intensity, 0..=1.
    pub intensity: f32,
}

const NIGHT_COLOR: [f32; 3] = [0.1, 0.1, 0.3];
const DAWN_COLOR: [f32; 3] = [1.0, 0.6, 0.3];
const NOON_COLOR: [f32; 3] = [1.0, 1.0, 1.0];
const DUSK_COLOR: [f32; 3] = [1.0, 0.5, 0.3];

/// Keyframes in ascending hour order, covering the whole day.
pub const SUN_KEYFRAMES: [SunKeyframe; 7] = [
    SunKeyframe {
        hour: 0.0,
        color: NIGHT_COLOR,
        intensity: 0.0,
    },
    SunKeyframe {
        hour: 5.5,
        color: NIGHT_COLOR,
        intensity: 0.0,
    },
    SunKeyframe {
        hour: 6.5,
        color: DAWN_COLOR,
        intensity: 0.45,
    },
    SunKeyframe {
        hour: 12.0,
        color: NOON_COLOR,
        intensity: 1.0,
    },
    SunKeyframe {
        hour: 17.5,
        color: DUSK_COLOR,
        intensity: 0.45,
    },
    SunKeyframe {
        hour: 18.5,
        color: NIGHT_COLOR,
        intensity: 0.0,
    },
    SunKeyframe {
        hour: 24.0,
        color: NIGHT_COLOR,
        intensity: 0.0,
    },
];

/// The sun at one instant.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SunState {
    /// Unit vector pointing from the world towards the sun.
    pub direction: Vector3<f32>,
    /// Sun color, linear RGB.
    pub color: [f32; 3],
    /// Fraction of the configured sun intensity, 0..=1.
    pub intensity: f32,
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Time of day configuration and state
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeOfDay {
    /// Current time in hours (0.0 - 24.0)
    pub time_hours: f32,
    /// Duration of a full day cycle in real seconds
    pub day_length_seconds: f32,
    /// Whether the cycle is paused
    pub paused: bool,
}

impl Default for TimeOfDay {
    fn default() -> Self {
        Self {
            time_hours: 10.0,
            day_length_seconds: 1440.0,
            paused: false,
        }
    }
}

impl TimeOfDay {
    /// A running clock, starting at `start_hours` wrapped into 0..24.
    pub fn new(start_hours: f32, day_length_seconds: f32) -> Self {
        Self {
            time_hours: start_hours.rem_euclid(DAY_HOURS),
            day_length_seconds,
            paused: false,
        }
    }

    /// Advances the clock by real seconds, wrapping at midnight.
    pub fn advance(&mut self, delta_seconds: f32) {
        if self.paused || self.day_length_seconds <= 0.0 {
            return;
        }
        let hours_per_second = DAY_HOURS / self.day_length_seconds;
        let advanced = self.time_hours + delta_seconds * hours_per_second;
        self.time_hours = advanced.rem_euclid(DAY_HOURS);
    }

    /// Jumps to an hour, wrapped into 0..24.
    pub fn set_time(&mut self, hours: f32) {
        self.time_hours = hours.rem_euclid(DAY_HOURS);
    }

    /// Sun direction on a circular arc: rising along +X at 6:00, overhead at
    /// 12:00, setting along -X at 18:00 and straight down at midnight.
    pub fn sun_direction(&self) -> Vector3<f32> {
        let angle = (self.time_hours - 6.0) / DAY_HOURS * TAU;
        Vector3::new(angle.cos(), angle.sin(), 0.3).normalize()
    }

    /// Keyframe-interpolated color and intensity with the current direction.
    pub fn sun(&self) -> SunState {
        let hour = self.time_hours.rem_euclid(DAY_HOURS);
        let (color, intensity) = SUN_KEYFRAMES
            .windows(2)
            .find(|pair| hour >= pair[0].hour && hour < pair[1].hour)
            .map(|pair| {
                let (from, to) = (pair[0], pair[1]);
                let t = (hour - from.hour) / (to.hour - from.hour);
                let color = [
                    lerp(from.color[0], to.color[0], t),
                    lerp(from.color[1], to.color[1], t),
                    lerp(from.color[2], to.color[2], t),
                ];
                (color, lerp(from.intensity, to.intensity, t))
            })
            .unwrap_or((NIGHT_COLOR, 0.0));

        SunState {
            direction: self.sun_direction(),
            color,
            intensity,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn noon_is_overhead_and_white() {
        let sun = TimeOfDay::new(12.0, 1440.0).sun();
        assert!(sun.direction.y > 0.9);
        assert_relative_eq!(sun.intensity, 1.0);
        assert_eq!(sun.color, NOON_COLOR);
    }

    #[test]
    fn midnight_is_below_the_horizon() {
        let sun = TimeOfDay::new(0.0, 1440.0).sun();
        assert!(sun.direction.y < -0.9);
        assert_relative_eq!(sun.intensity, 0.0);
    }

    #[test]
    fn advance_wraps_around_the_day() {
        let mut time = TimeOfDay::new(23.0, 24.0);
        time.advance(2.0);
        assert_relative_eq!(time.time_hours, 1.0, epsilon = 1e-4);

        time.paused = true;
        time.advance(5.0);
        assert_relative_eq!(time.time_hours, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn interpolation_is_continuous_at_breakpoints() {
        for pair in SUN_KEYFRAMES.windows(2) {
            let at = pair[1].hour;
            let before = TimeOfDay::new(at - 1e-3, 1.0).sun();
            let after = TimeOfDay::new((at + 1e-3).min(23.9999), 1.0).sun();
            if at < DAY_HOURS {
                assert_relative_eq!(before.intensity, after.intensity, epsilon = 1e-2);
                for channel in 0..3 {
                    assert_relative_eq!(
                        before.color[channel],
                        after.color[channel],
                        epsilon = 1e-2
                    );
                }
            }
        }
    }

    #[test]
    fn dawn_is_warm() {
        let sun = TimeOfDay::new(6.5, 1440.0).sun();
        assert_eq!(sun.color, DAWN_COLOR);
        assert!(sun.color[0] > sun.color[2]);
    }
}
