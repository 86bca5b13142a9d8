use std::f64::consts::PI;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A weather station as listed in the reference file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub pk: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
    /// Meters above sea level.
    pub altitude: i32,
    pub priority: i32,
    pub private: bool,
    pub has_measurement: bool,
    pub has_warnregion: bool,
    pub country: String,
    pub active: bool,
}

/// Compass bearing in whole degrees.
///
/// Values are not validated; malformed upstream data can produce numbers
/// outside `0..360`, including negative ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Direction(i64);

impl Direction {
    pub const fn new(degrees: i64) -> Self {
        Self(degrees)
    }

    pub const fn degrees(self) -> i64 {
        self.0
    }

    pub fn radians(self) -> f32 {
        (self.0 as f64 * (PI / 180.0)) as f32
    }
}

impl From<i64> for Direction {
    fn from(degrees: i64) -> Self {
        Self(degrees)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

/// One day of a station forecast, in physical units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// km/h
    pub wind_gust: i64,
    /// km/h
    pub wind_speed: i64,
    pub day_date: NaiveDate,
    pub wind_direction: Direction,
    /// mm
    pub precipitation: f32,
    pub icon1: i64,
    pub icon2: i64,
    /// °C
    pub temperature_min: f32,
    /// °C
    pub temperature_max: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_degrees_are_unchanged() {
        assert_eq!(Direction::new(270).degrees(), 270);
        assert_eq!(Direction::from(-90).degrees(), -90);
    }

    #[test]
    fn direction_radians() {
        assert_eq!(Direction::new(0).radians(), 0.0);
        assert!((Direction::new(180).radians() - std::f32::consts::PI).abs() < 1e-6);
        assert!((Direction::new(90).radians() - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn direction_serializes_as_plain_number() {
        let json = serde_json::to_string(&Direction::new(45)).expect("serialize");
        assert_eq!(json, "45");
        assert_eq!(Direction::new(45).to_string(), "45°");
    }
}
