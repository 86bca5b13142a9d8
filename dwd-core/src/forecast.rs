//! Decoding of `stationOverview` responses.
//!
//! The service answers with an object keyed by station id, each value an
//! array of daily records whose numeric fields are scaled by 10.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::DwdError;
use crate::model::{Direction, Forecast};

const DAY_DATE_FORMAT: &str = "%Y-%m-%d";

/// A daily record as sent by the service.
///
/// Absent or `null` numbers decode as zero.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawForecast {
    #[serde(default)]
    pub wind_gust: Option<i64>,
    #[serde(default)]
    pub wind_speed: Option<i64>,
    #[serde(default)]
    pub day_date: Option<String>,
    #[serde(default)]
    pub wind_direction: Option<i64>,
    #[serde(default)]
    pub precipitation: Option<i64>,
    #[serde(default)]
    pub icon1: Option<i64>,
    #[serde(default)]
    pub icon2: Option<i64>,
    #[serde(default)]
    pub temperature_min: Option<i64>,
    #[serde(default)]
    pub temperature_max: Option<i64>,
}

pub type RawOverview = BTreeMap<String, Vec<RawForecast>>;

/// Convert one raw record into physical units.
pub fn normalize(raw: &RawForecast) -> Result<Forecast, DwdError> {
    let day_date = parse_day_date(raw.day_date.as_deref().unwrap_or_default())?;

    let scaled = |value: Option<i64>| value.unwrap_or_default() as f32 / 10.0;

    Ok(Forecast {
        wind_gust: raw.wind_gust.unwrap_or_default() / 10,
        wind_speed: raw.wind_speed.unwrap_or_default() / 10,
        day_date,
        wind_direction: rotate_direction(raw.wind_direction.unwrap_or_default()),
        precipitation: scaled(raw.precipitation),
        // The service's icon fields are cross-assigned; consumers rely on it.
        icon1: raw.icon2.unwrap_or_default(),
        icon2: raw.icon1.unwrap_or_default(),
        temperature_min: scaled(raw.temperature_min),
        temperature_max: scaled(raw.temperature_max),
    })
}

/// Parse a zero-padded `YYYY-MM-DD` date.
///
/// chrono alone also takes unpadded fields and a leading sign or space.
fn parse_day_date(value: &str) -> Result<NaiveDate, DwdError> {
    let invalid = |source| DwdError::InvalidDate {
        value: value.to_string(),
        source,
    };

    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(invalid(None));
    }

    NaiveDate::parse_from_str(value, DAY_DATE_FORMAT).map_err(|e| invalid(Some(e)))
}

/// Tenths of a degree to whole degrees, turned around by 180°.
///
/// Truncation happens before the rotation.
fn rotate_direction(raw: i64) -> Direction {
    Direction::new((raw / 10 + 180) % 360)
}

/// Pick the forecast entry for `station_id` and normalize it.
///
/// A key equal to `station_id` wins; otherwise the first key in sorted
/// order is used and the rest are ignored.
pub fn select_entry(
    mut overview: RawOverview,
    station_id: &str,
) -> Result<Vec<Forecast>, DwdError> {
    if overview.len() > 1 && !overview.contains_key(station_id) {
        warn!(
            station_id,
            keys = overview.len(),
            "Overview holds several entries but none for the requested station; using the first"
        );
    }

    let records = match overview.remove(station_id) {
        Some(records) => records,
        None => overview
            .into_values()
            .next()
            .ok_or(DwdError::NoForecastEntries)?,
    };

    debug!(station_id, days = records.len(), "Normalizing forecast entry");
    records.iter().map(normalize).collect()
}

/// Decode a raw response body.
pub fn decode_overview(body: &str, station_id: &str) -> Result<Vec<Forecast>, DwdError> {
    let overview: RawOverview = serde_json::from_str(body)?;
    select_entry(overview, station_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn sample_record() -> serde_json::Value {
        json!({
            "windGust": 50,
            "windSpeed": 30,
            "dayDate": "2023-05-01",
            "windDirection": 900,
            "precipitation": 25,
            "icon1": 3,
            "icon2": 7,
            "temperatureMin": 50,
            "temperatureMax": 180
        })
    }

    fn raw_with_direction(direction: i64) -> RawForecast {
        RawForecast {
            day_date: Some("2023-05-01".into()),
            wind_direction: Some(direction),
            ..RawForecast::default()
        }
    }

    #[test]
    fn normalizes_scaled_fields() {
        let body = json!({ "10637": [sample_record()] }).to_string();

        let forecasts = decode_overview(&body, "10637").expect("valid overview");
        assert_eq!(forecasts.len(), 1);

        let day = &forecasts[0];
        assert_eq!(day.wind_gust, 5);
        assert_eq!(day.wind_speed, 3);
        assert_eq!(
            day.day_date,
            NaiveDate::from_ymd_opt(2023, 5, 1).expect("valid date")
        );
        assert_eq!(day.wind_direction.degrees(), 270);
        assert_eq!(day.precipitation, 2.5);
        assert_eq!(day.icon1, 7);
        assert_eq!(day.icon2, 3);
        assert_eq!(day.temperature_min, 5.0);
        assert_eq!(day.temperature_max, 18.0);
    }

    #[test]
    fn integer_speeds_truncate() {
        let raw = RawForecast {
            wind_gust: Some(59),
            wind_speed: Some(-19),
            ..raw_with_direction(0)
        };

        let day = normalize(&raw).expect("valid record");
        assert_eq!(day.wind_gust, 5);
        assert_eq!(day.wind_speed, -1);
    }

    #[test]
    fn direction_truncates_before_rotation() {
        let a = normalize(&raw_with_direction(905)).expect("valid record");
        let b = normalize(&raw_with_direction(909)).expect("valid record");

        assert_eq!(a.wind_direction.degrees(), 270);
        assert_eq!(a.wind_direction, b.wind_direction);
    }

    #[test]
    fn direction_wraps_past_north() {
        let day = normalize(&raw_with_direction(2700)).expect("valid record");
        assert_eq!(day.wind_direction.degrees(), 90);

        let day = normalize(&raw_with_direction(1800)).expect("valid record");
        assert_eq!(day.wind_direction.degrees(), 0);
    }

    #[test]
    fn malformed_direction_is_not_clamped() {
        let day = normalize(&raw_with_direction(-2000)).expect("valid record");
        assert_eq!(day.wind_direction.degrees(), -20);
    }

    #[test]
    fn precipitation_keeps_fraction() {
        let raw = RawForecast {
            precipitation: Some(3),
            temperature_min: Some(-45),
            ..raw_with_direction(0)
        };

        let day = normalize(&raw).expect("valid record");
        assert_eq!(day.precipitation, 0.3);
        assert_eq!(day.temperature_min, -4.5);
    }

    #[test]
    fn empty_object_is_semantic_error() {
        let err = decode_overview("{}", "10637").unwrap_err();
        assert!(matches!(err, DwdError::NoForecastEntries));
        assert_eq!(err.kind(), ErrorKind::Semantic);
    }

    #[test]
    fn empty_entry_yields_empty_sequence() {
        let forecasts = decode_overview(r#"{"10637": []}"#, "10637").expect("valid overview");
        assert!(forecasts.is_empty());
    }

    #[test]
    fn bad_date_fails_whole_call() {
        let mut broken = sample_record();
        broken["dayDate"] = json!("01.05.2023");
        let body = json!({ "10637": [sample_record(), broken] }).to_string();

        let err = decode_overview(&body, "10637").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        match err {
            DwdError::InvalidDate { value, .. } => assert_eq!(value, "01.05.2023"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn dates_must_be_zero_padded() {
        for value in ["2023-5-1", "2023-05-1", " 2023-05-01", "+2023-05-01", "2023-05-01 "] {
            let raw = RawForecast {
                day_date: Some(value.into()),
                ..RawForecast::default()
            };

            match normalize(&raw) {
                Err(DwdError::InvalidDate { value: rejected, .. }) => assert_eq!(rejected, value),
                other => panic!("{value:?} should be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn impossible_calendar_date_is_rejected() {
        let raw = RawForecast {
            day_date: Some("2023-02-30".into()),
            ..RawForecast::default()
        };

        let err = normalize(&raw).unwrap_err();
        assert!(matches!(err, DwdError::InvalidDate { source: Some(_), .. }));
    }

    #[test]
    fn missing_date_is_decode_error() {
        let err = normalize(&RawForecast::default()).unwrap_err();
        assert!(matches!(err, DwdError::InvalidDate { .. }));
    }

    #[test]
    fn malformed_json_is_decode_error() {
        let err = decode_overview("[1, 2, 3]", "10637").unwrap_err();
        assert!(matches!(err, DwdError::Json(_)));
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn fractional_numbers_are_rejected() {
        let mut record = sample_record();
        record["windGust"] = json!(5.5);
        let body = json!({ "10637": [record] }).to_string();

        let err = decode_overview(&body, "10637").unwrap_err();
        assert!(matches!(err, DwdError::Json(_)));
    }

    #[test]
    fn null_and_missing_numbers_decode_as_zero() {
        let body = json!({
            "10637": [{ "dayDate": "2023-05-02", "windGust": null }]
        })
        .to_string();

        let forecasts = decode_overview(&body, "10637").expect("valid overview");
        let day = &forecasts[0];
        assert_eq!(day.wind_gust, 0);
        assert_eq!(day.wind_direction.degrees(), 180);
        assert_eq!(day.temperature_max, 0.0);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let mut record = sample_record();
        record["sunshine"] = json!(123);
        let body = json!({ "10637": [record] }).to_string();

        assert!(decode_overview(&body, "10637").is_ok());
    }

    #[test]
    fn key_is_not_required_to_match_request() {
        let body = json!({ "other": [sample_record()] }).to_string();

        let forecasts = decode_overview(&body, "10637").expect("valid overview");
        assert_eq!(forecasts.len(), 1);
    }

    #[test]
    fn matching_key_wins_over_first_key() {
        let mut other = sample_record();
        other["windGust"] = json!(990);
        let body = json!({
            "00001": [other],
            "10637": [sample_record()]
        })
        .to_string();

        let forecasts = decode_overview(&body, "10637").expect("valid overview");
        assert_eq!(forecasts[0].wind_gust, 5);
    }

    #[test]
    fn first_key_used_when_none_matches() {
        let mut later = sample_record();
        later["windGust"] = json!(990);
        let body = json!({
            "aaa": [sample_record()],
            "zzz": [later]
        })
        .to_string();

        let forecasts = decode_overview(&body, "10637").expect("valid overview");
        assert_eq!(forecasts[0].wind_gust, 5);
    }

    #[test]
    fn days_keep_response_order() {
        let mut second = sample_record();
        second["dayDate"] = json!("2023-05-02");
        let mut third = sample_record();
        third["dayDate"] = json!("2023-04-30");
        let body = json!({ "10637": [sample_record(), second, third] }).to_string();

        let days: Vec<_> = decode_overview(&body, "10637")
            .expect("valid overview")
            .into_iter()
            .map(|f| f.day_date.to_string())
            .collect();
        assert_eq!(days, ["2023-05-01", "2023-05-02", "2023-04-30"]);
    }
}
