use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::HashMap, convert::TryFrom};

/// Upstream forecast models StormGlass aggregates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Source {
    StormGlass,
    #[default]
    Noaa,
    Icon,
    Dwd,
    Meteo,
    MetOffice,
    Fcoo,
    Fmi,
    Yr,
    Smhi,
    Ecmwf,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::StormGlass => "sg",
            Source::Noaa => "noaa",
            Source::Icon => "icon",
            Source::Dwd => "dwd",
            Source::Meteo => "meteo",
            Source::MetOffice => "meto",
            Source::Fcoo => "fcoo",
            Source::Fmi => "fmi",
            Source::Yr => "yr",
            Source::Smhi => "smhi",
            Source::Ecmwf => "ecmwf",
        }
    }

    pub const fn all() -> &'static [Source] {
        &[
            Source::StormGlass,
            Source::Noaa,
            Source::Icon,
            Source::Dwd,
            Source::Meteo,
            Source::MetOffice,
            Source::Fcoo,
            Source::Fmi,
            Source::Yr,
            Source::Smhi,
            Source::Ecmwf,
        ]
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Source {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        Source::all()
            .iter()
            .copied()
            .find(|s| s.as_str() == lower)
            .ok_or_else(|| {
                let known: Vec<&str> = Source::all().iter().map(Source::as_str).collect();
                anyhow::anyhow!(
                    "Unknown source '{value}'. Supported sources: {}.",
                    known.join(", ")
                )
            })
    }
}

/// The seven measurements requested for every forecast hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    SwellDirection,
    SwellHeight,
    SwellPeriod,
    WaveDirection,
    WaveHeight,
    WindDirection,
    WindSpeed,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::SwellDirection => "swellDirection",
            Field::SwellHeight => "swellHeight",
            Field::SwellPeriod => "swellPeriod",
            Field::WaveDirection => "waveDirection",
            Field::WaveHeight => "waveHeight",
            Field::WindDirection => "windDirection",
            Field::WindSpeed => "windSpeed",
        }
    }

    pub const fn all() -> &'static [Field] {
        &[
            Field::SwellDirection,
            Field::SwellHeight,
            Field::SwellPeriod,
            Field::WaveDirection,
            Field::WaveHeight,
            Field::WindDirection,
            Field::WindSpeed,
        ]
    }

    /// Comma-joined wire names, as sent in the `params` query parameter.
    pub fn join(fields: &[Field]) -> String {
        fields.iter().map(Field::as_str).collect::<Vec<_>>().join(",")
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-source readings of a single field, keyed by source wire name.
///
/// Entries are kept as raw JSON so that a malformed reading under a source
/// that is never selected does not reject the whole payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct SourceValues(HashMap<String, Value>);

impl SourceValues {
    /// Numeric reading from `source`; null or non-numeric entries are `None`.
    pub fn get(&self, source: Source) -> Option<f64> {
        self.0.get(source.as_str()).and_then(Value::as_f64)
    }
}

/// One hour of provider data, before normalization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawHourPoint {
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub swell_direction: Option<SourceValues>,
    #[serde(default)]
    pub swell_height: Option<SourceValues>,
    #[serde(default)]
    pub swell_period: Option<SourceValues>,
    #[serde(default)]
    pub wave_direction: Option<SourceValues>,
    #[serde(default)]
    pub wave_height: Option<SourceValues>,
    #[serde(default)]
    pub wind_direction: Option<SourceValues>,
    #[serde(default)]
    pub wind_speed: Option<SourceValues>,
}

impl RawHourPoint {
    pub fn values(&self, field: Field) -> Option<&SourceValues> {
        match field {
            Field::SwellDirection => self.swell_direction.as_ref(),
            Field::SwellHeight => self.swell_height.as_ref(),
            Field::SwellPeriod => self.swell_period.as_ref(),
            Field::WaveDirection => self.wave_direction.as_ref(),
            Field::WaveHeight => self.wave_height.as_ref(),
            Field::WindDirection => self.wind_direction.as_ref(),
            Field::WindSpeed => self.wind_speed.as_ref(),
        }
    }

    /// Reading of `field` reported by `source`, if any.
    pub fn value(&self, field: Field, source: Source) -> Option<f64> {
        self.values(field).and_then(|v| v.get(source))
    }
}

/// Provider payload for `/weather/point`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawForecastResponse {
    pub hours: Vec<RawHourPoint>,
}

/// A normalized forecast hour with one value per field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    pub time: String,
    pub wave_height: f64,
    pub wave_direction: f64,
    pub swell_direction: f64,
    pub swell_height: f64,
    pub swell_period: f64,
    pub wind_direction: f64,
    pub wind_speed: f64,
}

impl ForecastPoint {
    /// `time` parsed as RFC 3339, if it is one.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.time)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_as_str_roundtrip() {
        for source in Source::all() {
            let parsed = Source::try_from(source.as_str()).expect("roundtrip should succeed");
            assert_eq!(*source, parsed);
        }
    }

    #[test]
    fn source_parse_is_case_insensitive() {
        assert_eq!(Source::try_from("NOAA").unwrap(), Source::Noaa);
    }

    #[test]
    fn unknown_source_error() {
        let err = Source::try_from("doesnotexist").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Unknown source"));
        assert!(msg.contains("noaa"));
    }

    #[test]
    fn fields_join_in_request_order() {
        assert_eq!(
            Field::join(Field::all()),
            "swellDirection,swellHeight,swellPeriod,waveDirection,waveHeight,windDirection,windSpeed"
        );
    }

    #[test]
    fn source_values_treat_null_as_missing() {
        let values: SourceValues =
            serde_json::from_str(r#"{"noaa": null, "sg": 1.5}"#).unwrap();

        assert_eq!(values.get(Source::Noaa), None);
        assert_eq!(values.get(Source::StormGlass), Some(1.5));
        assert_eq!(values.get(Source::Icon), None);
    }

    #[test]
    fn raw_hour_ignores_unknown_keys_and_missing_fields() {
        let hour: RawHourPoint = serde_json::from_str(
            r#"{"time": "2020-04-26T00:00:00+00:00", "airTemperature": {"noaa": 20.1}, "windSpeed": {"noaa": 3.2}}"#,
        )
        .unwrap();

        assert_eq!(hour.value(Field::WindSpeed, Source::Noaa), Some(3.2));
        assert_eq!(hour.value(Field::SwellHeight, Source::Noaa), None);
    }

    #[test]
    fn source_values_ignore_malformed_foreign_entries() {
        let values: SourceValues =
            serde_json::from_str(r#"{"noaa": 3.0, "meteo": "n/a", "sg": [1]}"#).unwrap();

        assert_eq!(values.get(Source::Noaa), Some(3.0));
        assert_eq!(values.get(Source::Meteo), None);
        assert_eq!(values.get(Source::StormGlass), None);
    }

    #[test]
    fn response_without_hours_is_rejected() {
        let res = serde_json::from_str::<RawForecastResponse>(r#"{"meta": {}}"#);
        assert!(res.is_err());
    }

    #[test]
    fn forecast_point_serializes_camel_case() {
        let point = ForecastPoint {
            time: "2020-04-26T00:00:00+00:00".into(),
            wave_height: 0.47,
            wave_direction: 231.38,
            swell_direction: 64.26,
            swell_height: 0.15,
            swell_period: 3.89,
            wind_direction: 299.45,
            wind_speed: 100.0,
        };

        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["waveHeight"], 0.47);
        assert_eq!(json["swellPeriod"], 3.89);

        let ts = point.timestamp().expect("rfc3339 time");
        assert_eq!(ts.to_rfc3339(), "2020-04-26T00:00:00+00:00");
    }
}
