//! Turning an [`Observation`] into the text shown to the user, and saving it.

use std::{fmt, fs, path::Path};

use anyhow::anyhow;
use chrono::FixedOffset;
use tracing::debug;

use crate::{
    config::CountryConfig,
    error::WeatherError,
    model::{Measurement, Observation, WeatherResult},
};

/// Printed in place of an optional field the provider left out.
const ABSENT: &str = "None";

/// A rendered weather report. The text is exactly what gets displayed and saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    text: String,
}

impl Report {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Write the report verbatim to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<(), WeatherError> {
        fs::write(path, self.text.as_bytes()).map_err(|source| WeatherError::Persistence {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = self.text.len(), "report saved");
        Ok(())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Renders reports with a fixed UTC offset for local time.
#[derive(Debug, Clone)]
pub struct ReportFormatter {
    offset: FixedOffset,
    zone_label: String,
}

impl ReportFormatter {
    pub fn new(utc_offset_hours: i32, zone_label: impl Into<String>) -> anyhow::Result<Self> {
        let offset = utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| anyhow!("UTC offset of {utc_offset_hours} hours is out of range"))?;

        Ok(Self {
            offset,
            zone_label: zone_label.into(),
        })
    }

    /// Formatter for a country's fixed offset, labelled "<Name> Time".
    pub fn for_country(country: &CountryConfig) -> anyhow::Result<Self> {
        Self::new(country.utc_offset_hours, format!("{} Time", country.name))
    }

    /// Extract and format in one step.
    pub fn render(&self, obs: &Observation) -> Result<Report, WeatherError> {
        let result = WeatherResult::from_observation(obs)?;
        Ok(Report {
            text: self.format(&result),
        })
    }

    /// Eight newline-separated lines, no trailing newline. Pure.
    pub fn format(&self, r: &WeatherResult) -> String {
        let utc = r.observed_at_utc;
        let local = utc.with_timezone(&self.offset);

        let lines = [
            format!(
                "Weather report for {}, {}",
                r.city_name.as_deref().unwrap_or(ABSENT),
                r.country_code
            ),
            format!("Time (UTC): {}", utc.format("%Y-%m-%d %H:%M UTC")),
            format!(
                "Local Time: {} ({})",
                local.format("%Y-%m-%d %I:%M %p"),
                self.zone_label
            ),
            format!("Description: {}", title_case(&r.description)),
            format!("Temperature: {} °C", r.temperature_c),
            format!("Feels like: {} °C", or_absent(r.feels_like_c.as_ref())),
            format!("Humidity: {} %", r.humidity_pct),
            format!("Wind speed: {} m/s", or_absent(r.wind_speed_ms.as_ref())),
        ];

        lines.join("\n")
    }
}

fn or_absent(m: Option<&Measurement>) -> String {
    m.map_or_else(|| ABSENT.to_string(), Measurement::to_string)
}

/// Upper-case the first letter of every run of letters, lower-case the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, NaiveDateTime, Timelike, Utc};
    use serde_json::{Value, json};

    fn formatter() -> ReportFormatter {
        ReportFormatter::for_country(&CountryConfig::default()).unwrap()
    }

    fn observation(payload: Value) -> Observation {
        Observation::for_country(payload, &CountryConfig::default()).unwrap()
    }

    fn lahore() -> Value {
        json!({
            "name": "Lahore",
            "sys": { "country": "PK" },
            "main": { "temp": 18.0, "feels_like": 17.33, "humidity": 63 },
            "wind": { "speed": 2.06 },
            "weather": [{ "description": "smoke" }],
            "dt": 1700000000
        })
    }

    #[test]
    fn renders_full_report() {
        let report = formatter().render(&observation(lahore())).unwrap();

        let expected = "Weather report for Lahore, PK\n\
                        Time (UTC): 2023-11-14 22:13 UTC\n\
                        Local Time: 2023-11-15 03:13 AM (Pakistan Time)\n\
                        Description: Smoke\n\
                        Temperature: 18.0 °C\n\
                        Feels like: 17.33 °C\n\
                        Humidity: 63 %\n\
                        Wind speed: 2.06 m/s";
        assert_eq!(report.as_str(), expected);
    }

    #[test]
    fn missing_optional_fields_render_placeholder() {
        let mut payload = lahore();
        payload["main"].as_object_mut().unwrap().remove("feels_like");
        payload.as_object_mut().unwrap().remove("wind");

        let text = formatter().render(&observation(payload)).unwrap().into_string();
        assert!(text.contains("\nFeels like: None °C\n"));
        assert!(text.ends_with("\nWind speed: None m/s"));
    }

    #[test]
    fn missing_temperature_fails_with_parse_error() {
        let mut payload = lahore();
        payload["main"].as_object_mut().unwrap().remove("temp");

        match formatter().render(&observation(payload)).unwrap_err() {
            WeatherError::Parse { field, .. } => assert_eq!(field, "main.temp"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn format_is_deterministic() {
        let result = WeatherResult::from_observation(&observation(lahore())).unwrap();
        let f = formatter();
        assert_eq!(f.format(&result), f.format(&result.clone()));
        assert_eq!(f.format(&result).lines().count(), 8);
    }

    #[test]
    fn local_time_is_utc_plus_offset() {
        let f = formatter();
        let mut result = WeatherResult::from_observation(&observation(lahore())).unwrap();

        for ts in [0_i64, 1_700_000_000, 1_719_792_000, 1_735_671_599, 1_741_000_000] {
            let utc = DateTime::<Utc>::from_timestamp(ts, 0).unwrap();
            result.observed_at_utc = utc;
            let text = f.format(&result);

            let local_line = text.lines().nth(2).unwrap();
            let local = local_line
                .strip_prefix("Local Time: ")
                .and_then(|s| s.strip_suffix(" (Pakistan Time)"))
                .unwrap();
            let parsed = NaiveDateTime::parse_from_str(local, "%Y-%m-%d %I:%M %p").unwrap();

            let expected = (utc + Duration::hours(5)).naive_utc();
            assert_eq!(parsed, expected.with_second(0).unwrap());
        }
    }

    #[test]
    fn afternoon_uses_pm() {
        let mut payload = lahore();
        // 2024-01-01 09:30 UTC
        payload["dt"] = json!(1704101400);
        let text = formatter().render(&observation(payload)).unwrap().into_string();
        assert!(text.contains("Time (UTC): 2024-01-01 09:30 UTC"));
        assert!(text.contains("Local Time: 2024-01-01 02:30 PM (Pakistan Time)"));
    }

    #[test]
    fn numbers_keep_source_precision() {
        let mut payload = lahore();
        payload["main"]["temp"] = json!(31);
        payload["main"]["feels_like"] = json!(33.87);
        let text = formatter().render(&observation(payload)).unwrap().into_string();
        assert!(text.contains("Temperature: 31 °C"));
        assert!(text.contains("Feels like: 33.87 °C"));
    }

    #[test]
    fn other_offset_and_label() {
        let f = ReportFormatter::new(-3, "Test Time").unwrap();
        let result = WeatherResult::from_observation(&observation(lahore())).unwrap();
        assert!(f.format(&result).contains("Local Time: 2023-11-14 07:13 PM (Test Time)"));
    }

    #[test]
    fn out_of_range_offset_is_rejected() {
        assert!(ReportFormatter::new(24, "Nope").is_err());
        assert!(ReportFormatter::new(i32::MAX, "Nope").is_err());
    }

    #[test]
    fn title_case_matches_word_boundaries() {
        assert_eq!(title_case("scattered clouds"), "Scattered Clouds");
        assert_eq!(title_case("LIGHT rain"), "Light Rain");
        assert_eq!(
            title_case("thunderstorm with heavy-drizzle"),
            "Thunderstorm With Heavy-Drizzle"
        );
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn saved_report_reads_back_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        let report = formatter().render(&observation(lahore())).unwrap();

        report.save(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), report.as_str());

        // Saving again replaces rather than appends.
        report.save(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), report.as_str());
    }

    #[test]
    fn save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.txt");
        let report = formatter().render(&observation(lahore())).unwrap();

        let err = report.save(&path).unwrap_err();
        assert!(matches!(err, WeatherError::Persistence { .. }));
        assert!(err.to_string().contains("report.txt"));
    }
}
