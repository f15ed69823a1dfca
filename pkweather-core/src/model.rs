use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::{Number, Value};

use crate::{config::CountryConfig, error::WeatherError};

/// A validated city lookup. The name is trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    city: String,
}

impl WeatherQuery {
    pub fn new(city: &str) -> Result<Self, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::EmptyCity);
        }
        Ok(Self {
            city: city.to_string(),
        })
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    /// Upstream `q` parameter, scoped to one country: `"Lahore,PK"`.
    pub fn location(&self, country_code: &str) -> String {
        format!("{},{}", self.city, country_code)
    }
}

/// Body of a 2xx response whose `sys.country` matched the target country.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    payload: Value,
}

impl Observation {
    /// Accept `payload` only if it belongs to `country`.
    pub fn for_country(payload: Value, country: &CountryConfig) -> Result<Self, WeatherError> {
        let reported = payload.pointer("/sys/country").and_then(Value::as_str);

        if reported != Some(country.code.as_str()) {
            return Err(WeatherError::DomainRejection {
                demonym: country.demonym.clone(),
                country: reported.map(str::to_owned),
            });
        }

        Ok(Self { payload })
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn country_code(&self) -> &str {
        self.payload
            .pointer("/sys/country")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

/// A numeric reading kept in the representation the provider sent it in.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement(Number);

impl Measurement {
    pub fn as_f64(&self) -> Option<f64> {
        self.0.as_f64()
    }
}

impl From<Number> for Measurement {
    fn from(n: Number) -> Self {
        Self(n)
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// The fields of an observation that end up in a report.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherResult {
    pub city_name: Option<String>,
    pub country_code: String,
    pub temperature_c: Measurement,
    pub feels_like_c: Option<Measurement>,
    pub humidity_pct: Measurement,
    pub wind_speed_ms: Option<Measurement>,
    pub description: String,
    pub observed_at_utc: DateTime<Utc>,
}

impl WeatherResult {
    /// Extract report fields. Required fields that are missing or mistyped
    /// produce [`WeatherError::Parse`]; optional ones become `None`.
    pub fn from_observation(obs: &Observation) -> Result<Self, WeatherError> {
        let v = obs.payload();

        let dt = lookup(v, "/dt").ok_or_else(|| WeatherError::parse("dt", "missing field"))?;
        let observed_at_utc = unix_to_utc(dt)?;

        let description = lookup(v, "/weather/0/description")
            .ok_or_else(|| WeatherError::parse("weather[0].description", "missing field"))?
            .as_str()
            .ok_or_else(|| WeatherError::parse("weather[0].description", "expected a string"))?
            .to_string();

        let city_name = match lookup(v, "/name") {
            None => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(WeatherError::parse("name", "expected a string")),
        };

        Ok(Self {
            city_name,
            country_code: obs.country_code().to_string(),
            temperature_c: required_number(v, "/main/temp", "main.temp")?,
            feels_like_c: optional_number(v, "/main/feels_like", "main.feels_like")?,
            humidity_pct: required_number(v, "/main/humidity", "main.humidity")?,
            wind_speed_ms: optional_number(v, "/wind/speed", "wind.speed")?,
            description,
            observed_at_utc,
        })
    }
}

/// Integer seconds, or fractional seconds as some stations report them.
fn unix_to_utc(dt: &Value) -> Result<DateTime<Utc>, WeatherError> {
    let parsed = if let Some(secs) = dt.as_i64() {
        DateTime::<Utc>::from_timestamp(secs, 0)
    } else if let Some(secs) = dt.as_f64().filter(|f| f.is_finite()) {
        let whole = secs.floor();
        let nanos = ((secs - whole) * 1e9) as u32;
        if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
            None
        } else {
            DateTime::<Utc>::from_timestamp(whole as i64, nanos.min(999_999_999))
        }
    } else {
        return Err(WeatherError::parse("dt", "expected a UNIX timestamp"));
    };

    parsed.ok_or_else(|| WeatherError::parse("dt", format!("timestamp {dt} out of range")))
}

/// JSON `null` is treated the same as an absent key.
fn lookup<'a>(v: &'a Value, pointer: &str) -> Option<&'a Value> {
    v.pointer(pointer).filter(|value| !value.is_null())
}

fn required_number(v: &Value, pointer: &str, field: &str) -> Result<Measurement, WeatherError> {
    optional_number(v, pointer, field)?.ok_or_else(|| WeatherError::parse(field, "missing field"))
}

fn optional_number(
    v: &Value,
    pointer: &str,
    field: &str,
) -> Result<Option<Measurement>, WeatherError> {
    match lookup(v, pointer) {
        None => Ok(None),
        Some(Value::Number(n)) => Ok(Some(Measurement::from(n.clone()))),
        Some(other) => Err(WeatherError::parse(
            field,
            format!("expected a number, found {other}"),
        )),
    }
}

/// Result of one fetch: the sole contract between the client and its consumers.
#[derive(Debug)]
pub enum FetchOutcome {
    Success(Observation),
    Failure(WeatherError),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    /// Human-readable failure reason, if this is a failure.
    pub fn reason(&self) -> Option<String> {
        match self {
            FetchOutcome::Success(_) => None,
            FetchOutcome::Failure(err) => Some(err.to_string()),
        }
    }

    pub fn into_result(self) -> Result<Observation, WeatherError> {
        match self {
            FetchOutcome::Success(obs) => Ok(obs),
            FetchOutcome::Failure(err) => Err(err),
        }
    }
}

impl From<Result<Observation, WeatherError>> for FetchOutcome {
    fn from(result: Result<Observation, WeatherError>) -> Self {
        match result {
            Ok(obs) => FetchOutcome::Success(obs),
            Err(err) => FetchOutcome::Failure(err),
        }
    }
}
