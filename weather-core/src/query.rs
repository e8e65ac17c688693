use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// What kind of weather to ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// Current observations.
    #[default]
    Live,
    /// Multi-day forecast.
    Forecast,
}

impl QueryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryMode::Live => "live",
            QueryMode::Forecast => "forecast",
        }
    }

    /// Value of the `extensions` query parameter understood by the provider.
    pub fn token(&self) -> &'static str {
        match self {
            QueryMode::Live => "base",
            QueryMode::Forecast => "all",
        }
    }

    pub const fn all() -> &'static [QueryMode] {
        &[QueryMode::Live, QueryMode::Forecast]
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryMode {
    type Err = WeatherError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "live" => Ok(QueryMode::Live),
            "forecast" => Ok(QueryMode::Forecast),
            _ => Err(WeatherError::InvalidArgument(format!(
                "Invalid type value(live/forecast): {value}"
            ))),
        }
    }
}

/// Body format requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Json,
    Xml,
}

impl ResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "json",
            ResponseFormat::Xml => "xml",
        }
    }

    pub const fn all() -> &'static [ResponseFormat] {
        &[ResponseFormat::Json, ResponseFormat::Xml]
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseFormat {
    type Err = WeatherError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "json" => Ok(ResponseFormat::Json),
            "xml" => Ok(ResponseFormat::Xml),
            _ => Err(WeatherError::InvalidArgument(format!(
                "Invalid response format: {value}"
            ))),
        }
    }
}

/// Parameters of a single weather request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    pub key: String,
    pub city: String,
    pub output: ResponseFormat,
    pub extensions: QueryMode,
}

impl WeatherQuery {
    pub fn new(key: &str, city: &str, mode: QueryMode, format: ResponseFormat) -> Self {
        Self {
            key: key.to_owned(),
            city: city.to_owned(),
            output: format,
            extensions: mode,
        }
    }

    /// Query string pairs in request order. Empty values are left out: the provider
    /// treats a missing parameter differently from an empty one.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("key", self.key.as_str()),
            ("city", self.city.as_str()),
            ("output", self.output.as_str()),
            ("extensions", self.extensions.token()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| (name, value.to_owned()))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_as_str_roundtrip() {
        for mode in QueryMode::all() {
            let parsed: QueryMode = mode.as_str().parse().expect("roundtrip should succeed");
            assert_eq!(*mode, parsed);
        }
    }

    #[test]
    fn format_as_str_roundtrip() {
        for format in ResponseFormat::all() {
            let parsed: ResponseFormat = format.as_str().parse().expect("roundtrip should succeed");
            assert_eq!(*format, parsed);
        }
    }

    #[test]
    fn parsing_ignores_case() {
        assert_eq!("FORECAST".parse::<QueryMode>().unwrap(), QueryMode::Forecast);
        assert_eq!("Live".parse::<QueryMode>().unwrap(), QueryMode::Live);
        assert_eq!("XML".parse::<ResponseFormat>().unwrap(), ResponseFormat::Xml);
        assert_eq!("Json".parse::<ResponseFormat>().unwrap(), ResponseFormat::Json);
    }

    #[test]
    fn modes_map_to_provider_tokens() {
        assert_eq!(QueryMode::Live.token(), "base");
        assert_eq!(QueryMode::Forecast.token(), "all");
    }

    #[test]
    fn provider_tokens_are_not_accepted_as_modes() {
        let err = "all".parse::<QueryMode>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid type value(live/forecast): all");

        let err = "base".parse::<QueryMode>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid type value(live/forecast): base");
    }

    #[test]
    fn unknown_format_keeps_original_spelling_in_message() {
        let err = "ARRAY".parse::<ResponseFormat>().unwrap_err();
        assert!(matches!(err, WeatherError::InvalidArgument(_)));
        assert_eq!(err.to_string(), "Invalid response format: ARRAY");
    }

    #[test]
    fn pairs_contain_every_non_empty_value() {
        let query = WeatherQuery::new("mock-key", "深圳", QueryMode::Forecast, ResponseFormat::Xml);

        assert_eq!(
            query.pairs(),
            vec![
                ("key", "mock-key".to_string()),
                ("city", "深圳".to_string()),
                ("output", "xml".to_string()),
                ("extensions", "all".to_string()),
            ]
        );
    }

    #[test]
    fn pairs_drop_empty_city_and_key() {
        let query = WeatherQuery::new("", "", QueryMode::Live, ResponseFormat::Json);

        let pairs = query.pairs();
        assert_eq!(
            pairs,
            vec![("output", "json".to_string()), ("extensions", "base".to_string())]
        );
        assert!(pairs.iter().all(|(_, value)| !value.is_empty()));
    }
}
