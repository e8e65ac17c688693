use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const REPORT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Body returned by [`WeatherClient::fetch_weather`](crate::WeatherClient::fetch_weather).
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherOutput {
    /// Parsed JSON body.
    Json(Value),
    /// Raw XML text, left unparsed.
    Xml(String),
}

impl WeatherOutput {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            WeatherOutput::Json(value) => Some(value),
            WeatherOutput::Xml(_) => None,
        }
    }

    pub fn as_xml(&self) -> Option<&str> {
        match self {
            WeatherOutput::Json(_) => None,
            WeatherOutput::Xml(text) => Some(text),
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            WeatherOutput::Json(value) => Some(value),
            WeatherOutput::Xml(_) => None,
        }
    }
}

/// Typed view of the provider's JSON envelope.
///
/// The provider encodes every field, counts included, as a string. A request the
/// provider rejects (bad key, quota) still comes back as HTTP 200 with `status = "0"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherReport {
    pub status: String,
    pub count: String,
    pub info: String,
    pub infocode: String,
    pub lives: Vec<LiveWeather>,
    pub forecasts: Vec<Forecast>,
}

impl WeatherReport {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn is_success(&self) -> bool {
        self.status == "1"
    }

    /// Turn a provider-side rejection into an error.
    pub fn ensure_success(self) -> anyhow::Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(anyhow::anyhow!(
                "Weather service rejected the request: {} (infocode {})",
                self.info,
                self.infocode
            ))
        }
    }
}

/// Current observation for one city.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveWeather {
    pub province: String,
    pub city: String,
    pub adcode: String,
    pub weather: String,
    pub temperature: String,
    pub winddirection: String,
    pub windpower: String,
    pub humidity: String,
    pub reporttime: String,
}

impl LiveWeather {
    pub fn report_time(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.reporttime, REPORT_TIME_FORMAT).ok()
    }
}

/// Multi-day forecast for one city.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Forecast {
    pub city: String,
    pub adcode: String,
    pub province: String,
    pub reporttime: String,
    pub casts: Vec<Cast>,
}

impl Forecast {
    pub fn report_time(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.reporttime, REPORT_TIME_FORMAT).ok()
    }
}

/// One forecast day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cast {
    pub date: String,
    pub week: String,
    pub dayweather: String,
    pub nightweather: String,
    pub daytemp: String,
    pub nighttemp: String,
    pub daywind: String,
    pub nightwind: String,
    pub daypower: String,
    pub nightpower: String,
}

impl Cast {
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    #[test]
    fn live_report_parses() {
        let value = json!({
            "status": "1",
            "count": "1",
            "info": "OK",
            "infocode": "10000",
            "lives": [{
                "province": "广东",
                "city": "深圳市",
                "adcode": "440300",
                "weather": "多云",
                "temperature": "27",
                "winddirection": "东南",
                "windpower": "≤3",
                "humidity": "78",
                "reporttime": "2024-05-01 10:30:00",
                "temperature_float": "27.0"
            }]
        });

        let report = WeatherReport::from_value(value).expect("live payload must parse");
        assert!(report.is_success());
        assert!(report.forecasts.is_empty());

        let live = &report.lives[0];
        assert_eq!(live.city, "深圳市");
        assert_eq!(live.weather, "多云");

        let at = live.report_time().expect("reporttime must parse");
        assert_eq!((at.hour(), at.minute()), (10, 30));
    }

    #[test]
    fn forecast_report_parses() {
        let value = json!({
            "status": "1",
            "count": "1",
            "info": "OK",
            "infocode": "10000",
            "forecasts": [{
                "city": "深圳市",
                "adcode": "440300",
                "province": "广东",
                "reporttime": "2024-05-01 11:00:00",
                "casts": [{
                    "date": "2024-05-02",
                    "week": "4",
                    "dayweather": "雷阵雨",
                    "nightweather": "阵雨",
                    "daytemp": "30",
                    "nighttemp": "24",
                    "daywind": "南",
                    "nightwind": "南",
                    "daypower": "1-3",
                    "nightpower": "1-3"
                }]
            }]
        });

        let report = WeatherReport::from_value(value).expect("forecast payload must parse");
        let forecast = &report.forecasts[0];
        assert!(forecast.report_time().is_some());

        let day = forecast.casts[0].date().expect("date must parse");
        assert_eq!((day.month(), day.day()), (5, 2));
    }

    #[test]
    fn rejected_request_is_an_error() {
        let value = json!({
            "status": "0",
            "info": "INVALID_USER_KEY",
            "infocode": "10001"
        });

        let report = WeatherReport::from_value(value).expect("error payload must parse");
        assert!(!report.is_success());

        let err = report.ensure_success().unwrap_err();
        assert!(err.to_string().contains("INVALID_USER_KEY"));
        assert!(err.to_string().contains("10001"));
    }

    #[test]
    fn malformed_report_time_is_none() {
        let live = LiveWeather {
            reporttime: "yesterday".into(),
            ..Default::default()
        };
        assert!(live.report_time().is_none());
    }

    #[test]
    fn output_accessors() {
        let json = WeatherOutput::Json(json!({"success": true}));
        assert_eq!(json.as_json(), Some(&json!({"success": true})));
        assert!(json.as_xml().is_none());

        let xml = WeatherOutput::Xml("<response/>".into());
        assert_eq!(xml.as_xml(), Some("<response/>"));
        assert!(xml.into_json().is_none());
    }
}
