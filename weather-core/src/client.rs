use log::debug;

use crate::{
    error::WeatherError,
    model::WeatherOutput,
    query::{QueryMode, ResponseFormat, WeatherQuery},
    transport::{HttpTransportFactory, Transport, TransportFactory, TransportOptions},
};

/// Endpoint of the provider's weather information API.
pub const WEATHER_INFO_URL: &str = "https://restapi.amap.com/v3/weather/weatherInfo";

/// Client for the weather information API.
///
/// Holds the API key and the transport options applied to every request. Changing the
/// options takes `&mut self`, so it cannot overlap with a request borrowing the client.
#[derive(Debug, Clone)]
pub struct WeatherClient<F = HttpTransportFactory> {
    key: String,
    transport_options: TransportOptions,
    factory: F,
}

impl WeatherClient {
    pub fn new(key: impl Into<String>) -> Self {
        Self::with_factory(key, HttpTransportFactory)
    }
}

impl<F: TransportFactory> WeatherClient<F> {
    /// Build a client whose requests go through transports made by `factory`.
    pub fn with_factory(key: impl Into<String>, factory: F) -> Self {
        Self {
            key: key.into(),
            transport_options: TransportOptions::default(),
            factory,
        }
    }

    pub fn transport_options(&self) -> &TransportOptions {
        &self.transport_options
    }

    /// Replace the transport options used by subsequent requests.
    pub fn set_transport_options(&mut self, options: TransportOptions) {
        self.transport_options = options;
    }

    /// A fresh transport reflecting the current options.
    pub fn build_transport(&self) -> F::Transport {
        self.factory.build(&self.transport_options)
    }

    pub async fn get_live_weather(&self, city: &str, format: &str) -> Result<WeatherOutput, WeatherError> {
        self.fetch_weather(city, QueryMode::Live.as_str(), format).await
    }

    pub async fn get_forecasts_weather(
        &self,
        city: &str,
        format: &str,
    ) -> Result<WeatherOutput, WeatherError> {
        self.fetch_weather(city, QueryMode::Forecast.as_str(), format).await
    }

    /// Validate `mode` and `format` (case-insensitive, format first) and query the API.
    pub async fn fetch_weather(
        &self,
        city: &str,
        mode: &str,
        format: &str,
    ) -> Result<WeatherOutput, WeatherError> {
        let format: ResponseFormat = format.parse()?;
        let mode: QueryMode = mode.parse()?;

        self.fetch(city, mode, format).await
    }

    /// Query the API with already validated parameters.
    pub async fn fetch(
        &self,
        city: &str,
        mode: QueryMode,
        format: ResponseFormat,
    ) -> Result<WeatherOutput, WeatherError> {
        let query = WeatherQuery::new(&self.key, city, mode, format);

        debug!("requesting {mode} weather for {city:?} as {format}");

        let body = self
            .build_transport()
            .get(WEATHER_INFO_URL, &query.pairs())
            .await
            .inspect_err(|err| debug!("weather request failed: {err}"))?;

        debug!("received {} bytes of {format}", body.len());

        match format {
            ResponseFormat::Json => Ok(WeatherOutput::Json(serde_json::from_str(&body)?)),
            ResponseFormat::Xml => Ok(WeatherOutput::Xml(body)),
        }
    }
}
