//! Client library for the AMap weather information API.
//!
//! This crate defines:
//! - [`WeatherClient`], which validates a query, sends it through a pluggable transport
//!   and decodes the body as JSON or hands back raw XML
//! - Transport configuration and the default reqwest-backed transport
//! - Typed views of the provider payloads
//! - On-disk configuration for hosts that need to store a key
//!
//! It is used by `amap-weather-cli`, but can also be embedded in other binaries or services.
//!
//! ```no_run
//! # async fn run() -> Result<(), amap_weather_core::WeatherError> {
//! use amap_weather_core::{TransportOptions, WeatherClient};
//!
//! let mut client = WeatherClient::new("your-key");
//! client.set_transport_options(TransportOptions::new().with("timeout", 5));
//!
//! let live = client.get_live_weather("440300", "json").await?;
//! println!("{live:?}");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod query;
pub mod transport;

pub use client::{WEATHER_INFO_URL, WeatherClient};
pub use config::Config;
pub use error::{TransportError, WeatherError};
pub use model::{Cast, Forecast, LiveWeather, WeatherOutput, WeatherReport};
pub use query::{QueryMode, ResponseFormat, WeatherQuery};
pub use transport::{HttpTransport, HttpTransportFactory, Transport, TransportFactory, TransportOptions};
