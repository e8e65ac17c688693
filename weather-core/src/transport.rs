//! HTTP transport used by [`WeatherClient`](crate::WeatherClient).
//!
//! The client never holds a live HTTP client. Each request asks a [`TransportFactory`]
//! for a fresh [`Transport`] built from a snapshot of the current [`TransportOptions`],
//! which also lets tests swap the network out entirely.

use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use reqwest::{
    Client,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::TransportError;

/// Loosely typed transport configuration, e.g. `{"timeout": 5, "proxy": "http://..."}`.
///
/// Keys understood by [`HttpTransport`]:
/// - `timeout`, `connect_timeout`: seconds, `0` disables
/// - `proxy`: proxy URL for all schemes
/// - `headers`: object of header name to value
/// - `verify`: `false` skips TLS certificate checks
/// - `http_errors`: `false` returns the body of non-2xx responses instead of failing
///
/// Other keys are kept as-is and can be read back, but have no effect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransportOptions(Map<String, Value>);

impl TransportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl From<Map<String, Value>> for TransportOptions {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for TransportOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl TryFrom<Value> for TransportOptions {
    type Error = TransportError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(TransportError::new(format!(
                "Transport options must be an object, got: {other}"
            ))),
        }
    }
}

/// Minimal capability the client needs from an HTTP stack.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// Send a GET to `url` with the given query pairs and return the body text.
    async fn get(&self, url: &str, query: &[(&'static str, String)]) -> Result<String, TransportError>;
}

/// Builds a [`Transport`] from the options current at call time.
pub trait TransportFactory: Send + Sync + Debug {
    type Transport: Transport;

    fn build(&self, options: &TransportOptions) -> Self::Transport;
}

/// Default factory producing [`HttpTransport`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpTransportFactory;

impl TransportFactory for HttpTransportFactory {
    type Transport = HttpTransport;

    fn build(&self, options: &TransportOptions) -> HttpTransport {
        HttpTransport::new(options.clone())
    }
}

/// reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    options: TransportOptions,
}

impl HttpTransport {
    pub fn new(options: TransportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TransportOptions {
        &self.options
    }

    /// Read back a single configuration value.
    pub fn config(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    fn build_client(&self) -> Result<Client, TransportError> {
        let mut builder = Client::builder();

        if let Some(timeout) = self.seconds("timeout")? {
            builder = builder.timeout(timeout);
        }

        if let Some(timeout) = self.seconds("connect_timeout")? {
            builder = builder.connect_timeout(timeout);
        }

        if let Some(proxy_url) = self.string("proxy")? {
            let proxy = reqwest::Proxy::all(proxy_url).map_err(|err| {
                TransportError::new(format!("Invalid `proxy` transport option: {err}"))
                    .with_source(err)
            })?;
            builder = builder.proxy(proxy);
        }

        if let Some(headers) = self.headers()? {
            builder = builder.default_headers(headers);
        }

        if !self.flag("verify", true)? {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder.build().map_err(TransportError::from)
    }

    fn seconds(&self, key: &str) -> Result<Option<Duration>, TransportError> {
        let Some(value) = self.present(key) else {
            return Ok(None);
        };

        let secs = value
            .as_f64()
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .ok_or_else(|| invalid_option(key, value))?;

        Ok((!secs.is_zero()).then_some(secs))
    }

    fn string(&self, key: &str) -> Result<Option<&str>, TransportError> {
        match self.present(key) {
            None => Ok(None),
            Some(value) => value.as_str().map(Some).ok_or_else(|| invalid_option(key, value)),
        }
    }

    fn flag(&self, key: &str, default: bool) -> Result<bool, TransportError> {
        match self.present(key) {
            None => Ok(default),
            Some(value) => value.as_bool().ok_or_else(|| invalid_option(key, value)),
        }
    }

    fn headers(&self) -> Result<Option<HeaderMap>, TransportError> {
        let Some(value) = self.present("headers") else {
            return Ok(None);
        };
        let entries = value.as_object().ok_or_else(|| invalid_option("headers", value))?;

        let mut headers = HeaderMap::with_capacity(entries.len());
        for (name, value) in entries {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => return Err(invalid_option(&format!("headers.{name}"), other)),
            };

            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
                TransportError::new(format!("Invalid header name `{name}`: {err}"))
                    .with_source(err)
            })?;
            let value = HeaderValue::from_str(&text).map_err(|err| {
                TransportError::new(format!("Invalid value for header `{name}`: {err}"))
                    .with_source(err)
            })?;
            headers.insert(name, value);
        }

        Ok(Some(headers))
    }

    fn present(&self, key: &str) -> Option<&Value> {
        self.options.get(key).filter(|value| !value.is_null())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, query: &[(&'static str, String)]) -> Result<String, TransportError> {
        let http = self.build_client()?;

        let res = http.get(url).query(query).send().await?;

        let status = res.status();
        if !status.is_success() && self.flag("http_errors", true)? {
            let body = res.text().await.unwrap_or_default();
            return Err(TransportError::new(format!(
                "GET {url} failed with status {status}: {}",
                truncate_body(&body),
            ))
            .with_code(status.as_u16()));
        }

        Ok(res.text().await?)
    }
}

fn invalid_option(key: &str, value: &Value) -> TransportError {
    TransportError::new(format!("Invalid `{key}` transport option: {value}"))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
