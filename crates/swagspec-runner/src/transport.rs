//! HTTP transport: sends resolved requests and captures the response

use std::collections::HashMap;
use std::time::{Duration, Instant};

use swagspec_core::metadata::MULTIPART_FORM;
use swagspec_core::values::param_string;
use swagspec_core::{Config, Payload, ResolvedRequest, ResponseSnapshot};

/// Sends one request and reports what came back
pub trait Transport {
    /// # Errors
    ///
    /// Returns error if the request cannot be sent or no response arrives.
    fn send(&self, request: &ResolvedRequest) -> Result<ResponseSnapshot, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &ResolvedRequest) -> Result<ResponseSnapshot, TransportError> {
        (**self).send(request)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP client error: {0}")]
    Client(String),
    #[error("invalid HTTP method '{0}'")]
    Method(String),
    #[error("{label}: {message}")]
    Send { label: String, message: String },
}

/// `reqwest` blocking transport against a fixed base URL
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: String,
    headers: HashMap<String, String>,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        headers: HashMap<String, String>,
    ) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            headers,
        })
    }

    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
            config.headers.clone(),
        )
    }

    #[must_use]
    pub fn url(&self, request: &ResolvedRequest) -> String {
        format!("{}{}", self.base_url, request.path)
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ResolvedRequest) -> Result<ResponseSnapshot, TransportError> {
        let method = reqwest::Method::from_bytes(request.verb.as_method().as_bytes())
            .map_err(|_| TransportError::Method(request.verb.to_string()))?;
        let multipart = request
            .content_type()
            .is_some_and(|ct| ct.split(';').next().unwrap_or("").trim() == MULTIPART_FORM);

        let mut req = self.client.request(method, self.url(request));

        // Configured defaults yield to anything the request sets itself.
        for (name, value) in &self.headers {
            let overridden = request
                .canonical_headers()
                .any(|(own, _)| own.eq_ignore_ascii_case(name));
            if !overridden && reqwest::header::HeaderValue::from_str(value).is_ok() {
                req = req.header(name, value);
            }
        }
        for (name, value) in request.canonical_headers() {
            // reqwest writes the multipart boundary into Content-Type
            if multipart && name.eq_ignore_ascii_case("content-type") {
                continue;
            }
            if reqwest::header::HeaderValue::from_str(value).is_ok() {
                req = req.header(name, value);
            }
        }

        match &request.payload {
            Some(Payload::Form(fields)) if multipart => {
                let form = fields
                    .iter()
                    .fold(reqwest::blocking::multipart::Form::new(), |form, (k, v)| {
                        form.text(k.clone(), param_string(v))
                    });
                req = req.multipart(form);
            }
            Some(Payload::Form(fields)) => {
                let pairs: Vec<(&str, String)> = fields
                    .iter()
                    .map(|(k, v)| (k.as_str(), param_string(v)))
                    .collect();
                req = req.form(&pairs);
            }
            Some(Payload::Json(text) | Payload::Xml(text)) => {
                req = req.body(text.clone());
            }
            None => {}
        }

        let label = format!("{} {}", request.verb, request.path);
        let start = Instant::now();
        let resp = req.send().map_err(|e| TransportError::Send {
            label: label.clone(),
            message: e.to_string(),
        })?;
        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let status_code = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = resp.text().map_err(|e| TransportError::Send {
            label,
            message: e.to_string(),
        })?;

        Ok(ResponseSnapshot {
            status_code,
            headers,
            body: (!body.is_empty()).then_some(body),
            latency_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use swagspec_core::{HeaderCasing, Verb};

    #[test]
    fn url_joins_base_and_path() {
        let transport =
            HttpTransport::new("http://localhost:3000/", Duration::from_secs(1), HashMap::new()).unwrap();
        let request = ResolvedRequest {
            verb: Verb::Get,
            path: "/api/widgets?page=2".to_string(),
            headers: BTreeMap::new(),
            payload: None,
            casing: HeaderCasing::Canonical,
        };
        assert_eq!(transport.url(&request), "http://localhost:3000/api/widgets?page=2");
    }

    #[test]
    fn from_config_uses_base_url() {
        let config = Config {
            base_url: "http://api.test".to_string(),
            ..Config::default()
        };
        let transport = HttpTransport::from_config(&config).unwrap();
        assert_eq!(transport.base_url, "http://api.test");
    }

    #[test]
    fn unreachable_server_is_send_error() {
        let transport =
            HttpTransport::new("http://127.0.0.1:1", Duration::from_millis(200), HashMap::new()).unwrap();
        let request = ResolvedRequest {
            verb: Verb::Get,
            path: "/ping".to_string(),
            headers: BTreeMap::new(),
            payload: None,
            casing: HeaderCasing::Canonical,
        };
        let err = transport.send(&request).unwrap_err();
        assert!(matches!(err, TransportError::Send { ref label, .. } if label == "GET /ping"));
    }
}
