//! REST client for the instance lifecycle

use async_trait::async_trait;
use mt_core::config::ClientConfig;
use mt_core::traits::InstanceApi;
use mt_core::{ApiError, ConfigError, Instance, InstanceId, MtError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{StatusCode, Url};
use serde::Deserialize;

use crate::headers::service_headers;

/// Error body returned by the service
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    error: String,
}

/// Creates and destroys instances over HTTP
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base: Url,
}

impl RestClient {
    /// Build a client for the configured service URL
    ///
    /// The identification headers are attached to every request.
    pub fn new(config: &ClientConfig) -> Result<Self, MtError> {
        let base = Url::parse(&config.url).map_err(|e| ConfigError::InvalidUrl {
            url: config.url.clone(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl {
                url: config.url.clone(),
                reason: "URL cannot be used as a base".to_string(),
            }
            .into());
        }

        let mut headers = HeaderMap::new();
        for (name, value) in service_headers(config) {
            let mut value = HeaderValue::from_str(value).map_err(|_| {
                ConfigError::Invalid(format!(
                    "{} contains characters not allowed in an HTTP header",
                    name
                ))
            })?;
            if name == "x-auth-token" {
                value.set_sensitive(true);
            }
            headers.insert(HeaderName::from_static(name), value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(ApiError::from)?;

        Ok(Self { http, base })
    }

    /// Base URL requests are made against
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait]
impl InstanceApi for RestClient {
    async fn create(&self, kind: &str) -> Result<Instance, MtError> {
        let url = self.endpoint(&["new", kind]);
        tracing::debug!(%url, "Creating instance");

        let response = self.http.post(url).send().await.map_err(ApiError::from)?;
        let status = response.status();
        let body = response.bytes().await.map_err(ApiError::from)?;

        let instance: Instance = match serde_json::from_slice(&body) {
            Ok(instance) => instance,
            Err(_) if !status.is_success() => return Err(server_error(status, &body).into()),
            Err(e) => return Err(ApiError::Decode(e).into()),
        };

        if let Some(message) = instance.error_message() {
            tracing::warn!(%status, "Instance creation failed: {}", message);
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: message.to_string(),
            }
            .into());
        }
        if !status.is_success() {
            return Err(server_error(status, &body).into());
        }

        tracing::info!(id = %instance.id, kind = %instance.kind, "Instance created");
        Ok(instance)
    }

    async fn destroy(&self, id: &InstanceId) -> Result<(), MtError> {
        let url = self.endpoint(&["i", id.as_str()]);
        tracing::debug!(%url, "Destroying instance");

        let response = self.http.delete(url).send().await.map_err(ApiError::from)?;
        let status = response.status();
        if status.is_success() {
            tracing::info!(instance = %id, "Instance destroyed");
            return Ok(());
        }

        let body = response.bytes().await.map_err(ApiError::from)?;
        Err(server_error(status, &body).into())
    }
}

/// Build a server error from a failed response, preferring its `error` field
fn server_error(status: StatusCode, body: &[u8]) -> ApiError {
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .map(|b| b.error)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            let text = String::from_utf8_lossy(body).trim().to_string();
            if text.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            } else {
                text
            }
        });

    ApiError::Server {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> RestClient {
        RestClient::new(&ClientConfig {
            token: "abcdefg".to_string(),
            url: url.to_string(),
            ..ClientConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoints_keep_base_path() {
        let rest = client("https://mktmp.io/api/v1");
        assert_eq!(
            rest.endpoint(&["new", "redis"]).as_str(),
            "https://mktmp.io/api/v1/new/redis"
        );

        let rest = client("http://localhost:3000/api/v1/");
        assert_eq!(
            rest.endpoint(&["i", "abc"]).as_str(),
            "http://localhost:3000/api/v1/i/abc"
        );
    }

    #[test]
    fn test_path_segments_are_escaped() {
        let rest = client("http://localhost");
        assert_eq!(
            rest.endpoint(&["i", "a/b c"]).as_str(),
            "http://localhost/i/a%2Fb%20c"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = RestClient::new(&ClientConfig {
            url: "not a url".to_string(),
            ..ClientConfig::default()
        });
        assert!(matches!(
            result,
            Err(MtError::Config(ConfigError::InvalidUrl { .. }))
        ));
    }

    #[test]
    fn test_server_error_message() {
        let err = server_error(StatusCode::BAD_REQUEST, br#"{"error":"unsupported type"}"#);
        assert!(matches!(
            err,
            ApiError::Server { status: 400, ref message } if message == "unsupported type"
        ));

        let err = server_error(StatusCode::BAD_GATEWAY, b"upstream down\n");
        assert!(matches!(
            err,
            ApiError::Server { status: 502, ref message } if message == "upstream down"
        ));

        let err = server_error(StatusCode::NOT_FOUND, b"");
        assert!(matches!(
            err,
            ApiError::Server { status: 404, ref message } if message == "Not Found"
        ));
    }
}
