//! Attach connection dialer
//!
//! Derives the WebSocket endpoint from the REST base URL and opens the
//! connection with the same identification headers the REST client uses.

use mt_core::config::ClientConfig;
use mt_core::{AttachMode, ConfigError, ConnectionError, InstanceId, MtError};
use reqwest::Url;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::headers::service_headers;

/// WebSocket connection produced by [`dial`]
pub type WsConnection = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Fixed path of the attach endpoint
const ATTACH_PATH: &str = "/ws";

/// Build the attach endpoint URL for an instance
///
/// `https` base URLs map to `wss` on the secure attach port, anything else
/// maps to `ws` on the original host and port. The base URL's path is
/// replaced.
pub fn attach_url(
    config: &ClientConfig,
    id: &InstanceId,
    mode: AttachMode,
) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        url: config.url.clone(),
        reason,
    };

    let mut url = Url::parse(&config.url).map_err(|e| invalid(e.to_string()))?;
    if !url.has_host() {
        return Err(invalid("URL has no host".to_string()));
    }

    let original_scheme = url.scheme().to_string();
    let secure = original_scheme == "https";
    let scheme = if secure { "wss" } else { "ws" };

    url.set_scheme(scheme).map_err(|_| {
        invalid(format!(
            "cannot derive a {} URL from scheme '{}'",
            scheme, original_scheme
        ))
    })?;

    if secure {
        url.set_port(Some(config.secure_attach_port()))
            .map_err(|_| invalid("cannot set attach port".to_string()))?;
    }

    url.set_path(ATTACH_PATH);
    url.set_query(None);
    url.set_fragment(None);
    url.query_pairs_mut()
        .append_pair("id", id.as_str())
        .append_pair("stdio", mode.stdio_flag());

    Ok(url)
}

/// Open an attach connection to an instance
///
/// No retry is attempted; the caller decides whether and when to dial again.
pub async fn dial(
    config: &ClientConfig,
    id: &InstanceId,
    mode: AttachMode,
) -> Result<WsConnection, MtError> {
    let url = attach_url(config, id, mode)?;

    let mut request = url
        .as_str()
        .into_client_request()
        .map_err(|e| ConfigError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    for (name, value) in service_headers(config) {
        let value = HeaderValue::from_str(value).map_err(|_| {
            ConfigError::Invalid(format!(
                "{} contains characters not allowed in an HTTP header",
                name
            ))
        })?;
        request
            .headers_mut()
            .insert(HeaderName::from_static(name), value);
    }

    tracing::debug!(%url, %mode, "Dialing attach endpoint");

    let (conn, response) = tokio_tungstenite::connect_async(request)
        .await
        .map_err(handshake_error)?;

    tracing::info!(
        instance = %id,
        %mode,
        status = %response.status(),
        "Attach connection established"
    );

    Ok(conn)
}

fn handshake_error(err: WsError) -> MtError {
    let err = match err {
        WsError::Http(response) => ConnectionError::Rejected {
            status: response.status().as_u16(),
        },
        WsError::Io(e) => ConnectionError::Io(e),
        WsError::Tls(e) => ConnectionError::Tls(e.to_string()),
        other => ConnectionError::Handshake(other.to_string()),
    };
    tracing::warn!("Attach handshake failed: {}", err);
    err.into()
}
