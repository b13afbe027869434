//! Identification and authentication headers shared by REST and attach requests

use mt_core::config::ClientConfig;

/// Header pairs sent with every request to the service
///
/// Names are lowercase so they can be used with `HeaderName::from_static`.
pub(crate) fn service_headers(config: &ClientConfig) -> [(&'static str, &str); 3] {
    [
        ("accept", "application/json"),
        ("user-agent", config.user_agent.as_str()),
        ("x-auth-token", config.token.as_str()),
    ]
}
