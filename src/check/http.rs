//! Shared HTTP client for the remote providers.

use std::time::Duration;

use reqwest::Client;

/// User agent sent to checking services.
pub const USER_AGENT: &str = concat!(
    "proofmark/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/proofmark/proofmark)"
);

/// Build the client all remote providers share.
///
/// Per-request timeouts are set by each provider from its own config.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn build_client() -> reqwest::Result<Client> {
    Client::builder()
        // Keep connections alive across chunks of one document
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(30))
        .tcp_nodelay(true)
        .use_rustls_tls()
        .gzip(true)
        .brotli(true)
        .connect_timeout(Duration::from_secs(10))
        .user_agent(USER_AGENT)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds() {
        assert!(build_client().is_ok());
    }

    #[test]
    fn user_agent_carries_version() {
        assert!(USER_AGENT.starts_with("proofmark/"));
        assert!(USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
