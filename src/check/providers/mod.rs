//! Checking services and their configuration.
//!
//! Each provider implements [`CheckProvider`]. [`build`] turns the ordered
//! list of names from [`CheckConfig`](super::CheckConfig) into the chain's
//! provider list, skipping names it cannot satisfy.

pub mod bareun;
pub mod naver;
pub mod pusan;
pub mod rules;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::CheckProvider;
use bareun::BareunProvider;
use naver::NaverProvider;
use pusan::PusanProvider;
use rules::RulesProvider;

/// Environment variable consulted when no Bareun key is configured.
pub const BAREUN_API_KEY_ENV: &str = "BAREUN_API_KEY";

/// Every provider name [`build`] understands.
pub const KNOWN_PROVIDERS: &[&str] = &["bareun", "naver", "pusan", "rules"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub bareun: BareunConfig,
    pub naver: NaverConfig,
    pub pusan: PusanConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BareunConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for BareunConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://api.bareun.ai/bareun/api/v1/correct-error".into(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NaverConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
    /// Longest chunk the service accepts.
    pub max_chars: usize,
}

impl Default for NaverConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://m.search.naver.com/p/csearch/ocontent/spellchecker.nhn".into(),
            timeout_secs: 10,
            max_chars: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PusanConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for PusanConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://speller.cs.pusan.ac.kr/results".into(),
            timeout_secs: 8,
        }
    }
}

impl BareunConfig {
    /// Configured key, else the environment.
    #[must_use]
    pub fn resolved(&self) -> Self {
        let mut config = self.clone();
        if config.api_key.is_none() {
            config.api_key = std::env::var(BAREUN_API_KEY_ENV).ok();
        }
        config
    }
}

/// Instantiate providers by name, in the given order.
///
/// Unknown names and unconfigured providers are skipped with a warning, so
/// the result may be shorter than `names`.
#[must_use]
pub fn build(names: &[String], config: &ProvidersConfig, client: &Client) -> Vec<Box<dyn CheckProvider>> {
    let mut providers: Vec<Box<dyn CheckProvider>> = Vec::with_capacity(names.len());
    for name in names {
        match name.to_ascii_lowercase().as_str() {
            "bareun" => match BareunProvider::from_config(client.clone(), &config.bareun.resolved()) {
                Some(p) => providers.push(Box::new(p)),
                None => warn!("Skipping bareun: no API key (set {})", BAREUN_API_KEY_ENV),
            },
            "naver" => providers.push(Box::new(NaverProvider::from_config(client.clone(), &config.naver))),
            "pusan" => providers.push(Box::new(PusanProvider::from_config(client.clone(), &config.pusan))),
            "rules" => providers.push(Box::new(RulesProvider::new())),
            other => warn!("Unknown provider '{}', ignoring", other),
        }
    }
    debug!(
        "Provider chain: {:?}",
        providers.iter().map(|p| p.name()).collect::<Vec<_>>()
    );
    providers
}
