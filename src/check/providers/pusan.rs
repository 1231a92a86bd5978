//! Pusan National University Korean spell checker.
//!
//! The service returns an HTML page with the result embedded as a
//! JavaScript assignment (`data = [...];`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::PusanConfig;
use crate::check::{CheckError, CheckProvider, Finding, Locator};

pub struct PusanProvider {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl PusanProvider {
    #[must_use]
    pub fn from_config(client: Client, config: &PusanConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ResultBlock {
    #[serde(default, rename = "errInfo")]
    err_info: Vec<ErrInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrInfo {
    org_str: String,
    cand_word: String,
    #[serde(default)]
    help: Option<String>,
    #[serde(default)]
    start: Option<usize>,
}

/// First JSON value after the `data =` marker.
fn extract_data(body: &str) -> Option<Value> {
    let idx = body.find("data = ").or_else(|| body.find("data="))?;
    let rest = body[idx..].split_once('=')?.1.trim_start();
    serde_json::Deserializer::from_str(rest)
        .into_iter::<Value>()
        .next()?
        .ok()
}

fn parse_response(text: &str, body: &str) -> Result<Vec<Finding>, CheckError> {
    // A page without the marker means the text had no errors.
    let Some(data) = extract_data(body) else {
        if body.contains("<html") || body.contains("<HTML") {
            return Ok(Vec::new());
        }
        return Err(CheckError::Parse {
            provider: "pusan",
            reason: "reply is neither HTML nor data".into(),
        });
    };

    let blocks: Vec<ResultBlock> = match data {
        Value::Array(_) => serde_json::from_value(data),
        other => serde_json::from_value(other).map(|b| vec![b]),
    }
    .map_err(|e| CheckError::Parse {
        provider: "pusan",
        reason: e.to_string(),
    })?;

    let mut locator = Locator::new(text);
    let mut findings = Vec::new();
    for info in blocks.into_iter().flat_map(|b| b.err_info) {
        // Alternatives are '|'-separated, best first.
        let correct = info.cand_word.split('|').next().unwrap_or_default().trim();
        if correct.is_empty() || correct == info.org_str {
            continue;
        }
        let Some((start, end)) = locator.locate(&info.org_str, info.start) else {
            tracing::debug!("Pusan error '{}' not found in chunk", info.org_str);
            continue;
        };
        findings.push(Finding {
            start,
            end,
            wrong: info.org_str.clone(),
            correct: correct.to_string(),
            help: info.help.map(|h| strip_tags(&h)).filter(|h| !h.is_empty()),
            category: None,
        });
    }
    Ok(findings)
}

/// Help text comes with `<br/>` markup.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                out.push(' ');
            }
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[async_trait]
impl CheckProvider for PusanProvider {
    fn name(&self) -> &'static str {
        "pusan"
    }

    async fn check(&self, text: &str) -> Result<Vec<Finding>, CheckError> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("text1", text)])
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CheckError::Status {
                provider: "pusan",
                status: status.as_u16(),
            });
        }
        let body = response.text().await?;
        parse_response(text, &body)
    }
}
