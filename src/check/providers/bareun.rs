//! Bareun spelling and grammar correction via its REST gateway.
//!
//! Bareun returns revised blocks with offsets into the submitted text. The
//! request asks for UTF-32 offsets, i.e. character positions; the reported
//! offset is still verified against the text and re-located if it does not
//! match.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::BareunConfig;
use crate::check::{CheckError, CheckProvider, Finding, Locator};

pub struct BareunProvider {
    client: Client,
    endpoint: String,
    api_key: String,
    timeout: Duration,
}

impl BareunProvider {
    /// Returns `None` when no API key is configured.
    #[must_use]
    pub fn from_config(client: Client, config: &BareunConfig) -> Option<Self> {
        let api_key = config.api_key.clone().filter(|k| !k.trim().is_empty())?;
        Some(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CorrectErrorResponse {
    #[serde(default, alias = "revised_blocks")]
    revised_blocks: Vec<RevisedBlock>,
    #[serde(default)]
    helps: HashMap<String, HelpEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RevisedBlock {
    origin: OriginSpan,
    #[serde(default)]
    revised: String,
    #[serde(default)]
    revisions: Vec<Revision>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OriginSpan {
    #[serde(default)]
    content: String,
    #[serde(default, alias = "begin_offset")]
    begin_offset: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Revision {
    #[serde(default)]
    category: Option<String>,
    #[serde(default, alias = "help_id")]
    help_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HelpEntry {
    #[serde(default)]
    comment: String,
}

#[derive(Debug, Serialize)]
struct Document<'a> {
    content: &'a str,
    language: &'static str,
}

/// Turn a Bareun response into findings positioned in `text`.
fn parse_response(text: &str, body: &str) -> Result<Vec<Finding>, CheckError> {
    let response: CorrectErrorResponse =
        serde_json::from_str(body).map_err(|e| CheckError::Parse {
            provider: "bareun",
            reason: e.to_string(),
        })?;

    let mut locator = Locator::new(text);
    let mut findings = Vec::new();
    for block in response.revised_blocks {
        if block.origin.content == block.revised || block.origin.content.is_empty() {
            continue;
        }
        let Some((start, end)) = locator.locate(&block.origin.content, block.origin.begin_offset)
        else {
            tracing::debug!("Bareun block '{}' not found in chunk", block.origin.content);
            continue;
        };
        let first = block.revisions.first();
        let help = first
            .and_then(|r| r.help_id.as_ref())
            .and_then(|id| response.helps.get(id))
            .map(|h| h.comment.clone())
            .filter(|c| !c.is_empty());
        findings.push(Finding {
            start,
            end,
            wrong: block.origin.content,
            correct: block.revised,
            help,
            category: first.and_then(|r| r.category.clone()),
        });
    }
    Ok(findings)
}

#[async_trait]
impl CheckProvider for BareunProvider {
    fn name(&self) -> &'static str {
        "bareun"
    }

    async fn check(&self, text: &str) -> Result<Vec<Finding>, CheckError> {
        let document = Document {
            content: text,
            language: "ko-KR",
        };
        let body = json!({
            "document": document,
            "encoding_type": "UTF32",
        });
        tracing::debug!("Sending {} chars to Bareun", text.chars().count());

        let response = self
            .client
            .post(&self.endpoint)
            .header("api-key", &self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CheckError::Status {
                provider: "bareun",
                status: status.as_u16(),
            });
        }
        let body = response.text().await?;
        parse_response(text, &body)
    }
}
