//! Naver search spell checker.
//!
//! The endpoint answers in JSONP and reports `(orgStr, candWord)` pairs
//! without positions, so findings are placed with [`Locator`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::NaverConfig;
use crate::check::{CheckError, CheckProvider, Finding, Locator};

const CALLBACK: &str = "proofmark_cb";

pub struct NaverProvider {
    client: Client,
    endpoint: String,
    timeout: Duration,
    max_chars: usize,
}

impl NaverProvider {
    #[must_use]
    pub fn from_config(client: Client, config: &NaverConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            max_chars: config.max_chars,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    result: Option<SpellResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SpellResult {
    #[serde(default)]
    errata: Vec<Erratum>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Erratum {
    org_str: String,
    cand_word: String,
    #[serde(default)]
    help: Option<String>,
    #[serde(default)]
    error_type: Option<String>,
}

/// The JSON object wrapped by the JSONP callback.
fn unwrap_jsonp(body: &str) -> Option<&str> {
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    (start < end).then(|| &body[start..=end])
}

fn parse_response(text: &str, body: &str) -> Result<Vec<Finding>, CheckError> {
    let parse_error = |reason: String| CheckError::Parse {
        provider: "naver",
        reason,
    };
    let json = unwrap_jsonp(body).ok_or_else(|| parse_error("no JSON object in reply".into()))?;
    let envelope: Envelope = serde_json::from_str(json).map_err(|e| parse_error(e.to_string()))?;

    if let Some(error) = envelope.message.error {
        return Err(CheckError::Unavailable(format!("naver: {error}")));
    }
    let errata = envelope
        .message
        .result
        .ok_or_else(|| parse_error("missing result".into()))?
        .errata;

    let mut locator = Locator::new(text);
    let mut findings = Vec::with_capacity(errata.len());
    for erratum in errata {
        if erratum.org_str == erratum.cand_word {
            continue;
        }
        let Some((start, end)) = locator.locate(&erratum.org_str, None) else {
            tracing::debug!("Naver erratum '{}' not found in chunk", erratum.org_str);
            continue;
        };
        findings.push(Finding {
            start,
            end,
            wrong: erratum.org_str,
            correct: erratum.cand_word,
            help: erratum.help.filter(|h| !h.is_empty()),
            category: erratum.error_type,
        });
    }
    Ok(findings)
}

#[async_trait]
impl CheckProvider for NaverProvider {
    fn name(&self) -> &'static str {
        "naver"
    }

    async fn check(&self, text: &str) -> Result<Vec<Finding>, CheckError> {
        let len = text.chars().count();
        if len > self.max_chars {
            return Err(CheckError::Unavailable(format!(
                "naver: chunk of {len} chars exceeds limit of {}",
                self.max_chars
            )));
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("_callback", CALLBACK),
                ("q", text),
                ("where", "nexearch"),
                ("color_blindness", "0"),
            ])
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CheckError::Status {
                provider: "naver",
                status: status.as_u16(),
            });
        }
        let body = response.text().await?;
        parse_response(text, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_jsonp_wrapper() {
        assert_eq!(unwrap_jsonp("cb({\"a\":1});"), Some("{\"a\":1}"));
        assert_eq!(unwrap_jsonp("no json"), None);
    }

    #[test]
    fn parses_errata_in_reading_order() {
        let body = r#"proofmark_cb({"message":{"result":{"errata_count":2,"errata":[
            {"orgStr":"되요","candWord":"돼요","help":"","errorType":"TYPO"},
            {"orgStr":"되요","candWord":"돼요","help":"준말"}
        ]}}});"#;
        let findings = parse_response("되요 그리고 되요", body).unwrap();
        assert_eq!(findings.len(), 2);
        assert_eq!((findings[0].start, findings[0].end), (0, 2));
        assert_eq!((findings[1].start, findings[1].end), (7, 9));
        assert!(findings[0].help.is_none());
        assert_eq!(findings[1].help.as_deref(), Some("준말"));
    }

    #[test]
    fn service_error_is_a_failure() {
        let body = r#"cb({"message":{"error":"blocked"}})"#;
        assert!(matches!(
            parse_response("text", body),
            Err(CheckError::Unavailable(_))
        ));
    }

    #[test]
    fn html_reply_is_a_parse_error() {
        assert!(matches!(
            parse_response("text", "<html></html>"),
            Err(CheckError::Parse { provider: "naver", .. })
        ));
    }

    #[tokio::test]
    async fn oversized_chunk_is_refused_before_sending() {
        let provider = NaverProvider::from_config(
            Client::new(),
            &NaverConfig {
                max_chars: 3,
                ..NaverConfig::default()
            },
        );
        let err = provider.check("네 글자임").await.unwrap_err();
        assert!(matches!(err, CheckError::Unavailable(_)));
    }
}
