//! Chunk dispatch and offset translation.

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{ChainResult, ErrorSpan, Finding, ProviderChain, ProviderFailure};
use crate::chunk::Chunk;

/// Checker fan-out settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Provider names in fallback order.
    pub providers: Vec<String>,
    /// Chunks in flight at once.
    pub concurrency: usize,
    /// Finding categories to discard (e.g. spacing suggestions).
    pub skip_categories: Vec<String>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            providers: vec![
                "bareun".into(),
                "naver".into(),
                "pusan".into(),
                "rules".into(),
            ],
            concurrency: 4,
            skip_categories: vec!["SPACING".into()],
        }
    }
}

/// How complete the checking of a document was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum CheckStatus {
    /// Every dispatched chunk was checked.
    Complete,
    /// Some chunks could not be checked; their findings are missing.
    Partial { failed_chunks: usize },
    /// No chunk could be checked. Distinct from "no errors found".
    CheckerUnavailable,
}

/// What happened to one chunk.
#[derive(Debug, Clone, Serialize)]
pub struct ChunkReport {
    pub index: usize,
    pub base_offset: usize,
    pub len: usize,
    /// Provider that checked it, `None` when skipped or failed.
    pub provider: Option<&'static str>,
    pub findings: usize,
    pub skipped: bool,
    pub failures: Vec<ProviderFailure>,
}

impl ChunkReport {
    fn failed(&self) -> bool {
        !self.skipped && self.provider.is_none()
    }
}

/// All spans of a document in normalized-text offsets, in chunk order.
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub spans: Vec<ErrorSpan>,
    pub chunks: Vec<ChunkReport>,
    pub status: CheckStatus,
}

/// Sends chunks through the provider chain and moves findings into
/// document coordinates: `global = base_offset + local`.
pub struct CheckCoordinator {
    chain: ProviderChain,
    concurrency: usize,
    skip_categories: Vec<String>,
}

impl CheckCoordinator {
    #[must_use]
    pub fn new(chain: ProviderChain, config: &CheckConfig) -> Self {
        Self {
            chain,
            concurrency: config.concurrency.max(1),
            skip_categories: config.skip_categories.clone(),
        }
    }

    #[must_use]
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.chain.names()
    }

    /// Check one chunk and translate its findings.
    pub async fn check_chunk(&self, chunk: &Chunk) -> (ChunkReport, Vec<ErrorSpan>) {
        let mut report = ChunkReport {
            index: chunk.index,
            base_offset: chunk.base_offset,
            len: chunk.len,
            provider: None,
            findings: 0,
            skipped: false,
            failures: Vec::new(),
        };

        if chunk.is_blank() {
            report.skipped = true;
            return (report, Vec::new());
        }

        match self.chain.check(&chunk.text).await {
            ChainResult::Checked {
                provider,
                findings,
                failures,
            } => {
                let spans = self.translate(chunk, provider, findings);
                report.provider = Some(provider);
                report.findings = spans.len();
                report.failures = failures;
                (report, spans)
            }
            ChainResult::Exhausted { failures } => {
                warn!(
                    "Chunk {} (offset {}) could not be checked by any provider",
                    chunk.index, chunk.base_offset
                );
                report.failures = failures;
                (report, Vec::new())
            }
        }
    }

    /// Check all chunks, at most `concurrency` at a time, keeping chunk order.
    pub async fn check_all(&self, chunks: &[Chunk]) -> CheckOutcome {
        let results: Vec<(ChunkReport, Vec<ErrorSpan>)> = stream::iter(chunks)
            .map(|chunk| self.check_chunk(chunk))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut spans = Vec::new();
        let mut reports = Vec::with_capacity(results.len());
        for (report, chunk_spans) in results {
            spans.extend(chunk_spans);
            reports.push(report);
        }
        // Chunks are disjoint and ordered, so this only orders within a chunk.
        spans.sort_by_key(|s| (s.start, s.end));
        spans.dedup_by(|a, b| a.start == b.start && a.end == b.end && a.correct == b.correct);

        let dispatched = reports.iter().filter(|r| !r.skipped).count();
        let failed = reports.iter().filter(|r| r.failed()).count();
        let status = match failed {
            0 => CheckStatus::Complete,
            n if n == dispatched => CheckStatus::CheckerUnavailable,
            n => CheckStatus::Partial { failed_chunks: n },
        };

        info!(
            "Checked {} chunks ({} failed): {} spans",
            dispatched,
            failed,
            spans.len()
        );

        CheckOutcome {
            spans,
            chunks: reports,
            status,
        }
    }

    fn translate(&self, chunk: &Chunk, provider: &'static str, findings: Vec<Finding>) -> Vec<ErrorSpan> {
        findings
            .into_iter()
            .filter(|f| {
                let valid = f.start < f.end && f.end <= chunk.len;
                if !valid {
                    warn!(
                        "Dropping {} finding with bad range {}..{} in chunk {} of length {}",
                        provider, f.start, f.end, chunk.index, chunk.len
                    );
                }
                valid
            })
            .filter(|f| {
                f.category
                    .as_ref()
                    .is_none_or(|c| !self.skip_categories.iter().any(|s| s.eq_ignore_ascii_case(c)))
            })
            .map(|f| ErrorSpan {
                start: chunk.base_offset + f.start,
                end: chunk.base_offset + f.end,
                wrong: f.wrong,
                correct: f.correct,
                help: f.help,
                category: f.category,
                provider: provider.to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::check::providers::rules::RulesProvider;
    use crate::check::{CheckError, CheckProvider};
    use crate::chunk::{ChunkConfig, Chunker};

    /// Fails on any chunk containing the marker.
    struct Flaky(&'static str);

    #[async_trait]
    impl CheckProvider for Flaky {
        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn check(&self, text: &str) -> Result<Vec<Finding>, CheckError> {
            if text.contains(self.0) {
                Err(CheckError::Unavailable("flaky".into()))
            } else {
                RulesProvider::new().check(text).await
            }
        }
    }

    fn config() -> CheckConfig {
        CheckConfig {
            providers: vec![],
            concurrency: 3,
            skip_categories: vec!["SPACING".into()],
        }
    }

    fn rules_only() -> CheckCoordinator {
        CheckCoordinator::new(ProviderChain::new(vec![Box::new(RulesProvider::new())]), &config())
    }

    fn chunks(text: &str, max_chars: usize) -> Vec<Chunk> {
        let chars: Vec<char> = text.chars().collect();
        Chunker::new(ChunkConfig {
            max_chars,
            lookback: 60,
        })
        .unwrap()
        .split(&chars)
    }

    #[tokio::test]
    async fn offsets_are_translated_by_base() {
        let chunk = Chunk {
            index: 3,
            text: "오늘 되요".into(),
            base_offset: 120,
            len: 5,
            forced_split: false,
        };
        let (report, spans) = rules_only().check_chunk(&chunk).await;
        assert_eq!(report.provider, Some("rules"));
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].start, 123);
        assert_eq!(spans[0].end, 125);
        assert_eq!(spans[0].provider, "rules");
    }

    #[tokio::test]
    async fn chunked_and_unsplit_checks_agree() {
        let sentence = "오늘은 날씨가 정말 좋아서 산책을 하면 되요. ";
        let text: String = sentence.repeat(40).chars().take(620).collect();
        let coordinator = rules_only();

        let split = coordinator.check_all(&chunks(&text, 300)).await;
        let whole = coordinator.check_all(&chunks(&text, 10_000)).await;

        assert!(split.chunks.len() >= 3);
        assert_eq!(whole.chunks.len(), 1);
        assert_eq!(split.spans, whole.spans);
        assert_eq!(split.status, CheckStatus::Complete);
        assert!(!split.spans.is_empty());
    }

    #[tokio::test]
    async fn failed_chunk_yields_partial_status() {
        let text = "첫 번째 되요 문장. 두 번째 FAIL 되요 문장.";
        let coordinator = CheckCoordinator::new(
            ProviderChain::new(vec![Box::new(Flaky("FAIL"))]),
            &config(),
        );
        let outcome = coordinator.check_all(&chunks(text, 12)).await;

        assert_eq!(outcome.status, CheckStatus::Partial { failed_chunks: 1 });
        assert_eq!(outcome.spans.len(), 1);
        assert_eq!(outcome.spans[0].start, 5);
        let failed: Vec<&ChunkReport> = outcome.chunks.iter().filter(|c| c.failed()).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].failures[0].provider, "flaky");
    }

    #[tokio::test]
    async fn every_chunk_failing_is_reported_as_unavailable() {
        let coordinator = CheckCoordinator::new(ProviderChain::new(vec![]), &config());
        let outcome = coordinator.check_all(&chunks("되요 되요", 300)).await;
        assert_eq!(outcome.status, CheckStatus::CheckerUnavailable);
        assert!(outcome.spans.is_empty());
    }

    #[tokio::test]
    async fn blank_chunks_are_skipped_not_failed() {
        let coordinator = CheckCoordinator::new(ProviderChain::new(vec![]), &config());
        let outcome = coordinator.check_all(&chunks("     ", 300)).await;
        assert_eq!(outcome.status, CheckStatus::Complete);
        assert!(outcome.chunks[0].skipped);
    }

    #[tokio::test]
    async fn skipped_categories_and_bad_ranges_are_dropped() {
        struct Noisy;

        #[async_trait]
        impl CheckProvider for Noisy {
            fn name(&self) -> &'static str {
                "noisy"
            }

            async fn check(&self, _text: &str) -> Result<Vec<Finding>, CheckError> {
                let finding = |start, end, category: Option<&str>| Finding {
                    start,
                    end,
                    wrong: "w".into(),
                    correct: "c".into(),
                    help: None,
                    category: category.map(String::from),
                };
                Ok(vec![
                    finding(0, 1, Some("spacing")),
                    finding(2, 2, None),
                    finding(3, 99, None),
                    finding(1, 2, Some("TYPO")),
                ])
            }
        }

        let coordinator = CheckCoordinator::new(ProviderChain::new(vec![Box::new(Noisy)]), &config());
        let chunk = chunks("abcdef", 300).remove(0);
        let (report, spans) = coordinator.check_chunk(&chunk).await;
        assert_eq!(report.findings, 1);
        assert_eq!(spans[0].start, 1);
        assert_eq!(spans[0].category.as_deref(), Some("TYPO"));
    }
}
