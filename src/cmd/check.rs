use std::time::Instant;

use anyhow::Result;

use proofmark::{CheckStatus, Config, Proofreader};

use super::load_input;
use super::output::print_report;
use crate::OutputFormat;

/// Command-line settings that win over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub providers: Option<Vec<String>>,
    pub chunk_size: Option<usize>,
    pub concurrency: Option<usize>,
    pub all_categories: bool,
}

impl Overrides {
    fn apply(self, config: &mut Config) {
        if let Some(providers) = self.providers {
            config.check.providers = providers
                .into_iter()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect();
        }
        if let Some(max_chars) = self.chunk_size {
            config.chunk.max_chars = max_chars;
        }
        if let Some(concurrency) = self.concurrency {
            config.check.concurrency = concurrency;
        }
        if self.all_categories {
            config.check.skip_categories.clear();
        }
    }
}

pub async fn cmd_check(
    mut config: Config,
    input: &str,
    format: OutputFormat,
    overrides: Overrides,
) -> Result<()> {
    overrides.apply(&mut config);

    let chars = load_input(input)?;
    let reader = Proofreader::from_config(&config)?;
    tracing::debug!("Checking {} characters with {:?}", chars.len(), reader.provider_names());

    let start = Instant::now();
    let report = reader.process(&chars).await?;
    let elapsed = start.elapsed();

    print_report(&report, format, elapsed)?;

    if report.status == CheckStatus::CheckerUnavailable && !chars.is_empty() {
        tracing::warn!("No chunk could be checked; the absence of findings means nothing");
    }
    Ok(())
}
