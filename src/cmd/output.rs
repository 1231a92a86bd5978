use std::time::Duration;

use anyhow::Result;

use proofmark::{CheckStatus, ProofReport};

use crate::OutputFormat;

/// Print a check report to stdout.
pub fn print_report(report: &ProofReport, format: OutputFormat, elapsed: Duration) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Compact => {
            for region in &report.regions {
                println!("p{} {}", region.page_index + 1, region.message);
            }
            println!(
                "{} findings, {} discarded, {} {:.0}ms",
                report.stats.spans,
                report.stats.discarded,
                status_label(report.status),
                elapsed.as_secs_f64() * 1000.0
            );
        }
        OutputFormat::Full => {
            println!(
                "📄 {} characters → {} normalized ({} dropped)",
                report.stats.characters, report.stats.normalized, report.stats.dropped
            );
            println!(
                "✂️  {} chunks, status: {}",
                report.stats.chunks,
                status_label(report.status)
            );
            for chunk in &report.chunks {
                for failure in &chunk.failures {
                    println!(
                        "   chunk {}: {} failed: {}",
                        chunk.index, failure.provider, failure.error
                    );
                }
            }

            println!("\n📝 Findings:");
            for region in &report.regions {
                println!("   page {}: {}", region.page_index + 1, region.message);
                if let Some(help) = &region.help {
                    println!("      {}", truncate_text(help, 80));
                }
                for b in &region.boxes {
                    println!(
                        "      [{:.1}, {:.1}, {:.1} × {:.1}]",
                        b.x, b.y, b.width, b.height
                    );
                }
            }
            if !report.discarded.is_empty() {
                println!("\n⚠️  Discarded:");
                for d in &report.discarded {
                    println!(
                        "   {}..{} '{}': {:?}",
                        d.span.start, d.span.end, d.span.wrong, d.reason
                    );
                }
            }
            println!("\n⏱️  {:.0}ms", elapsed.as_secs_f64() * 1000.0);
        }
    }
    Ok(())
}

pub fn status_label(status: CheckStatus) -> String {
    match status {
        CheckStatus::Complete => "complete".to_string(),
        CheckStatus::Partial { failed_chunks } => format!("partial ({failed_chunks} chunks failed)"),
        CheckStatus::CheckerUnavailable => "checker unavailable".to_string(),
    }
}

/// Cut `text` to at most `max` characters, marking the cut.
pub fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
