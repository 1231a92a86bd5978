use anyhow::Result;

use proofmark::{Config, Normalizer};

use super::load_input;
use crate::OutputFormat;

pub fn cmd_normalize(config: &Config, input: &str, format: OutputFormat) -> Result<()> {
    let chars = load_input(input)?;
    let normalized = Normalizer::new(config.normalize.clone()).normalize(&chars)?;

    match format {
        OutputFormat::Compact => println!("{}", normalized.text()),
        OutputFormat::Json => {
            let anchors: Vec<&[usize]> = normalized.anchors().iter().map(|(_, o)| o).collect();
            let gaps: Vec<serde_json::Value> = normalized
                .anchors()
                .gaps()
                .map(|(boundary, gap)| {
                    serde_json::json!({
                        "boundary": boundary,
                        "kind": gap.kind,
                        "originals": gap.originals,
                    })
                })
                .collect();
            let output = serde_json::json!({
                "text": normalized.text(),
                "anchors": anchors,
                "gaps": gaps,
                "dropped": normalized.anchors().dropped_indices(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Full => {
            println!("{}\n", normalized.text());
            if let Some(gap) = normalized.anchors().gap_at(0) {
                println!("{:>6}   ⋯ {:?} {:?}", "", gap.kind, gap.originals);
            }
            for (offset, originals) in normalized.anchors().iter() {
                let c = normalized.chars()[offset];
                let shown = if c == ' ' { '␣' } else { c };
                println!("{offset:>6} {shown} ← {originals:?}");
                if let Some(gap) = normalized.anchors().gap_at(offset + 1) {
                    println!("{:>6}   ⋯ {:?} {:?}", "", gap.kind, gap.originals);
                }
            }
            println!(
                "\n{} → {} characters, {} dropped",
                chars.len(),
                normalized.len(),
                normalized.anchors().dropped_indices().len()
            );
        }
    }
    Ok(())
}
