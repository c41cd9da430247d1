use std::fs;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::assemble::assemble;
use crate::cli::ExtractArgs;
use crate::extract::CardParser;
use crate::util::write_json_pretty;

pub fn run(args: ExtractArgs) -> Result<()> {
    let html = fs::read_to_string(&args.html)
        .with_context(|| format!("failed to read {}", args.html.display()))?;

    let parser = CardParser::new()?;
    let assembled = assemble(parser.extract(&html, &args.url, &args.url));
    if !assembled.degraded_fields.is_empty() {
        warn!(fields = ?assembled.degraded_fields, "extracted with degraded fields");
    }

    match args.out {
        Some(path) => {
            write_json_pretty(&path, &assembled.record)?;
            info!(
                path = %path.display(),
                character_id = assembled.record.character_id.as_deref().unwrap_or("-"),
                "wrote card record"
            );
        }
        None => {
            let json = serde_json::to_string_pretty(&assembled.record)
                .context("failed to serialize card record")?;
            println!("{json}");
        }
    }

    Ok(())
}
