//! Survey validation command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use netheat::SurveyDocument;

pub fn run(input: PathBuf, verbose: bool) -> Result<()> {
    let doc = SurveyDocument::load(&input)
        .with_context(|| format!("failed to load {}", input.display()))?;

    // Load already validates configuration structure; check the results too.
    let mut problems = 0usize;
    for key in &doc.configuration.graphs {
        if let Err(err) = doc.sample_set(key) {
            println!("FAIL {key}: {err}");
            problems += 1;
        } else if verbose {
            println!("ok   {key}");
        }
    }

    match doc.check_plottable() {
        Ok(()) => {
            if verbose {
                println!("ok   point count ({})", doc.benchmarked_count());
            }
        }
        Err(err) => {
            println!("FAIL {err}");
            problems += 1;
        }
    }

    if problems == 0 {
        println!("Survey is valid: {} benchmarked points", doc.benchmarked_count());
        Ok(())
    } else {
        anyhow::bail!("{problems} problem(s) found in {}", input.display())
    }
}
