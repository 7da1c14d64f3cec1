//! Survey document summary command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use netheat::{SurveyDocument, MIN_PLOT_POINTS};

pub fn run(input: PathBuf, verbose: bool) -> Result<()> {
    if verbose {
        eprintln!("Loading survey from: {}", input.display());
    }

    let doc = SurveyDocument::load(&input)
        .with_context(|| format!("failed to load {}", input.display()))?;

    let config = &doc.configuration;
    println!("Survey: {}", input.display());
    println!("{:-<60}", "");
    if let Some(ssid) = &config.ssid {
        println!("SSID: {ssid}");
    }
    println!("Iterations per point: {}", config.benchmark_iterations);
    let modes: Vec<&str> = config.modes.iter().map(|m| m.as_str()).collect();
    println!("Modes: {}", modes.join(", "));
    if let Some(variant) = config.speedtest {
        println!("Speedtest backend: {variant}");
    }
    println!(
        "Points: {} total, {} benchmarked (minimum for plotting: {})",
        doc.results.len(),
        doc.benchmarked_count(),
        MIN_PLOT_POINTS
    );

    println!();
    println!("Graph coverage:");
    for key in &config.graphs {
        let covered = doc
            .benchmarked()
            .filter(|(_, p)| {
                p.results.as_ref().is_some_and(|r| r.contains(key))
            })
            .count();
        println!("  {:<30} {}/{}", key, covered, doc.benchmarked_count());
    }

    Ok(())
}
