//! Field computation command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use netheat::render::{self, FieldRequest, PlanDimensions};
use netheat::SurveyDocument;

pub fn run(
    input: PathBuf,
    width: u32,
    height: u32,
    resolution: usize,
    out: PathBuf,
    verbose: bool,
) -> Result<()> {
    if verbose {
        eprintln!("Loading survey from: {}", input.display());
    }

    let doc = SurveyDocument::load(&input)
        .with_context(|| format!("failed to load {}", input.display()))?;

    let request = FieldRequest {
        plan: PlanDimensions { width, height },
        resolution,
    };

    let outcome = render::render_fields(&doc, &request)?;

    std::fs::create_dir_all(&out)
        .with_context(|| format!("cannot create output directory {}", out.display()))?;

    for field in &outcome.fields {
        let json_path = out.join(format!("{}.json", field.metric));
        let csv_path = out.join(format!("{}.csv", field.metric));
        field.write_json(&json_path)?;
        field.write_csv(&csv_path)?;

        let unit = field
            .raster
            .unit
            .as_deref()
            .map(|u| format!(" ({u})"))
            .unwrap_or_default();
        println!(
            "{:<30} [{:.3}, {:.3}]{} -> {}",
            field.metric,
            field.raster.vmin,
            field.raster.vmax,
            unit,
            json_path.display()
        );
    }

    for (metric, err) in &outcome.failures {
        eprintln!("skipped {metric}: {err}");
    }

    if outcome.fields.is_empty() {
        anyhow::bail!("no fields could be computed");
    }
    Ok(())
}
