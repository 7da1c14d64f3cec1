//! Metric registry listing command.

use anyhow::Result;
use netheat::REGISTRY;

pub fn run(verbose: bool) -> Result<()> {
    println!("{} canonical metrics:", REGISTRY.len());
    println!("{:-<72}", "");

    for d in REGISTRY {
        let mut flags = Vec::new();
        if d.conversion {
            flags.push(if d.bits { "rate(bits)" } else { "rate(bytes)" });
        }
        if d.reverse {
            flags.push("reverse");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        println!("{:<30} {}{}", d.name, d.title(None), flags);

        if verbose {
            let reqs: Vec<&str> = d.requirements.iter().map(|r| r.as_str()).collect();
            println!("  requires: {}", reqs.join(", "));
            if let Some((vmin, vmax)) = d.bounds {
                println!("  bounds: [{vmin}, {vmax}]");
            }
        }
    }

    Ok(())
}
