use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use smartkit_annotate::RunOptions;

/// Replays a recorded screenshot-annotation session and exports the result.
#[derive(Parser, Debug)]
#[command(name = "smartkit-annotate", version, about)]
struct Cli {
    /// Session script (JSON) describing the editing steps.
    #[arg(value_name = "SCRIPT")]
    script: PathBuf,

    /// Base image; overrides the script's `image` field.
    #[arg(short, long, value_name = "PATH")]
    image: Option<PathBuf>,

    /// Directory exports are written to.
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Config file to use instead of `$XDG_CONFIG_HOME/smartkit/annotate.json`.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only log warnings and skip desktop notifications.
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let script = cli.script.clone();
    let report = smartkit_annotate::run(RunOptions {
        script: cli.script,
        image: cli.image,
        output_dir: cli.output_dir,
        config: cli.config,
        quiet: cli.quiet,
    })
    .with_context(|| format!("failed to replay {}", script.display()))?;

    for path in &report.exported {
        println!("{}", path.display());
    }
    // Select-tool samples, one JSON object per line with text and font metadata.
    for sample in &report.samples {
        let line = serde_json::to_string(sample).context("failed to encode text sample")?;
        println!("{line}");
    }
    Ok(())
}
