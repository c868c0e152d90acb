use std::path::PathBuf;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use pkx_recolor::config::Config;
use recolor::ScaleStrategy;

#[derive(Parser, Debug)]
#[command(name = "pkx-recolor")]
#[command(about, author, version, long_about = None)]
struct Cli {
    /// Folder with one sub-folder per model
    input: PathBuf,
    /// Folder receiving the recolored textures
    output: PathBuf,
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// How the brightness channels are scaled
    #[arg(long, value_name = "fused|sequential")]
    strategy: Option<ScaleStrategy>,
    /// Worker threads (0 = one per core)
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,
    /// Show a progress bar over the assets
    #[arg(long, default_value_t = false)]
    progress: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("{err:?}");
        std::process::exit(-1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let stdout = console::Term::stdout();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(strategy) = cli.strategy {
        config.strategy = strategy;
    }
    if let Some(jobs) = cli.jobs {
        config.jobs = jobs;
    }
    log::debug!("{config:?}");

    let bar = if cli.progress {
        let bar = indicatif::ProgressBar::new(0);
        bar.set_style(get_bar_style()?);
        Some(bar)
    } else {
        None
    };

    let summary = pkx_recolor::run(&cli.input, &cli.output, &config, bar.as_ref())?;

    if let Some(bar) = bar {
        bar.finish();
    }

    let text = format!(
        "Assets: {};\nProcessed: {};\nSkipped: {};\nTextures written: {};",
        summary.assets, summary.processed, summary.skipped, summary.textures
    );
    stdout.write_line(&text).into_diagnostic()?;

    Ok(())
}

fn get_bar_style() -> Result<indicatif::ProgressStyle> {
    Ok(
        indicatif::ProgressStyle::with_template("[{bar:32}] {pos:>7}/{len:7} {msg}")
            .into_diagnostic()?
            .progress_chars("=>-"),
    )
}
