//! # modtree CLI Entry Point
//!
//! Parses the command line, loads configuration, and runs the checkout →
//! download → build pipeline. The finished tree goes to stdout; status lines,
//! progress and logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::path::PathBuf;

use modtree::checkout::{self, GitCheckout};
use modtree::config::Settings;
use modtree::logging;
use modtree::oracle::GoToolchain;
use modtree::output::{self, OutputFormat};
use modtree::pipeline::{Pipeline, Request};
use modtree::stats;
use modtree::tree::CyclePolicy;

#[derive(Parser)]
#[command(name = "modtree")]
#[command(about = "Build the nested dependency tree of a Go project", version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
struct Cli {
    /// Repository to clone (URL or local path)
    source: String,
    /// Branch, tag or commit to check out
    #[arg(value_name = "REF")]
    selector: String,
    /// Checkout directory [default: ./<repository name>]
    #[arg(long)]
    dest: Option<PathBuf>,
    /// Worker threads used to resolve sibling modules
    #[arg(short, long)]
    jobs: Option<usize>,
    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
    /// What to do when a module depends on one of its ancestors
    #[arg(long, value_enum)]
    cycles: Option<CyclePolicy>,
    /// Skip `go mod tidy` before listing each module
    #[arg(long)]
    no_tidy: bool,
    /// Print tree statistics to stderr
    #[arg(long)]
    summary: bool,
    /// Configuration file [default: ./modtree.toml, ~/.modtree/config.toml]
    #[arg(long)]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Only log errors and hide the progress spinner
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "x".red(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(jobs) = cli.jobs {
        settings.jobs = Some(jobs);
    }
    if let Some(format) = cli.format {
        settings.format = format;
    }
    if let Some(cycles) = cli.cycles {
        settings.cycles = cycles;
    }
    if cli.no_tidy {
        settings.tidy = false;
    }

    let dest = match cli.dest {
        Some(dest) => std::path::absolute(&dest)
            .with_context(|| format!("Invalid destination {}", dest.display()))?,
        None => checkout::default_dest(&cli.source)?,
    };

    let go = GoToolchain::new(&settings.go).with_env(settings.env.clone());
    let pipeline = Pipeline {
        checkout: &GitCheckout,
        fetcher: &go,
        oracle: &go,
        options: settings.build_options(),
        progress: !cli.quiet,
    };
    let request = Request {
        source: cli.source.clone(),
        selector: cli.selector,
        dest,
    };

    tracing::info!(source = %request.source, dest = %request.dest.display(), "starting");
    let forest = pipeline.run(&request)?;

    let color = settings.format == OutputFormat::Text && console::colors_enabled();
    output::write_forest(
        &mut std::io::stdout().lock(),
        &forest,
        settings.format,
        &cli.source,
        color,
    )?;

    if cli.summary {
        stats::print_summary(&forest);
    }
    Ok(())
}
