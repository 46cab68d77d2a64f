use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use colored::*;
use docs2pdf::{
    parse_selector, Downloader, Options, Timing, DEFAULT_OUTPUT, DEFAULT_SELECTOR, DEFAULT_TITLE,
};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "docs2pdf")]
#[command(about = "CLI utility to turn a documentation website into a single PDF with a cover and table of contents")]
#[command(version = "0.1.0")]
struct Args {
    /// URL of the documentation homepage
    url: String,

    /// CSS selector for the navigation sidebar
    #[arg(short = 's', long = "selector", default_value = DEFAULT_SELECTOR, value_parser = parse_selector)]
    selector: String,

    /// Output filename
    #[arg(short = 'o', long = "output", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Title for the cover page
    #[arg(short = 't', long = "title", default_value = DEFAULT_TITLE)]
    title: String,

    /// Maximum number of pages to include (0 = all, negative values are rejected)
    #[arg(short = 'l', long = "limit", default_value_t = 0)]
    limit: usize,

    /// Show the browser window
    #[arg(long = "visible")]
    visible: bool,

    /// Navigation timeout in seconds
    #[arg(long = "timeout", default_value = "60", value_parser = parse_timeout)]
    timeout: Duration,
}

const MAX_TIMEOUT_SECS: f64 = 24.0 * 60.0 * 60.0;

fn parse_timeout(s: &str) -> Result<Duration, String> {
    let value = s.parse::<f64>().map_err(|_| "Not a number.")?;
    if !value.is_finite() || value < 0.0 {
        return Err("Must be zero or positive number.".to_string());
    }
    if value > MAX_TIMEOUT_SECS {
        return Err(format!("Must be at most {} seconds.", MAX_TIMEOUT_SECS));
    }
    Duration::try_from_secs_f64(value).map_err(|e| e.to_string())
}

fn init_logging() -> Result<()> {
    // chromiumoxide logs every CDP message it cannot decode; keep it quiet.
    let filter = EnvFilter::from_default_env()
        .add_directive("chromiumoxide::conn=off".parse()?)
        .add_directive("chromiumoxide::handler=off".parse()?)
        .add_directive("docs2pdf=info".parse()?);

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init()?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let options = Options {
        sidebar_selector: args.selector,
        output: args.output,
        title: args.title,
        limit: args.limit,
        visible: args.visible,
        timing: Timing {
            navigation: args.timeout,
            ..Timing::default()
        },
        ..Options::default()
    };

    let downloader = Downloader::new(options);
    if let Err(e) = downloader.run(&args.url).await {
        error!("{}", format!("Error: {}", e).red());
        process::exit(1);
    }
}
