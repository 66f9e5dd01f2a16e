use clap::{Args, Parser, Subcommand};
use plum::config::{PlumConfig, RootStep};
use plum::settings::Settings;
use plum::{blossom, PlumError, PlumResult};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

#[derive(Parser)]
#[command(name = "plum")]
#[command(version)]
#[command(about = "Terminal plum blossom: branches grow in from the edges, frame by frame", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Animate plum growth in the terminal
    Grow {
        #[command(flatten)]
        growth: GrowthArgs,
    },

    /// Grow to completion and print the drawing to stdout
    Print {
        #[command(flatten)]
        growth: GrowthArgs,

        /// Columns to draw (defaults to terminal width)
        #[arg(long)]
        cols: Option<u16>,

        /// Rows to draw (defaults to terminal height)
        #[arg(long)]
        rows: Option<u16>,
    },
}

#[derive(Args)]
struct GrowthArgs {
    /// Maximum segment length
    #[arg(short = 'L', long)]
    length: Option<f64>,

    /// Generations of dense branching before branches thin out
    #[arg(short = 'M', long)]
    min_branch: Option<u32>,

    /// Stroke color (#rgb, #rrggbb or #rrggbbaa)
    #[arg(short, long)]
    color: Option<String>,

    /// Growth ticks per second
    #[arg(short, long)]
    fps: Option<f64>,

    /// Braille dots per logical unit
    #[arg(short, long)]
    density: Option<f64>,

    /// Random seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Start from x,y,degrees instead of the canvas edges (repeatable)
    #[arg(short, long = "root")]
    roots: Vec<String>,

    /// Keep growing new drawings
    #[arg(short, long)]
    infinite: bool,

    /// Wait time between drawings in infinite mode (seconds)
    #[arg(short, long, default_value = "4.0")]
    wait: f64,

    /// Write trace logs to this file (RUST_LOG filters, default "plum=info")
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl GrowthArgs {
    fn into_config(self, settings: &Settings) -> PlumResult<PlumConfig> {
        let mut growth = settings.growth_params();
        if let Some(length) = self.length {
            growth.length = length;
        }
        if let Some(min_branch) = self.min_branch {
            growth.min_branch = min_branch;
        }
        if let Some(color) = self.color {
            growth.color = color;
        }
        if let Some(fps) = self.fps {
            growth.fps = fps;
        }

        let roots = self
            .roots
            .iter()
            .map(|r| RootStep::parse(r).ok_or_else(|| PlumError::InvalidRoot(r.clone())))
            .collect::<PlumResult<Vec<_>>>()?;

        Ok(PlumConfig {
            growth,
            infinite: self.infinite,
            time_wait: self.wait,
            seed: self.seed,
            density: self.density.unwrap_or_else(|| settings.density()),
            roots,
        })
    }
}

fn init_logging(path: Option<&PathBuf>) -> PlumResult<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)?;
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "plum=info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| PlumError::Logging(e.to_string()))
}

fn main() -> PlumResult<()> {
    let cli = Cli::parse();
    let settings = Settings::load()?;

    match cli.command {
        Commands::Grow { growth } => {
            init_logging(growth.log_file.as_ref())?;
            let config = growth.into_config(&settings)?;
            blossom::run(&config)?;
        }
        Commands::Print { growth, cols, rows } => {
            init_logging(growth.log_file.as_ref())?;
            let config = growth.into_config(&settings)?;
            let (term_cols, term_rows) = crossterm::terminal::size().unwrap_or((80, 24));
            blossom::print(&config, cols.unwrap_or(term_cols), rows.unwrap_or(term_rows))?;
        }
    }

    Ok(())
}
