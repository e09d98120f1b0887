//! reel-sim — headless driver for the scripted reel engine
//!
//! Usage:
//!   reel-sim validate <config>            - Load and validate a config file
//!   reel-sim dump-config [--format yaml]  - Print the default config
//!   reel-sim play [--spins N] [...]       - Simulate a session on a virtual clock

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use rf_reel::{
    Breakpoint, BreakpointConfig, CellRef, ColumnAnimation, GameConfig, GameSession, Highlight,
    OutcomeKind, Payline, Phase, ReelRenderer, SessionBuilder, SessionStats, SpinRejection,
    SpinTiming, Strip,
};

/// Virtual frame length used while a spin is in flight
const FRAME_MS: u64 = 16;

#[derive(Parser)]
#[command(name = "reel-sim", about = "Scripted reel engine simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate a config file (JSON or YAML)
    Validate {
        /// Config path
        config: PathBuf,
    },
    /// Print the default config
    DumpConfig {
        #[arg(short, long, value_enum, default_value = "json")]
        format: Format,
    },
    /// Run a session and print a JSON summary
    Play(PlayArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

#[derive(clap::Args)]
struct PlayArgs {
    /// Config file (defaults to the built-in game)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Viewport width in px
    #[arg(short, long, default_value_t = 1280.0)]
    width: f64,

    /// Spin requests to issue
    #[arg(short, long, default_value_t = 3)]
    spins: usize,

    /// RNG seed for filler and effects
    #[arg(long)]
    seed: Option<u64>,

    /// Resize the viewport before this spin (0-based)
    #[arg(long, requires = "resize_to")]
    resize_after: Option<usize>,

    /// Viewport width to resize to
    #[arg(long, requires = "resize_after")]
    resize_to: Option<f64>,

    /// Bet preset index
    #[arg(short, long)]
    bet_index: Option<usize>,

    /// Use turbo timing
    #[arg(long)]
    turbo: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config } => validate(config),
        Commands::DumpConfig { format } => dump_config(format),
        Commands::Play(args) => play(args),
    }
}

fn validate(path: PathBuf) -> Result<()> {
    let config = GameConfig::load(&path)
        .with_context(|| format!("Invalid config {}", path.display()))?;

    println!(
        "{}: ok ({} breakpoints, {} scripts)",
        path.display(),
        config.breakpoints.len(),
        config.scripts.scripts().len()
    );
    Ok(())
}

fn dump_config(format: Format) -> Result<()> {
    let config = GameConfig::default();
    let text = match format {
        Format::Json => config.to_json()?,
        Format::Yaml => config.to_yaml()?,
    };
    println!("{text}");
    Ok(())
}

#[derive(Serialize)]
struct Summary {
    breakpoint: Breakpoint,
    phase: Phase,
    spin_count: usize,
    balance: f64,
    bet: f64,
    elapsed_ms: u64,
    rejections: Vec<String>,
    stats: SessionStats,
}

fn play(args: PlayArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => GameConfig::default(),
    };
    if args.turbo {
        config.timing = SpinTiming::turbo();
    }

    let mut builder = SessionBuilder::new(config)
        .viewport_width(args.width)
        .renderer(Box::new(LoggingRenderer));
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }
    let mut session = builder.build().context("Failed to start session")?;

    if let Some(index) = args.bet_index {
        if !session.select_bet(index) && index != 0 {
            bail!("No bet preset at index {index}");
        }
    }

    let mut rejections = Vec::new();
    for n in 0..args.spins {
        if args.resize_after == Some(n) {
            if let Some(width) = args.resize_to {
                session.resize(width);
            }
        }

        match session.request_spin() {
            Ok(()) => run_spin(&mut session),
            Err(rejection) => {
                log::warn!("Spin {} rejected: {rejection}", n + 1);
                rejections.push(rejection.to_string());
                if rejection == SpinRejection::Exhausted {
                    break;
                }
            }
        }
    }
    session.run_pending();

    let summary = Summary {
        breakpoint: session.layout().name,
        phase: session.phase(),
        spin_count: session.spin_count(),
        balance: session.balance(),
        bet: session.bet(),
        elapsed_ms: session.now(),
        rejections,
        stats: session.stats().clone(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Step frames until the spin (including its win dwell) is over
fn run_spin(session: &mut GameSession) {
    while session.is_spinning() {
        session.advance(FRAME_MS);
    }
}

/// Renderer that writes every call to the log
struct LoggingRenderer;

impl ReelRenderer for LoggingRenderer {
    fn build_strips(&mut self, layout: &BreakpointConfig, strips: &[Strip]) {
        log::info!(
            "build {} strips for {} ({}×{} @ {:.0}px)",
            strips.len(),
            layout.name,
            layout.columns,
            layout.rows,
            layout.cell_size
        );
    }

    fn animate_column(&mut self, animation: &ColumnAnimation) {
        log::debug!(
            "column {} {:.0} → {:.0}px over {}ms ({})",
            animation.column,
            animation.from_offset,
            animation.to_offset,
            animation.duration_ms,
            animation.easing.css()
        );
    }

    fn place_column(&mut self, column: usize, offset: f64) {
        log::trace!("column {column} at {offset:.0}px");
    }

    fn highlight_cell(&mut self, cell: CellRef, highlight: Highlight) {
        log::debug!(
            "cell ({}, {}) strip[{}] {highlight:?}",
            cell.column,
            cell.row,
            cell.strip_index
        );
    }

    fn draw_win_line(&mut self, cells: &[CellRef]) {
        log::debug!("win line through {} cells", cells.len());
    }

    fn win_tier_effect(&mut self, kind: OutcomeKind, on: bool) {
        log::debug!("{kind:?} effect {}", if on { "on" } else { "off" });
    }

    fn phase_changed(&mut self, from: Phase, to: Phase) {
        log::info!("{from:?} → {to:?}");
    }

    fn balance_changed(&mut self, balance: f64) {
        log::info!("balance {balance:.2}");
    }

    fn show_cta(&mut self) {
        log::info!("call to action");
    }

    fn show_paylines(&mut self, lines: u32, paylines: &[Payline]) {
        log::debug!("{lines} lines preview ({} patterns)", paylines.len());
    }
}
