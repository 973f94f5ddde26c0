//! Command line runner for the constraint-based Game of Life

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use game_of_life_csp::{
    config::{CliOverrides, OutputFormat, Settings, SolverBackend},
    game_of_life::{create_example_boards, load_board_from_file, read_board, Grid},
    simulate,
    utils::{BoardFormatter, ColorOutput},
    validator::RoundValidator,
    ActivationSet, RunReport,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "game_of_life_csp")]
#[command(about = "Game of Life generations solved as constraint problems")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute generations from a board read from a file or stdin
    Run {
        #[command(flatten)]
        input: RunArgs,

        /// Also print the solved current board of each round
        #[arg(long)]
        show_current: bool,

        /// Print per-round solver statistics
        #[arg(long)]
        summary: bool,

        /// Report format written to the output directory
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,

        /// Output directory for the run report (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create a default configuration and example boards
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Run and cross-check every round against direct rule evaluation
    Validate {
        #[command(flatten)]
        input: RunArgs,
    },
}

#[derive(clap::Args)]
struct RunArgs {
    /// Side length of the square board (overrides config)
    #[arg(short, long)]
    length: Option<usize>,

    /// Number of rounds to play (overrides config)
    #[arg(short, long)]
    rounds: Option<usize>,

    /// Board file; stdin is read when neither this nor the config names one
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "config/default.yaml")]
    config: PathBuf,

    /// Solver backend (overrides config)
    #[arg(short, long, value_enum)]
    backend: Option<BackendArg>,

    /// Maximum search nodes per round (overrides config)
    #[arg(long)]
    node_limit: Option<u64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    Propagation,
    Cadical,
}

impl From<BackendArg> for SolverBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Propagation => SolverBackend::Propagation,
            BackendArg::Cadical => SolverBackend::Cadical,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();

    match cli.command {
        Commands::Run {
            input,
            show_current,
            summary,
            format,
            output,
        } => {
            let overrides = CliOverrides {
                format: format.map(Into::into),
                output_dir: output,
                show_current,
                ..input.overrides()
            };
            run_command(&input.config, overrides, summary)
        }
        Commands::Setup { directory, force } => setup_command(directory, force),
        Commands::Validate { input } => validate_command(&input.config, input.overrides()),
    }
}

impl RunArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            length: self.length,
            rounds: self.rounds,
            backend: self.backend.map(Into::into),
            node_limit: self.node_limit,
            board_file: self.input.clone(),
            ..CliOverrides::default()
        }
    }
}

/// Load the config file if present, apply overrides and validate
fn load_settings(config_path: &PathBuf, overrides: &CliOverrides) -> Result<Settings> {
    let mut settings = if config_path.exists() {
        Settings::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        log::info!(
            "config file {} not found, using defaults",
            config_path.display()
        );
        Settings::default()
    };

    settings.merge_with_cli(overrides);
    settings
        .validate()
        .context("Configuration validation failed")?;
    Ok(settings)
}

fn load_initial_board(settings: &Settings) -> Result<Grid> {
    let length = settings.board.length;
    let grid = match settings.input.board_file {
        Some(ref path) => load_board_from_file(path, length)?,
        None => read_board(std::io::stdin().lock(), length)?,
    };

    let border = ActivationSet::from_grid(&grid)?.border_activations();
    if !border.is_empty() {
        log::warn!(
            "{} live cells on the border, e.g. {:?}; the border is always dead so round 1 has no solution",
            border.len(),
            border[0]
        );
    }
    Ok(grid)
}

fn execute(settings: &Settings) -> Result<RunReport> {
    let initial = load_initial_board(settings)?;
    let report = simulate(settings, &initial).context("Simulation failed")?;
    Ok(report)
}

fn run_command(config_path: &PathBuf, overrides: CliOverrides, summary: bool) -> Result<()> {
    let settings = load_settings(config_path, &overrides)?;
    let report = execute(&settings)?;

    print!(
        "{}",
        BoardFormatter::format_run(&report, settings.output.show_current)
    );

    if summary {
        println!("\n{}", BoardFormatter::format_run_summary(&report));
    }

    if let Some(ref dir) = settings.output.directory {
        let path = BoardFormatter::save_report(&report, dir, settings.output.format)
            .context("Failed to save run report")?;
        log::info!("run report saved to {}", path.display());
    }

    Ok(())
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    println!("{}", ColorOutput::info("Setting up project structure..."));

    let config_dir = directory.join("config");
    let boards_dir = directory.join("input/boards");
    let output_dir = directory.join("output/reports");

    for dir in [&config_dir, &boards_dir, &output_dir] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let config_path = config_dir.join("default.yaml");
    if !config_path.exists() || force {
        Settings::default()
            .to_file(&config_path)
            .context("Failed to create default configuration")?;
        println!("Created: {}", config_path.display());
    } else {
        println!("Skipped: {} (already exists)", config_path.display());
    }

    create_example_boards(&boards_dir).context("Failed to create example boards")?;
    println!("Created example boards in: {}", boards_dir.display());

    let examples_dir = config_dir.join("examples");
    std::fs::create_dir_all(&examples_dir)?;

    let mut blinker = Settings::default();
    blinker.simulation.rounds = 4;
    blinker.input.board_file = Some(PathBuf::from("input/boards/blinker.txt"));
    blinker.to_file(examples_dir.join("blinker.yaml"))?;

    let mut glider = Settings::default();
    glider.board.length = 6;
    glider.simulation.rounds = 3;
    glider.solver.backend = SolverBackend::Cadical;
    glider.input.board_file = Some(PathBuf::from("input/boards/glider.txt"));
    glider.output.directory = Some(PathBuf::from("output/reports"));
    glider.output.format = OutputFormat::Json;
    glider.to_file(examples_dir.join("glider.yaml"))?;

    println!("Created example configurations in: {}", examples_dir.display());

    println!("\n{}", ColorOutput::success("Setup complete!"));
    println!("\nNext steps:");
    println!("1. Edit configuration files in {}", config_dir.display());
    println!("2. Add your boards to {}", boards_dir.display());
    println!("3. Run: cargo run -- run --config config/examples/blinker.yaml");

    Ok(())
}

fn validate_command(config_path: &PathBuf, overrides: CliOverrides) -> Result<()> {
    println!("{}", ColorOutput::info("Validating rounds against the direct rules..."));

    let settings = load_settings(config_path, &overrides)?;
    let report = execute(&settings)?;
    let result = RoundValidator::validate(&report);

    println!(
        "Checked {} rounds ({} cells) in {}ms",
        result.rounds_checked, result.cells_checked, result.validation_time_ms
    );

    if let Some(round) = report.outcome.stopped_at() {
        println!(
            "{}",
            ColorOutput::warning(&format!("Run stopped early at round {}", round))
        );
    }

    if result.is_valid {
        println!("{}", ColorOutput::success("All rounds follow the rules"));
        Ok(())
    } else {
        println!("{}", ColorOutput::error("Rule violations found"));
        for violation in &result.violations {
            println!("  {}", violation);
        }
        anyhow::bail!(result
            .error_message()
            .unwrap_or_else(|| "validation failed".to_string()))
    }
}
