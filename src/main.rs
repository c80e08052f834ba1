use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use tic_tac_grow::config::{AppConfig, LoggingConfig};
use tic_tac_grow::round::JsonFileScoreStore;
use tic_tac_grow::ui::App;

/// Play tic-tac-toe against a computer that may grow a drawn board.
#[derive(Parser)]
#[command(name = "tic-tac-grow", about = "Tic-tac-toe with a growing board")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "tic-tac-grow.toml")]
    config: PathBuf,

    /// Override where the score tally is kept
    #[arg(long)]
    score_file: Option<PathBuf>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_default_config {
        print!("{}", AppConfig::default_toml()?);
        return Ok(());
    }

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(path) = cli.score_file {
        config.score.path = path;
    }
    config.validate()?;
    init_logging(&config.logging)?;

    let store = JsonFileScoreStore::new(&config.score.path);
    let mut app = App::new(config.pacing, store);
    run(&mut app).context("terminal UI failed")
}

/// Send tracing output to the configured log file. Without one, nothing is
/// installed: the terminal belongs to the UI.
fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let Some(path) = &logging.file else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.filter))
        .context("invalid logging.filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run(app: &mut App<JsonFileScoreStore>) -> io::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = app.run(&mut terminal);

    // Restore terminal even when the app failed
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    res
}
