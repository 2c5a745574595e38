mod app;
mod render;
mod theme;

use app::App;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use fireworks_core::{CelebrationConfig, GameStatus};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Victory fireworks in the terminal
#[derive(Debug, Parser)]
#[command(name = "fireworks", version, about)]
struct Cli {
    /// Celebration config (JSON). Defaults to fireworks.json in the user config dir
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for reproducible bursts
    #[arg(long)]
    seed: Option<u64>,

    /// Game state JSON from the game server; celebrates if it reports a win
    #[arg(long)]
    status: Option<PathBuf>,

    /// Start celebrating immediately
    #[arg(long)]
    auto: bool,

    /// Write logs here (RUST_LOG controls the level)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the effective config as JSON and exit
    #[arg(long)]
    print_config: bool,
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fireworks.json")
}

fn init_logging(log_file: Option<&PathBuf>) -> io::Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match log_file {
        Some(path) => {
            let file = fs::File::create(path)?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        // Anything on stderr would land on the alternate screen
        None => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    builder.init();
    Ok(())
}

fn to_io_error(e: impl std::error::Error + Send + Sync + 'static) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e)
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref())?;

    let config = match &cli.config {
        Some(path) => CelebrationConfig::load(path),
        None => CelebrationConfig::load_or_default(&default_config_path()),
    }
    .map_err(to_io_error)?;

    if cli.print_config {
        let json = serde_json::to_string_pretty(&config).map_err(to_io_error)?;
        println!("{}", json);
        return Ok(());
    }

    let status = match &cli.status {
        Some(path) => Some(GameStatus::from_json(&fs::read_to_string(path)?).map_err(to_io_error)?),
        None => None,
    };

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let (cols, rows) = terminal::size()?;
    let mut app = App::new(config, rng, cols, rows).map_err(to_io_error)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    if let Some(status) = &status {
        if !app.observe_status(status) {
            app.show_message("No winner in game state");
        }
    }
    if cli.auto {
        app.celebrate();
    }

    // Run the app
    let result = run_app(&mut stdout, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen)?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    Ok(())
}

fn run_app(stdout: &mut io::Stdout, app: &mut App) -> io::Result<()> {
    let mut last_tick = Instant::now();

    loop {
        // Determine tick rate based on whether anything is animating
        let tick_rate = app.get_tick_rate();

        // Render
        render::render(stdout, app)?;

        // Handle input with timeout for animation updates
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout.min(Duration::from_millis(33)))? {
            if let Event::Key(key) = event::read()? {
                // Release events would double every action on some terminals
                if key.kind == KeyEventKind::Press {
                    // Handle Ctrl+C
                    if key.modifiers.contains(KeyModifiers::CONTROL)
                        && key.code == KeyCode::Char('c')
                    {
                        break;
                    }

                    match app.handle_key(key) {
                        app::AppAction::Continue => {}
                        app::AppAction::Quit => break,
                    }
                }
            }
        }

        // Tick animations and timers
        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }
    }

    app.engine.stop_all();
    Ok(())
}
