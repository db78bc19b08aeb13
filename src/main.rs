mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    style::Stylize,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use pink_pine::audio::stream::{list_output_devices, select_device, start_noise_stream};
use pink_pine::config::{NoiseConfig, Overrides};
use pink_pine::noise::{Algorithm, NoiseEngine};
use pink_pine::types::events::EngineEvent;
use ui::{app::App, events, render};

/// Level reports buffered between the audio and UI threads
const EVENT_QUEUE_DEPTH: usize = 64;

/// Real-time pink and white noise generator
#[derive(Parser, Debug)]
#[command(name = "pink-pine")]
#[command(about = "Pink noise (Voss, Voss-McCartney) and white noise generator", long_about = None)]
struct Args {
    /// Algorithm: 1 = Voss, 2 = Voss-McCartney, 3 = white noise
    #[arg(short = 'a', long = "algorithm", value_parser = clap::value_parser!(u8).range(1..=3))]
    algorithm: Option<u8>,

    /// Volume in percent (1-100)
    #[arg(short = 'v', long = "volume", value_parser = clap::value_parser!(u32).range(1..=100))]
    volume: Option<u32>,

    /// Number of generators (1-32)
    #[arg(short = 'g', long = "generators", value_parser = clap::value_parser!(u32).range(1..=32))]
    generators: Option<u32>,

    /// Skip the loud white noise warning
    #[arg(short = 'w', long = "no-warning")]
    no_warning: bool,

    /// Configuration file (YAML)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Output device name or index
    #[arg(short = 'd', long = "device")]
    device: Option<String>,

    /// List available devices and algorithms, then exit
    #[arg(short = 'l', long = "list")]
    list: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init()
        .ok();

    let args = Args::parse();

    if args.list {
        return print_listing();
    }

    let mut config = match &args.config {
        Some(path) => NoiseConfig::load(path)?,
        None => NoiseConfig::default(),
    };
    config
        .apply(Overrides {
            volume: args.volume,
            generators: args.generators,
            algorithm: args.algorithm,
            audioout: args.device,
            no_warning: args.no_warning,
        })
        .context("Invalid command line settings")?;
    let params = config.parameters().context("Invalid noise settings")?;

    println!("Volume : {} %", config.volume);
    println!("Generator count : {}", config.generators);
    println!("Algorithm : {}", config.algorithm);

    if config.needs_loud_warning() && !confirm_loud_playback()? {
        tracing::info!("playback declined at hearing warning");
        return Ok(());
    }

    tracing::debug!(?params, algorithm = ?config.algorithm, "noise parameters");

    let device = select_device(&config.audioout)?;
    let (event_tx, event_rx) = crossbeam_channel::bounded::<EngineEvent>(EVENT_QUEUE_DEPTH);
    let engine = NoiseEngine::new(config.algorithm, params);
    let (stream, info) = start_noise_stream(&device, engine, event_tx)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config.algorithm, params, info);
    let result = run_ui_loop(&mut terminal, &mut app, event_rx);

    // Restore terminal even if the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    drop(stream);
    tracing::info!("output stream stopped");
    result
}

/// Print output devices and algorithms
fn print_listing() -> Result<()> {
    println!("Available Audio Output Devices:");
    for (i, device) in list_output_devices()?.iter().enumerate() {
        println!("  {}: {}", i, device);
    }

    println!("\nAlgorithms (-a):");
    for algorithm in Algorithm::ALL {
        let marker = if algorithm == Algorithm::default() { " (default)" } else { "" };
        println!("  [{}] {}{}", algorithm.index(), algorithm, marker);
    }
    Ok(())
}

/// Ask the user to confirm loud white noise playback
fn confirm_loud_playback() -> Result<bool> {
    println!(
        "{}",
        "WARNING, loud white noise may cause hearing injuries (skip this warning with -w)"
            .red()
            .bold()
    );
    print!("Are you sure you want to proceed ? (Y/N) ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_confirmation(&answer))
}

fn is_confirmation(answer: &str) -> bool {
    matches!(answer.trim_start().chars().next(), Some('y' | 'Y'))
}

/// Run the status UI until the user quits
fn run_ui_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    event_rx: crossbeam_channel::Receiver<EngineEvent>,
) -> Result<()> {
    loop {
        // Drain reports from the audio thread
        while let Ok(event) = event_rx.try_recv() {
            app.handle_engine_event(event);
        }

        // Render UI
        terminal.draw(|f| render::render(f, app))?;

        // Handle events (polls with a ~16 ms timeout, pacing the loop)
        events::handle_events(app)?;

        if app.should_quit {
            break;
        }

        app.tick();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_cli_flags() {
        let args = Args::try_parse_from(["pink-pine", "-a", "1", "-v", "40", "-g", "12", "-w"]).unwrap();
        assert_eq!(args.algorithm, Some(1));
        assert_eq!(args.volume, Some(40));
        assert_eq!(args.generators, Some(12));
        assert!(args.no_warning);
    }

    #[test]
    fn test_cli_rejects_out_of_range() {
        assert!(Args::try_parse_from(["pink-pine", "-a", "4"]).is_err());
        assert!(Args::try_parse_from(["pink-pine", "-v", "0"]).is_err());
        assert!(Args::try_parse_from(["pink-pine", "-v", "101"]).is_err());
        assert!(Args::try_parse_from(["pink-pine", "-g", "33"]).is_err());
    }

    #[test]
    fn test_confirmation_answers() {
        assert!(is_confirmation("y\n"));
        assert!(is_confirmation("Yes\n"));
        assert!(!is_confirmation("n\n"));
        assert!(!is_confirmation("\n"));
    }
}
