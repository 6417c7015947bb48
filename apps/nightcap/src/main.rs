//! Nightcap - terminal internet radio with a sleep timer.
//!
//! Plays one station at a time through an external player process, reads
//! commands from stdin and prints readouts as player events arrive.

mod config;
mod console;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use nightcap_core::{
    bootstrap_player, LoggingEventEmitter, PlayerCommand, PlayerServices, ProcessOutput,
    StreamProbe,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio_stream::StreamExt;

use crate::config::AppConfig;
use crate::console::{Command, StationRef};

/// Nightcap - internet radio player with a sleep timer.
#[derive(Parser, Debug)]
#[command(name = "nightcap")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (YAML).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(short, long, default_value = "warn", env = "NIGHTCAP_LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// Initial volume, 0.0 to 1.0 (overrides config file).
    #[arg(short, long)]
    volume: Option<f32>,

    /// Zero-based index of the initial station (overrides config file).
    #[arg(short, long)]
    station: Option<usize>,

    /// Do not start playing on launch.
    #[arg(long)]
    no_autoplay: bool,

    /// Player program to launch (overrides config file). mpv keeps the mpv
    /// arguments; any other program receives only the stream address.
    #[arg(long, value_name = "PROGRAM")]
    player: Option<String>,

    /// Check each stream over HTTP before launching the player.
    #[arg(long)]
    preflight: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp_millis()
        .init();

    log::info!("Nightcap v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config =
        AppConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Apply CLI overrides
    if let Some(volume) = args.volume {
        config.volume = volume;
    }
    if let Some(station) = args.station {
        config.station = station;
    }
    if args.no_autoplay {
        config.autoplay = false;
    }
    if let Some(program) = args.player {
        config.player = PlayerCommand::for_program(program);
    }
    if args.preflight {
        config.preflight = true;
    }

    log::info!(
        "Configuration: player={}, station={}, volume={}, autoplay={}",
        config.player.program,
        config.station,
        config.volume,
        config.autoplay
    );

    let mut output =
        ProcessOutput::new(config.player.clone()).with_startup_grace(config.startup_grace());
    if config.preflight {
        let probe = StreamProbe::new().context("Failed to create HTTP client")?;
        output = output.with_preflight(probe);
    }

    let services = bootstrap_player(&config.to_player_config(), Box::new(output))
        .context("Failed to bootstrap player")?;
    if args.log_level >= log::LevelFilter::Debug {
        services
            .event_bridge
            .set_external_emitter(Arc::new(LoggingEventEmitter));
    }
    let events = services.event_bridge.event_stream();
    tokio::pin!(events);

    services.start_background_tasks();

    println!("Nightcap v{} (type 'help' for commands)", env!("CARGO_PKG_VERSION"));
    let (stations, selected) = services.stations().await;
    println!("{}", render::stations(&stations, selected));

    let state = services.initialize().await;
    if !config.autoplay {
        let station = services.selected_station().await;
        println!("{}", render::playback(&state, &station.display_name));
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                log::info!("Shutdown signal received, cleaning up...");
                break;
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => match console::parse_command(&line) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => run_command(&services, command).await,
                    Ok(None) => {}
                    Err(e) => println!("{:#}", e),
                },
                Ok(None) => {
                    log::info!("Input closed, cleaning up...");
                    break;
                }
                Err(e) => {
                    log::error!("Failed to read input: {}", e);
                    break;
                }
            },
            Some(event) = events.next() => {
                if let Some(text) = render::event(&event) {
                    println!("{}", text);
                }
            }
        }
    }

    // Graceful shutdown
    services.shutdown().await;

    log::info!("Shutdown complete");
    Ok(())
}

/// Executes one console command and prints its readout.
///
/// Playback changes are announced through events, so station and toggle
/// commands print nothing on success.
async fn run_command(services: &PlayerServices, command: Command) {
    match command {
        Command::Stations => {
            let (stations, selected) = services.stations().await;
            println!("{}", render::stations(&stations, selected));
        }
        Command::Select(station) => {
            let result = match station {
                StationRef::Index(index) => services.change_station_index(index).await,
                StationRef::Address(address) => services.change_station(&address).await,
            };
            if let Err(e) = result {
                println!("{}", e);
            }
        }
        Command::Toggle => {
            services.toggle_playback().await;
        }
        Command::Volume(volume) => {
            if let Err(e) = services.set_volume(volume).await {
                println!("{}", e);
            }
        }
        Command::Timer(minutes) => {
            if let Err(e) = services.start_timer(minutes) {
                println!("{}", e);
            }
        }
        Command::Cancel => {
            if !services.cancel_timer() {
                println!("No sleep timer running");
            }
        }
        Command::Status => {
            let station = services.selected_station().await;
            println!("{}", render::playback(&services.playback(), &station.display_name));
            if let Some(line) = render::timer(&services.timer()) {
                println!("{}", line);
            }
        }
        Command::Info => {
            let station = services.selected_station().await;
            match StreamProbe::new() {
                Ok(probe) => match probe.probe(&station.stream_address).await {
                    Ok(info) => println!("{}", render::stream_info(&info)),
                    Err(e) => println!("{} ({})", e, e.detail().unwrap_or("no detail")),
                },
                Err(e) => println!("Failed to create HTTP client: {}", e),
            }
        }
        Command::Clock => match render::clock(&services.clock_state()) {
            Some(line) => println!("{}", line),
            None => println!("Clock not running"),
        },
        Command::Help => println!("{}", console::HELP),
        Command::Quit => {}
    }
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
