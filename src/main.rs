use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use track_o_mat::config::Config;
use track_o_mat::sink::HttpSink;
use track_o_mat::source::{self, Pace, Track};
use track_o_mat::tracker::{Tracker, TrackerSettings};
use track_o_mat::web;

#[derive(Parser)]
#[command(name = "track-o-mat")]
#[command(about = "Vehicle location tracking client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a config file
    Validate { config: String },
    /// Run one tracking session over a recorded track
    Replay {
        config: String,
        track: String,
        /// Wait the recorded time between samples
        #[arg(long)]
        realtime: bool,
    },
    /// Serve the tracking control API
    Serve { config: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config } => validate(&config),
        Commands::Replay {
            config,
            track,
            realtime,
        } => replay(&config, &track, realtime).await,
        Commands::Serve { config } => serve(&config).await,
    }
}

fn load_config(path: &str) -> Option<Config> {
    match Config::from_file(path) {
        Ok(c) => Some(c),
        Err(e) => {
            eprintln!("Config error: {}", e);
            None
        }
    }
}

fn build_sink(config: &Config) -> Option<HttpSink> {
    match HttpSink::new(&config.tracker.base_url, config.tracker.request_timeout) {
        Ok(s) => Some(s),
        Err(e) => {
            eprintln!("Sink error: {}", e);
            None
        }
    }
}

fn build_tracker(config: &Config, sink: &HttpSink) -> Tracker {
    log::info!("Reporting to {}", sink.endpoint());

    let settings = TrackerSettings {
        vehicle_id: config.tracker.vehicle_id.clone(),
        gate: config.gate,
    };
    Tracker::new(settings, Arc::new(sink.clone()))
}

fn validate(path: &str) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };
    let Some(sink) = build_sink(&config) else {
        return ExitCode::FAILURE;
    };

    println!("Config is valid");
    println!("  vehicle:  {}", config.tracker.vehicle_id);
    println!("  endpoint: {}", sink.endpoint());
    println!(
        "  timeout:  {}",
        humantime::format_duration(config.tracker.request_timeout)
    );
    println!(
        "  gate:     every {} m or {}",
        config.gate.min_distance_m,
        humantime::format_duration(config.gate.max_interval)
    );
    println!(
        "  source:   at most every {}, after {} m",
        humantime::format_duration(config.source.min_update_interval),
        config.source.min_update_distance_m
    );
    println!("  web:      {}", config.web.bind);
    ExitCode::SUCCESS
}

async fn replay(config_path: &str, track_path: &str, realtime: bool) -> ExitCode {
    let Some(config) = load_config(config_path) else {
        return ExitCode::FAILURE;
    };
    let track = match Track::from_file(track_path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Track error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let Some(sink) = build_sink(&config) else {
        return ExitCode::FAILURE;
    };
    let mut tracker = build_tracker(&config, &sink);

    if let Err(e) = tracker.start() {
        eprintln!("Tracker error: {}", e);
        return ExitCode::FAILURE;
    }

    let pace = if realtime { Pace::Realtime } else { Pace::Immediate };
    let result = source::replay(&track, &config.source, &tracker, pace).await;
    tracker.stop().await;

    // Each send is bounded by the request timeout.
    let abandoned = sink
        .flush(config.tracker.request_timeout + Duration::from_secs(1))
        .await;

    match result {
        Ok(summary) => {
            let counters = tracker.status().counters;
            let stats = sink.stats();
            println!(
                "Replayed {} samples ({} filtered at source): {} accepted, {} skipped",
                track.len(),
                summary.filtered,
                counters.accepted,
                counters.rejected
            );
            println!(
                "Delivered {}, failed {}, abandoned {}",
                stats.delivered, stats.failed, abandoned
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Replay error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn serve(path: &str) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };
    let Some(sink) = build_sink(&config) else {
        return ExitCode::FAILURE;
    };
    let tracker = build_tracker(&config, &sink);

    match web::run_server(&config.web.bind, web::AppState::new(tracker)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}
