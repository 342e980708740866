// ADS-B Statistics Collector - Main Entry Point
// Copyright (C) 2024 - adsb-stats contributors
// Licensed under GPL v3 or later

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use adsb_stats::airline_db::AirlineDb;
use adsb_stats::collector::Collector;
use adsb_stats::config::{CollectArgs, Config, ConvertArgs, Mode, StartMode};
use adsb_stats::constants::{DEFAULT_AIRLINE_DB, LINE_CHANNEL_CAPACITY};
use adsb_stats::net::{connect_source, forward_lines};
use adsb_stats::output::write_charts;
use adsb_stats::scheduler::unix_now;
use adsb_stats::snapshot;
use adsb_stats::stats::Stats;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let config = Config::parse();

    let log_file = match &config.mode {
        Mode::Collect(args) => args.log.as_deref(),
        Mode::Convert(_) => None,
    };
    init_logging(config.verbose, log_file)?;

    match config.mode {
        Mode::Collect(args) => collect(args).await,
        Mode::Convert(args) => convert(args),
    }
}

async fn collect(args: CollectArgs) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot_path = args.snapshot_path();
    let now = unix_now();

    let stats = match args.start_mode() {
        StartMode::Scratch(reference) => {
            if !reference.is_valid() {
                error!("Invalid receiver position {}", reference);
                return Err(format!("invalid receiver position {}", reference).into());
            }
            info!("Scratch start at {}, writing {}", reference, snapshot_path.display());
            Stats::new(reference, now)
        }
        StartMode::Load => match snapshot::load(&snapshot_path, now) {
            Ok(stats) => {
                info!("Loading start from {}", snapshot_path.display());
                stats
            }
            Err(e) => {
                error!("Unable to load {}: {}", snapshot_path.display(), e);
                return Err(e.into());
            }
        },
    };

    let conn = match connect_source(&args.source_addr()).await {
        Ok(conn) => conn,
        Err(e) => {
            error!("Unable to connect to {}: {}", args.source_addr(), e);
            return Err(e.into());
        }
    };

    let (tx, rx) = mpsc::channel(LINE_CHANNEL_CAPACITY);
    let feeder = tokio::spawn(forward_lines(conn, tx));

    let mut collector = Collector::new(stats, snapshot_path, args.display);
    let shutdown = collector.run(rx).await;
    info!("Collector stopped ({:?})", shutdown);

    feeder.abort();
    match feeder.await {
        Ok(Err(e)) => error!("SBS source error: {}", e),
        Ok(Ok(lines)) => info!("Feeder forwarded {} lines", lines),
        Err(_) => {} // aborted on shutdown
    }

    info!("Program is correctly ending.");
    Ok(())
}

fn convert(args: ConvertArgs) -> Result<(), Box<dyn std::error::Error>> {
    let stats = match snapshot::load(&args.file, unix_now()) {
        Ok(stats) => stats,
        Err(e) => {
            error!("Unable to load {}: {}", args.file.display(), e);
            return Err(e.into());
        }
    };

    let db_path = args.airline_db.clone().unwrap_or_else(default_airline_db);
    let db = match AirlineDb::load(&db_path) {
        Ok(db) => db,
        Err(e) => {
            error!("Error while loading airline database {}: {}", db_path.display(), e);
            return Err(e.into());
        }
    };

    write_charts(&args.out_dir, &stats, &db, args.threshold)?;
    println!("Converting successful.");
    Ok(())
}

/// data/iata-icao.db next to the executable, or relative to the working directory
fn default_airline_db() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_AIRLINE_DB)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_AIRLINE_DB))
}

/// Initialize logging subsystem
fn init_logging(verbose: bool, log_file: Option<&Path>) -> std::io::Result<()> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .with_max_level(level);

    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            subscriber.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => subscriber.with_writer(std::io::stderr).init(),
    }

    if verbose {
        info!("Verbose logging enabled (DEBUG level)");
    }
    Ok(())
}
