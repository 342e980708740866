use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::constants::DEFAULT_SNAPSHOT_PATH;
use crate::geodesy::Coordinate;

/// dump1090 feed statistics collector
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    #[command(subcommand)]
    pub mode: Mode,

    /// Verbose logging (DEBUG level, one event per message)
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Mode {
    /// Collect statistics from an SBS feed
    Collect(CollectArgs),
    /// Convert a snapshot into chart scripts and CSV files
    Convert(ConvertArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CollectArgs {
    /// Receiver latitude for a scratch start (decimal degrees)
    #[arg(long, short = 'p', requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Receiver longitude for a scratch start (decimal degrees)
    #[arg(long, short = 'm', requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Snapshot to load (required without --lat/--lon) and to write
    #[arg(long, short = 'f', value_name = "FILE", required_unless_present = "lat")]
    pub file: Option<PathBuf>,

    /// Print every received message
    #[arg(long, short = 'd', default_value_t = false)]
    pub display: bool,

    /// Write the log to FILE instead of stderr
    #[arg(long, short = 'l', value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// SBS source host (127.0.0.1 for a local dump1090)
    pub host: String,

    /// SBS source port (30003 for dump1090)
    pub port: u16,
}

/// How the collector obtains its initial state
#[derive(Debug, Clone, PartialEq)]
pub enum StartMode {
    /// Empty statistics around a receiver position
    Scratch(Coordinate),
    /// Restore from a snapshot
    Load,
}

impl CollectArgs {
    pub fn start_mode(&self) -> StartMode {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => StartMode::Scratch(Coordinate::new(lat, lon)),
            _ => StartMode::Load,
        }
    }

    /// Snapshot path, defaulting for scratch starts
    pub fn snapshot_path(&self) -> PathBuf {
        self.file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_PATH))
    }

    pub fn source_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// Leave out airlines with this many flights or fewer
    #[arg(long, short = 't', default_value_t = 0)]
    pub threshold: u64,

    /// Airline database (defaults to data/iata-icao.db next to the executable)
    #[arg(long, value_name = "FILE")]
    pub airline_db: Option<PathBuf>,

    /// Snapshot to convert
    pub file: PathBuf,

    /// Output directory
    #[arg(default_value = ".")]
    pub out_dir: PathBuf,
}
