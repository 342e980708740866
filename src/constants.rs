// Shared constants for the statistics collector

/// Earth radius used by the haversine distance (km).
pub const EARTH_RADIUS_KM: f64 = 6378.137;

/// Nautical miles per kilometre.
pub const NM_PER_KM: f64 = 0.53996;

/// Seconds an (icao24, callsign) pair stays in the flight buffer.
pub const FLIGHT_BUFFER_TTL_SECS: i64 = 1800;

/// Number of polar range slots, one per whole degree of bearing.
pub const POLAR_SLOTS: usize = 360;

/// Highest flight level tracked by the altitude histogram (FL000..=FL500).
pub const MAX_FLIGHT_LEVEL: usize = 500;

/// Number of altitude histogram buckets.
pub const ALTITUDE_BUCKETS: usize = MAX_FLIGHT_LEVEL + 1;

/// Snapshot flush period (s).
pub const FLUSH_PERIOD_SECS: i64 = 60;

/// Snapshot path used for scratch starts when none is given.
pub const DEFAULT_SNAPSHOT_PATH: &str = "./stats.out";

/// Airline reference database, relative to the executable directory.
pub const DEFAULT_AIRLINE_DB: &str = "data/iata-icao.db";

/// Capacity of the line channel between the feeder and the collector.
pub const LINE_CHANNEL_CAPACITY: usize = 1024;

// Chart artifact file names
pub const POLAR_PLOT_FILE: &str = "polarPlot.js";
pub const HEAT_MAP_FILE: &str = "heatMap.js";
pub const AIRLINE_CSV_FILE: &str = "airline.csv";
pub const ALTITUDE_CSV_FILE: &str = "altitude.csv";
