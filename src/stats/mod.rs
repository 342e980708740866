// Statistics engine
//
// Owns the four aggregates (polar range, heat map, airline counts, altitude
// histogram) plus the flight dedup buffer, and applies one SBS line at a time.
// All mutation goes through `process_at` and `evict_flights`.

pub mod airline;
pub mod altitude;
pub mod heatmap;
pub mod polar;

use std::fmt;

use tracing::trace;

use crate::constants::FLIGHT_BUFFER_TTL_SECS;
use crate::flight_buffer::{FlightBuffer, FlightStamp};
use crate::geodesy::Coordinate;
use crate::sbs::{parse_line, SbsMessage};

pub use airline::{airline_prefix, AirlineCounts};
pub use altitude::AltitudeHistogram;
pub use heatmap::HeatMap;
pub use polar::PolarRange;

/// What a processed line turned out to be (for logging)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// MSG,1
    Id,
    /// MSG,3
    AirbornePosition,
    /// Malformed or not aggregated
    Discarded,
}

impl MessageKind {
    /// SBS transmission type, 0 for discarded lines
    pub fn code(self) -> u8 {
        match self {
            MessageKind::Id => 1,
            MessageKind::AirbornePosition => 3,
            MessageKind::Discarded => 0,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Id => write!(f, "ID"),
            MessageKind::AirbornePosition => write!(f, "AIRBORNE_POSITION"),
            MessageKind::Discarded => write!(f, "DISCARDED"),
        }
    }
}

/// The state bundle
#[derive(Debug, Clone)]
pub struct Stats {
    /// Process start, seconds since epoch
    uptime: i64,
    /// Last snapshot, seconds since epoch
    timestamp: i64,
    reference: Coordinate,
    polar: PolarRange,
    heatmap: HeatMap,
    airlines: AirlineCounts,
    altitudes: AltitudeHistogram,
    flight_buffer: FlightBuffer,
}

impl Stats {
    /// Scratch start around a receiver position
    pub fn new(reference: Coordinate, now: i64) -> Self {
        Stats {
            uptime: now,
            timestamp: now,
            reference,
            polar: PolarRange::new(reference),
            heatmap: HeatMap::new(),
            airlines: AirlineCounts::new(),
            altitudes: AltitudeHistogram::new(),
            flight_buffer: FlightBuffer::new(),
        }
    }

    /// Reassemble restored aggregates; the flight buffer starts empty
    pub fn from_parts(
        uptime: i64,
        timestamp: i64,
        reference: Coordinate,
        polar: PolarRange,
        altitudes: AltitudeHistogram,
        heatmap: HeatMap,
        airlines: AirlineCounts,
    ) -> Self {
        Stats {
            uptime,
            timestamp,
            reference,
            polar,
            heatmap,
            airlines,
            altitudes,
            flight_buffer: FlightBuffer::new(),
        }
    }

    /// Apply one line at the current wall clock time
    pub fn process(&mut self, line: &str) -> MessageKind {
        self.process_at(line, crate::scheduler::unix_now())
    }

    /// Apply one line as if received at `now`
    ///
    /// Malformed lines and unused record types leave the state untouched.
    pub fn process_at(&mut self, line: &str, now: i64) -> MessageKind {
        let message = match parse_line(line) {
            Ok(m) => m,
            Err(e) => {
                trace!("Discarding line: {}", e);
                return MessageKind::Discarded;
            }
        };

        match message {
            SbsMessage::Identification { icao24, callsign } => {
                if let (Some(icao24), Some(callsign)) = (icao24, callsign) {
                    self.record_flight(icao24, callsign, now);
                }
                MessageKind::Id
            }
            SbsMessage::AirbornePosition { altitude, position } => {
                if let Some(position) = position {
                    self.polar.offer(self.reference, position);
                    self.heatmap.record(position);
                }
                if let Some(altitude) = altitude {
                    self.altitudes.record(altitude);
                }
                MessageKind::AirbornePosition
            }
            SbsMessage::Other { .. } => MessageKind::Discarded,
        }
    }

    fn record_flight(&mut self, icao24: String, callsign: String, now: i64) {
        if self.flight_buffer.contains(&icao24, &callsign) {
            return;
        }
        if let Some(prefix) = airline_prefix(&callsign) {
            self.airlines.increment(prefix);
        }
        self.flight_buffer.insert(FlightStamp::new(icao24, callsign, now));
    }

    /// Drop flight buffer entries older than the TTL; returns how many went
    pub fn evict_flights(&mut self, now: i64) -> usize {
        self.flight_buffer.evict(now, FLIGHT_BUFFER_TTL_SECS)
    }

    pub(crate) fn set_timestamp(&mut self, timestamp: i64) {
        self.timestamp = timestamp;
    }

    pub fn uptime(&self) -> i64 {
        self.uptime
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn reference(&self) -> Coordinate {
        self.reference
    }

    pub fn polar(&self) -> &PolarRange {
        &self.polar
    }

    pub fn heatmap(&self) -> &HeatMap {
        &self.heatmap
    }

    pub fn airlines(&self) -> &AirlineCounts {
        &self.airlines
    }

    pub fn altitudes(&self) -> &AltitudeHistogram {
        &self.altitudes
    }

    pub fn flight_buffer(&self) -> &FlightBuffer {
        &self.flight_buffer
    }
}
