// SBS record parsing
//
// BaseStation records are single CSV lines. Field 1 is the record tag, field 2
// the transmission type of MSG records. Field layout of MSG (1-indexed):
//
//   1 MSG              7 date generated     13 ground speed    19 alert
//   2 transmission     8 time generated     14 track           20 emergency
//   3 session id       9 date logged        15 latitude        21 SPI
//   4 aircraft id     10 time logged        16 longitude       22 on ground
//   5 ICAO24 hex      11 callsign           17 vertical rate
//   6 flight id       12 altitude (ft)      18 squawk
//
// Transmission types: 1 ID, 2 surface position, 3 airborne position,
// 4 airborne velocity, 5 surveillance altitude, 6 surveillance ID (squawk),
// 7 air-to-air, 8 all-call reply. Only 1 and 3 carry data we aggregate.

use std::str::FromStr;

use thiserror::Error;

use crate::geodesy::Coordinate;

// 0-indexed field positions
const FIELD_TAG: usize = 0;
const FIELD_TRANSMISSION: usize = 1;
const FIELD_ICAO24: usize = 4;
const FIELD_CALLSIGN: usize = 10;
const FIELD_ALTITUDE: usize = 11;
const FIELD_LAT: usize = 14;
const FIELD_LON: usize = 15;

/// Transmission type of an ID message
pub const TRANSMISSION_ID: u8 = 1;
/// Transmission type of an airborne position message
pub const TRANSMISSION_AIRBORNE_POSITION: u8 = 3;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SbsParseError {
    #[error("empty line")]
    Empty,
    #[error("unknown record tag '{0}'")]
    UnknownRecord(String),
    #[error("invalid transmission type '{0}'")]
    InvalidTransmissionType(String),
    #[error("invalid {field} '{value}'")]
    InvalidNumber { field: &'static str, value: String },
    #[error("position out of range ({lat}, {lon})")]
    InvalidPosition { lat: f64, lon: f64 },
}

/// Record tag (field 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordTag {
    /// Transmission message, the only kind dump1090 emits
    Msg,
    /// New aircraft
    Air,
    /// Callsign first seen or changed
    Id,
    /// Selection change
    Sel,
    /// Status change
    Sta,
    /// Clock
    Clk,
}

impl FromStr for RecordTag {
    type Err = SbsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "MSG" => Ok(RecordTag::Msg),
            "AIR" => Ok(RecordTag::Air),
            "ID" => Ok(RecordTag::Id),
            "SEL" => Ok(RecordTag::Sel),
            "STA" => Ok(RecordTag::Sta),
            "CLK" => Ok(RecordTag::Clk),
            other => Err(SbsParseError::UnknownRecord(other.to_string())),
        }
    }
}

/// The facts of one SBS record relevant to statistics
///
/// Empty fields are carried as `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum SbsMessage {
    /// MSG,1
    Identification {
        icao24: Option<String>,
        callsign: Option<String>,
    },
    /// MSG,3
    AirbornePosition {
        /// Barometric altitude in feet
        altitude: Option<i32>,
        /// Present only when both latitude and longitude are
        position: Option<Coordinate>,
    },
    /// Any other record or transmission type
    Other {
        tag: RecordTag,
        transmission: Option<u8>,
    },
}

/// Field accessor: missing trailing fields read as empty
fn field<'a>(fields: &[&'a str], idx: usize) -> Option<&'a str> {
    fields
        .get(idx)
        .copied()
        .map(str::trim)
        .filter(|f| !f.is_empty())
}

fn parse_number<T: FromStr>(value: Option<&str>, name: &'static str) -> Result<Option<T>, SbsParseError> {
    match value {
        None => Ok(None),
        Some(v) => v.parse::<T>().map(Some).map_err(|_| SbsParseError::InvalidNumber {
            field: name,
            value: v.to_string(),
        }),
    }
}

/// Parse one SBS line (line terminator optional)
///
/// Fails on an unknown tag, a non-numeric transmission type of a MSG record,
/// or a non-empty numeric field of a used message that does not parse. A
/// failed line is meant to be dropped by the caller.
pub fn parse_line(line: &str) -> Result<SbsMessage, SbsParseError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Err(SbsParseError::Empty);
    }

    let fields: Vec<&str> = line.split(',').collect();
    let tag: RecordTag = fields[FIELD_TAG].parse()?;

    if tag != RecordTag::Msg {
        return Ok(SbsMessage::Other { tag, transmission: None });
    }

    let raw_type = fields.get(FIELD_TRANSMISSION).copied().map(str::trim).unwrap_or("");
    let transmission: u8 = raw_type
        .parse()
        .map_err(|_| SbsParseError::InvalidTransmissionType(raw_type.to_string()))?;

    match transmission {
        TRANSMISSION_ID => Ok(SbsMessage::Identification {
            icao24: field(&fields, FIELD_ICAO24).map(str::to_string),
            callsign: field(&fields, FIELD_CALLSIGN).map(str::to_string),
        }),
        TRANSMISSION_AIRBORNE_POSITION => {
            let altitude = parse_number::<i32>(field(&fields, FIELD_ALTITUDE), "altitude")?;
            let lat = parse_number::<f64>(field(&fields, FIELD_LAT), "latitude")?;
            let lon = parse_number::<f64>(field(&fields, FIELD_LON), "longitude")?;

            let position = match (lat, lon) {
                (Some(lat), Some(lon)) => {
                    let p = Coordinate::new(lat, lon);
                    if !p.is_valid() {
                        return Err(SbsParseError::InvalidPosition { lat, lon });
                    }
                    Some(p)
                }
                _ => None,
            };

            Ok(SbsMessage::AirbornePosition { altitude, position })
        }
        other => Ok(SbsMessage::Other {
            tag,
            transmission: Some(other),
        }),
    }
}
