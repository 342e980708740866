// Airline reference database
//
// Tab separated, one airline per line:
//   <id> \t <ICAO code> \t <name> \t <IATA code> \t <country> [\t ...]
// Only the ICAO code, name and country are used.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use thiserror::Error;
use tracing::debug;

const FIELD_ICAO: usize = 1;
const FIELD_NAME: usize = 2;
const FIELD_COUNTRY: usize = 4;

#[derive(Debug, Error)]
pub enum AirlineDbError {
    #[error("unable to read airline database: {0}")]
    Io(#[from] io::Error),
    #[error("malformed airline database line {line}: expected 5 tab separated fields")]
    Malformed { line: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirlineInfo {
    pub name: String,
    pub country: String,
}

/// ICAO airline designator to name and country
#[derive(Debug, Clone, Default)]
pub struct AirlineDb {
    airlines: HashMap<String, AirlineInfo>,
}

impl AirlineDb {
    pub fn load(path: &Path) -> Result<Self, AirlineDbError> {
        let db = Self::from_reader(BufReader::new(File::open(path)?))?;
        debug!("Loaded {} airlines from {}", db.len(), path.display());
        Ok(db)
    }

    /// Blank lines are skipped; later lines win on duplicate codes
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, AirlineDbError> {
        let mut airlines = HashMap::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() <= FIELD_COUNTRY {
                return Err(AirlineDbError::Malformed { line: idx + 1 });
            }
            airlines.insert(
                fields[FIELD_ICAO].trim().to_string(),
                AirlineInfo {
                    name: fields[FIELD_NAME].trim().to_string(),
                    country: fields[FIELD_COUNTRY].trim().to_string(),
                },
            );
        }
        Ok(AirlineDb { airlines })
    }

    pub fn get(&self, icao: &str) -> Option<&AirlineInfo> {
        self.airlines.get(icao)
    }

    pub fn len(&self) -> usize {
        self.airlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airlines.is_empty()
    }
}
