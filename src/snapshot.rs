// Snapshot file codec
//
// The snapshot is the only durable copy of the statistics. Layout (LF endings):
//
//   timestamp                 seconds since epoch of the write
//   ref.lat
//   ref.lon
//   360 x "lat|lon"           polar range, 4 decimals, bearing 0..359
//   <blank>
//   501 x count               altitude histogram, FL000..FL500
//   <blank>
//   n x "key|count"           heat map cells
//   <blank>
//   n x "PFX|count"           airline counts
//   <blank>
//   $                         end marker
//
// Loading is all or nothing. The flight buffer is not stored and uptime is
// taken from the loading process.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::constants::{ALTITUDE_BUCKETS, POLAR_SLOTS};
use crate::geodesy::Coordinate;
use crate::stats::airline::is_valid_prefix;
use crate::stats::{AirlineCounts, AltitudeHistogram, HeatMap, PolarRange, Stats};

const END_MARKER: &str = "$";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("unable to access snapshot file: {0}")]
    Io(#[from] io::Error),
    #[error("invalid format of init file (line {line}): {reason}")]
    Format { line: usize, reason: String },
}

/// Write the snapshot to `path`, stamping it with `now`
///
/// The file is written next to `path` under a `.tmp` suffix and renamed over
/// it, so a crash mid-write leaves the previous snapshot intact.
pub fn export(stats: &mut Stats, path: &Path, now: i64) -> Result<(), SnapshotError> {
    let tmp = tmp_path(path);
    let file = File::create(&tmp)?;
    stats.set_timestamp(now);

    let result = write_file(stats, file).and_then(|()| fs::rename(&tmp, path));
    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    debug!("Snapshot written to {}", path.display());
    Ok(())
}

fn write_file(stats: &Stats, file: File) -> io::Result<()> {
    let mut writer = BufWriter::new(file);
    write_snapshot(stats, &mut writer)?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()
}

/// Restore statistics from the snapshot at `path`; `now` becomes the uptime
pub fn load(path: &Path, now: i64) -> Result<Stats, SnapshotError> {
    let file = File::open(path)?;
    let stats = read_snapshot(BufReader::new(file), now)?;
    info!(
        "Loaded snapshot {} ({} heat map cells, {} airlines)",
        path.display(),
        stats.heatmap().len(),
        stats.airlines().len()
    );
    Ok(stats)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Serialize in snapshot layout
pub fn write_snapshot<W: Write>(stats: &Stats, w: &mut W) -> io::Result<()> {
    let reference = stats.reference();
    writeln!(w, "{}", stats.timestamp())?;
    writeln!(w, "{}", reference.lat)?;
    writeln!(w, "{}", reference.lon)?;

    for p in stats.polar().slots() {
        writeln!(w, "{:.4}|{:.4}", p.lat, p.lon)?;
    }
    writeln!(w)?;

    for count in stats.altitudes().buckets() {
        writeln!(w, "{}", count)?;
    }
    writeln!(w)?;

    for (key, count) in stats.heatmap().iter() {
        writeln!(w, "{}|{}", key, count)?;
    }
    writeln!(w)?;

    for (prefix, count) in stats.airlines().iter() {
        writeln!(w, "{}|{}", prefix, count)?;
    }
    writeln!(w)?;

    write!(w, "{}", END_MARKER)?;
    w.flush()
}

/// Line source that tracks the 1-based line number for error messages
struct SnapshotReader<R> {
    lines: io::Lines<R>,
    line_no: usize,
}

impl<R: BufRead> SnapshotReader<R> {
    fn new(reader: R) -> Self {
        SnapshotReader { lines: reader.lines(), line_no: 0 }
    }

    fn error(&self, reason: impl Into<String>) -> SnapshotError {
        SnapshotError::Format { line: self.line_no, reason: reason.into() }
    }

    fn next_line(&mut self, expected: &str) -> Result<String, SnapshotError> {
        self.line_no += 1;
        match self.lines.next() {
            Some(line) => Ok(line?),
            None => Err(self.error(format!("unexpected end of file, expected {}", expected))),
        }
    }

    fn parse<T: std::str::FromStr>(&self, text: &str, what: &str) -> Result<T, SnapshotError> {
        text.trim()
            .parse()
            .map_err(|_| self.error(format!("malformed {} '{}'", what, text)))
    }

    fn blank(&mut self, after: &str) -> Result<(), SnapshotError> {
        let line = self.next_line(&format!("blank line after {}", after))?;
        if line.is_empty() {
            Ok(())
        } else {
            Err(self.error(format!("expected blank line after {}, found '{}'", after, line)))
        }
    }

    fn pair<'a>(&self, line: &'a str, what: &str) -> Result<(&'a str, &'a str), SnapshotError> {
        line.split_once('|')
            .ok_or_else(|| self.error(format!("malformed {} '{}'", what, line)))
    }
}

/// Deserialize a snapshot; `now` becomes the uptime
pub fn read_snapshot<R: BufRead>(reader: R, now: i64) -> Result<Stats, SnapshotError> {
    let mut r = SnapshotReader::new(reader);

    let line = r.next_line("timestamp")?;
    let timestamp: i64 = r.parse(&line, "timestamp")?;

    let line = r.next_line("reference latitude")?;
    let lat: f64 = r.parse(&line, "reference latitude")?;
    let line = r.next_line("reference longitude")?;
    let lon: f64 = r.parse(&line, "reference longitude")?;
    let reference = Coordinate::new(lat, lon);
    if !reference.is_valid() {
        return Err(r.error(format!("reference position out of range ({}, {})", lat, lon)));
    }

    let mut slots = Vec::with_capacity(POLAR_SLOTS);
    for _ in 0..POLAR_SLOTS {
        let line = r.next_line("polar range entry")?;
        let (lat, lon) = r.pair(&line, "polar range entry")?;
        let p = Coordinate::new(r.parse(lat, "polar latitude")?, r.parse(lon, "polar longitude")?);
        slots.push(p);
    }
    r.blank("polar range")?;

    let mut buckets = Vec::with_capacity(ALTITUDE_BUCKETS);
    for _ in 0..ALTITUDE_BUCKETS {
        let line = r.next_line("altitude count")?;
        buckets.push(r.parse::<u64>(&line, "altitude count")?);
    }
    r.blank("altitude histogram")?;

    let mut heatmap = HeatMap::new();
    loop {
        let line = r.next_line("heat map entry or blank line")?;
        if line.is_empty() {
            break;
        }
        let (key, count) = r.pair(&line, "heat map entry")?;
        heatmap.insert(r.parse(key, "heat map key")?, r.parse(count, "heat map count")?);
    }

    let mut airlines = AirlineCounts::new();
    loop {
        let line = r.next_line("airline entry or blank line")?;
        if line.is_empty() {
            break;
        }
        // three character prefix, one separator, count
        let (prefix, count) = match (line.get(..3), line.get(4..)) {
            (Some(prefix), Some(count)) if is_valid_prefix(prefix) => (prefix, count),
            _ => return Err(r.error(format!("malformed airline entry '{}'", line))),
        };
        airlines.insert(prefix, r.parse(count, "airline count")?);
    }

    let line = r.next_line("end marker")?;
    if line != END_MARKER {
        return Err(r.error(format!("expected end marker '{}', found '{}'", END_MARKER, line)));
    }

    // lengths are fixed by the loops above
    let polar = PolarRange::from_slots(slots)
        .ok_or_else(|| r.error("polar range must have 360 entries"))?;
    let altitudes = AltitudeHistogram::from_buckets(buckets)
        .ok_or_else(|| r.error("altitude histogram must have 501 entries"))?;

    Ok(Stats::from_parts(now, timestamp, reference, polar, altitudes, heatmap, airlines))
}
