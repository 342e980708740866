// Chart output
//
// Renders the aggregates into the files the statistics web page loads:
// GoogleMaps scripts for the polar range and heat map, HighCharts CSV for the
// airline and altitude shares.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use tracing::{info, warn};

use crate::airline_db::AirlineDb;
use crate::constants::{AIRLINE_CSV_FILE, ALTITUDE_CSV_FILE, HEAT_MAP_FILE, POLAR_PLOT_FILE};
use crate::stats::heatmap::cell_position;
use crate::stats::Stats;

const RECEIVER_ICON: &str = "http://maps.google.com/mapfiles/kml/pal4/icon57.png";

const HEAT_GRADIENT: [&str; 14] = [
    "rgba(0, 255, 255, 0)",
    "rgba(0, 255, 255, 1)",
    "rgba(0, 191, 255, 1)",
    "rgba(0, 127, 255, 1)",
    "rgba(0, 63, 255, 1)",
    "rgba(0, 0, 255, 1)",
    "rgba(0, 0, 223, 1)",
    "rgba(0, 0, 191, 1)",
    "rgba(0, 0, 159, 1)",
    "rgba(0, 0, 127, 1)",
    "rgba(63, 0, 91, 1)",
    "rgba(127, 0, 63, 1)",
    "rgba(191, 0, 31, 1)",
    "rgba(255, 0, 0, 1)",
];

/// One chart artifact
pub trait ChartOutput {
    /// File name inside the output directory
    fn file_name(&self) -> &'static str;

    /// File contents
    fn render(&self, stats: &Stats) -> String;
}

/// Percentage share rounded to two decimals
pub fn share(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    ((count as f64 / total as f64) * 10000.0).round() / 10000.0 * 100.0
}

fn receiver_marker(out: &mut String, stats: &Stats, map: &str) {
    let r = stats.reference();
    let _ = writeln!(
        out,
        "  var image = new google.maps.MarkerImage('{}', null, new google.maps.Point(0,0), new google.maps.Point(16,16));",
        RECEIVER_ICON
    );
    let _ = writeln!(out, "  var receiverPos = new google.maps.LatLng({}, {});", r.lat, r.lon);
    let _ = writeln!(
        out,
        "  var receiverMarker = new google.maps.Marker({{\n    position: receiverPos,\n    map: {},\n    icon: image\n  }});\n",
        map
    );
}

/// Receiver range polygon (polarPlot.js)
pub struct PolarPlotJs;

impl ChartOutput for PolarPlotJs {
    fn file_name(&self) -> &'static str {
        POLAR_PLOT_FILE
    }

    fn render(&self, stats: &Stats) -> String {
        let r = stats.reference();
        let mut out = String::new();
        let _ = writeln!(out, "function initializePolarPlot() {{");
        let _ = writeln!(
            out,
            "  var polarMapOptions = {{\n    zoom: 7,\n    center: new google.maps.LatLng({}, {}),\n    mapTypeId: google.maps.MapTypeId.TERRAIN\n  }};\n",
            r.lat, r.lon
        );
        let _ = writeln!(
            out,
            "  var polarMap = new google.maps.Map(document.getElementById('polar-map-canvas'),\n      polarMapOptions);\n"
        );

        let points: Vec<String> = stats
            .polar()
            .slots()
            .iter()
            .map(|p| format!("    new google.maps.LatLng({}, {})", p.lat, p.lon))
            .collect();
        let _ = writeln!(out, "  var rangeCoords = [\n{}\n  ];\n", points.join(",\n"));

        let _ = writeln!(
            out,
            "  var polarPlot = new google.maps.Polygon({{\n    paths: rangeCoords,\n    strokeColor: '#FF0000',\n    strokeOpacity: 0.8,\n    strokeWeight: 2,\n    fillColor: '#FF0000',\n    fillOpacity: 0.35\n  }});\n"
        );
        receiver_marker(&mut out, stats, "polarMap");
        let _ = writeln!(out, "  polarPlot.setMap(polarMap);\n}}\n");
        let _ = write!(out, "google.maps.event.addDomListener(window, 'load', initializePolarPlot);");
        out
    }
}

/// Position report density layer (heatMap.js)
pub struct HeatMapJs;

impl ChartOutput for HeatMapJs {
    fn file_name(&self) -> &'static str {
        HEAT_MAP_FILE
    }

    fn render(&self, stats: &Stats) -> String {
        let r = stats.reference();
        let mut out = String::new();
        let _ = writeln!(out, "var map, pointarray, heatmap;\n");

        let points: Vec<String> = stats
            .heatmap()
            .iter()
            .map(|(key, weight)| {
                let p = cell_position(key);
                format!("  {{location: new google.maps.LatLng({}, {}), weight: {}}}", p.lat, p.lon, weight)
            })
            .collect();
        let _ = writeln!(out, "var heatMapData = [\n{}\n];\n", points.join(",\n"));

        let _ = writeln!(out, "function initialize() {{");
        let _ = writeln!(
            out,
            "  var mapOptions = {{\n    zoom: 9,\n    center: new google.maps.LatLng({}, {}),\n    mapTypeId: google.maps.MapTypeId.SATELLITE\n  }};\n",
            r.lat, r.lon
        );
        let _ = writeln!(
            out,
            "  map = new google.maps.Map(document.getElementById('map-canvas'),\n      mapOptions);\n"
        );
        let _ = writeln!(out, "  var pointArray = new google.maps.MVCArray(heatMapData);\n");
        let _ = writeln!(
            out,
            "  heatmap = new google.maps.visualization.HeatmapLayer({{\n    data: pointArray\n  }});\n"
        );
        receiver_marker(&mut out, stats, "map");
        let _ = writeln!(out, "  heatmap.setMap(map);\n}}\n");

        let _ = writeln!(
            out,
            "function toggleHeatmap() {{\n  heatmap.setMap(heatmap.getMap() ? null : map);\n}}\n"
        );
        let gradient: Vec<String> = HEAT_GRADIENT.iter().map(|c| format!("    '{}'", c)).collect();
        let _ = writeln!(
            out,
            "function changeGradient() {{\n  var gradient = [\n{}\n  ];\n  heatmap.set('gradient', heatmap.get('gradient') ? null : gradient);\n}}\n",
            gradient.join(",\n")
        );
        let _ = writeln!(
            out,
            "function changeRadius() {{\n  heatmap.set('radius', heatmap.get('radius') ? null : 20);\n}}\n"
        );
        let _ = writeln!(
            out,
            "function changeOpacity() {{\n  heatmap.set('opacity', heatmap.get('opacity') ? null : 0.2);\n}}\n"
        );
        let _ = writeln!(
            out,
            "function mtypeHybrid() {{\n  map.setMapTypeId(google.maps.MapTypeId.HYBRID);\n}}\n"
        );
        let _ = writeln!(
            out,
            "function mtypeSat() {{\n  map.setMapTypeId(google.maps.MapTypeId.SATELLITE);\n}}\n"
        );
        let _ = write!(out, "google.maps.event.addDomListener(window, 'load', initialize);");
        out
    }
}

/// Airline shares (airline.csv)
///
/// Airlines at or below `threshold` flights, or unknown to the database, are
/// left out. Shares are relative to all counted flights.
pub struct AirlineCsv<'a> {
    pub db: &'a AirlineDb,
    pub threshold: u64,
}

impl ChartOutput for AirlineCsv<'_> {
    fn file_name(&self) -> &'static str {
        AIRLINE_CSV_FILE
    }

    fn render(&self, stats: &Stats) -> String {
        let airlines = stats.airlines();
        let total = airlines.total();
        let rows: Vec<String> = airlines
            .iter()
            .filter(|(_, count)| *count > self.threshold)
            .filter_map(|(prefix, count)| {
                self.db
                    .get(prefix)
                    .map(|info| format!("{},{}", info.name, share(count, total)))
            })
            .collect();
        format!("Airline,Share\n{}", rows.join("\n"))
    }
}

/// Flight level shares (altitude.csv)
pub struct AltitudeCsv;

impl ChartOutput for AltitudeCsv {
    fn file_name(&self) -> &'static str {
        ALTITUDE_CSV_FILE
    }

    fn render(&self, stats: &Stats) -> String {
        let altitudes = stats.altitudes();
        let total = altitudes.total();
        let rows: Vec<String> = altitudes
            .buckets()
            .iter()
            .enumerate()
            .map(|(fl, count)| format!("{},{}", fl * 100, share(*count, total)))
            .collect();
        format!("Altitude,Share\n{}", rows.join("\n"))
    }
}

/// Write every chart into `dir`
pub fn write_charts(dir: &Path, stats: &Stats, db: &AirlineDb, threshold: u64) -> io::Result<()> {
    let unknown = stats.airlines().iter().filter(|(p, _)| db.get(p).is_none()).count();
    if unknown > 0 {
        warn!("{} airline prefixes not found in the airline database", unknown);
    }

    let charts: [&dyn ChartOutput; 4] = [
        &PolarPlotJs,
        &HeatMapJs,
        &AirlineCsv { db, threshold },
        &AltitudeCsv,
    ];
    for chart in charts {
        let path = dir.join(chart.file_name());
        fs::write(&path, chart.render(stats)).map_err(|e| {
            io::Error::new(e.kind(), format!("unable to write {}: {}", path.display(), e))
        })?;
        info!("Wrote {}", path.display());
    }
    Ok(())
}
