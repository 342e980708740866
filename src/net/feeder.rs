// SBS feeder
//
// Connects to the SBS source and forwards every line, in order, into the
// channel the collector reads. End of stream closes the channel.

use std::io;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info};

use super::connection::FeedConnection;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connect to the SBS source at `addr` ("host:port")
pub async fn connect_source(addr: &str) -> io::Result<FeedConnection> {
    info!("Connecting to SBS source at {}", addr);
    let conn = match tokio::time::timeout(CONNECT_TIMEOUT, FeedConnection::connect(addr)).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("connecting to {} timed out", addr),
            ))
        }
    };
    info!("Connected to SBS source at {}", conn.peer_addr());
    Ok(conn)
}

/// Forward lines from `conn` into `tx` until either side closes
///
/// Returns the number of forwarded lines. Fails only if the connection breaks
/// mid-stream. The channel closes when `tx` is dropped on return.
pub async fn forward_lines(mut conn: FeedConnection, tx: mpsc::Sender<String>) -> io::Result<u64> {
    let mut forwarded = 0u64;
    while let Some(line) = conn.read_line().await? {
        if tx.send(line).await.is_err() {
            debug!("Collector gone, stopping feeder");
            return Ok(forwarded);
        }
        forwarded += 1;
    }

    info!("SBS source {} closed the stream after {} lines", conn.peer_addr(), forwarded);
    Ok(forwarded)
}
