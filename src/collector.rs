// Collector - drives the statistics engine from the line channel
//
// Processes one line to completion before taking the next, asks the flush
// scheduler after every line, and on a flush writes the snapshot and evicts
// stale flights. Snapshot write failures are logged and retried on the next
// flush.

use std::future::Future;
use std::io;
use std::path::PathBuf;

use tokio::signal;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::scheduler::{unix_now, FlushScheduler};
use crate::snapshot;
use crate::stats::{MessageKind, Stats};

/// Message counters since start
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub id: u64,
    pub airborne_position: u64,
    pub discarded: u64,
}

impl Counters {
    fn count(&mut self, kind: MessageKind) {
        match kind {
            MessageKind::Id => self.id += 1,
            MessageKind::AirbornePosition => self.airborne_position += 1,
            MessageKind::Discarded => self.discarded += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.id + self.airborne_position + self.discarded
    }
}

/// Why `run` returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// The line channel closed
    EndOfStream,
    /// Ctrl+C
    Signal,
}

pub struct Collector {
    stats: Stats,
    scheduler: FlushScheduler,
    snapshot_path: PathBuf,
    /// Echo every line to stdout
    display: bool,
    counters: Counters,
}

impl Collector {
    pub fn new(stats: Stats, snapshot_path: PathBuf, display: bool) -> Self {
        Collector {
            stats,
            scheduler: FlushScheduler::new(),
            snapshot_path,
            display,
            counters: Counters::default(),
        }
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// Process one line received at `now`, then flush if due
    pub fn handle_line(&mut self, line: &str, now: i64) -> MessageKind {
        if self.display {
            println!("{}", line);
        }

        let kind = self.stats.process_at(line, now);
        self.counters.count(kind);
        match kind {
            MessageKind::Discarded => debug!("Discarded message."),
            _ => debug!("Logged type {} message.", kind.code()),
        }

        if self.scheduler.poll(now, self.stats.uptime()) {
            self.flush(now);
        }
        kind
    }

    /// Write the snapshot and evict stale flights
    ///
    /// Returns whether the snapshot was written. The export is blocking file
    /// I/O and must not be called from a current-thread runtime.
    pub fn flush(&mut self, now: i64) -> bool {
        let stats = &mut self.stats;
        let path = &self.snapshot_path;
        let result = tokio::task::block_in_place(|| snapshot::export(stats, path, now));
        let written = match result {
            Ok(()) => {
                info!("Snapshot written to {}", self.snapshot_path.display());
                true
            }
            Err(e) => {
                error!("Unable to write snapshot {}: {}", self.snapshot_path.display(), e);
                false
            }
        };

        let removed = self.stats.evict_flights(now);
        info!("Flight buffer flushed ({} entries deleted)", removed);
        self.log_status();
        written
    }

    fn log_status(&self) {
        let c = self.counters;
        info!(
            "Status: {} messages ({} ID, {} position, {} discarded), {} buffered flights, {} heat map cells, {} airlines, max range {:.1} km",
            c.total(),
            c.id,
            c.airborne_position,
            c.discarded,
            self.stats.flight_buffer().len(),
            self.stats.heatmap().len(),
            self.stats.airlines().len(),
            self.stats.polar().max_range(self.stats.reference()),
        );
    }

    /// Consume lines until the channel closes or Ctrl+C, then write a final snapshot
    pub async fn run(&mut self, rx: mpsc::Receiver<String>) -> Shutdown {
        self.run_until(rx, signal::ctrl_c()).await
    }

    /// Consume lines until the channel closes or `shutdown` resolves, then
    /// write a final snapshot
    ///
    /// `shutdown` is polled across the whole loop, so a request that arrives
    /// while a line is being processed is seen on the next iteration. If it
    /// resolves to an error the collector keeps running without it.
    pub async fn run_until<F>(&mut self, mut rx: mpsc::Receiver<String>, shutdown: F) -> Shutdown
    where
        F: Future<Output = io::Result<()>>,
    {
        tokio::pin!(shutdown);
        let mut listening = true;

        let reason = loop {
            tokio::select! {
                line = rx.recv() => match line {
                    Some(line) => {
                        self.handle_line(&line, unix_now());
                    }
                    None => {
                        info!("Stream ended");
                        break Shutdown::EndOfStream;
                    }
                },
                result = &mut shutdown, if listening => match result {
                    Ok(()) => {
                        info!("Received shutdown signal (Ctrl+C)");
                        break Shutdown::Signal;
                    }
                    Err(e) => {
                        error!("Unable to listen for shutdown signal: {}", e);
                        listening = false;
                    }
                },
            }
        };

        self.flush(unix_now());
        reason
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::Coordinate;
    use std::time::Duration;
    use tokio::sync::oneshot;

    const UPTIME: i64 = 1_700_000_000;

    fn collector(dir: &tempfile::TempDir) -> Collector {
        let stats = Stats::new(Coordinate::new(50.0, 16.0), UPTIME);
        Collector::new(stats, dir.path().join("stats.out"), false)
    }

    #[test]
    fn test_counts_message_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let mut c = collector(&dir);
        c.handle_line("MSG,1,1,1,ABCDEF,1,,,,,,RYR123,,,,,,,,,", UPTIME + 1);
        c.handle_line("MSG,3,1,1,ABCDEF,1,,,,,,38000,,,50.10,16.10,,,,,,", UPTIME + 2);
        c.handle_line("MSG,4,1,1,ABCDEF,1,,,,,,,420,90,,,0,,,,,", UPTIME + 3);
        c.handle_line("garbage", UPTIME + 4);

        assert_eq!(
            c.counters(),
            Counters { id: 1, airborne_position: 1, discarded: 2 }
        );
        assert_eq!(c.counters().total(), 4);
    }

    #[test]
    fn test_flush_on_minute_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.out");
        let mut c = collector(&dir);

        c.handle_line("MSG,1,1,1,ABCDEF,1,,,,,,RYR123,,,,,,,,,", UPTIME + 1);
        assert!(!path.exists());

        c.handle_line("MSG,3,1,1,ABCDEF,1,,,,,,38000,,,50.10,16.10,,,,,,", UPTIME + 60);
        assert!(path.exists());
        assert_eq!(c.stats().timestamp(), UPTIME + 60);

        // same second again does not rewrite
        std::fs::remove_file(&path).unwrap();
        c.handle_line("MSG,3,1,1,ABCDEF,1,,,,,,38000,,,50.10,16.10,,,,,,", UPTIME + 60);
        assert!(!path.exists());
    }

    #[test]
    fn test_flush_evicts_stale_flights() {
        let dir = tempfile::tempdir().unwrap();
        let mut c = collector(&dir);
        c.handle_line("MSG,1,1,1,ABCDEF,1,,,,,,RYR123,,,,,,,,,", UPTIME + 1);
        assert_eq!(c.stats().flight_buffer().len(), 1);

        // first aligned second after the TTL
        c.handle_line("MSG,5,1,1,ABCDEF,1,,,,,,38000,,,,,,,,,,", UPTIME + 1860);
        assert!(c.stats().flight_buffer().is_empty());
    }

    #[test]
    fn test_flush_failure_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let stats = Stats::new(Coordinate::new(50.0, 16.0), UPTIME);
        let mut c = Collector::new(stats, dir.path().join("missing").join("stats.out"), false);

        assert!(!c.flush(UPTIME + 60));
        assert_eq!(
            c.handle_line("MSG,1,1,1,ABCDEF,1,,,,,,RYR123,,,,,,,,,", UPTIME + 61),
            MessageKind::Id
        );
    }

    fn never() -> impl Future<Output = io::Result<()>> {
        std::future::pending()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_run_until_end_of_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.out");
        let mut c = collector(&dir);

        let (tx, rx) = mpsc::channel(8);
        tx.send("MSG,1,1,1,ABCDEF,1,,,,,,RYR123,,,,,,,,,".to_string()).await.unwrap();
        tx.send("MSG,3,1,1,ABCDEF,1,,,,,,38000,,,50.10,16.10,,,,,,".to_string()).await.unwrap();
        drop(tx);

        assert_eq!(c.run_until(rx, never()).await, Shutdown::EndOfStream);
        assert_eq!(c.counters().total(), 2);

        // final snapshot holds everything
        let loaded = snapshot::load(&path, UPTIME).unwrap();
        assert_eq!(loaded.airlines().get("RYR"), Some(1));
        assert_eq!(loaded.altitudes().get(380), Some(1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_shutdown_requested_while_busy_is_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.out");
        let mut c = collector(&dir);

        let (tx, rx) = mpsc::channel(8);
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        tx.send("MSG,1,1,1,ABCDEF,1,,,,,,RYR123,,,,,,,,,".to_string()).await.unwrap();
        // fires before the first line is even picked up
        stop_tx.send(()).unwrap();

        let shutdown = async move {
            let _ = stop_rx.await;
            Ok(())
        };
        let result = tokio::time::timeout(Duration::from_secs(2), c.run_until(rx, shutdown)).await;
        assert_eq!(result.unwrap(), Shutdown::Signal);
        assert!(path.exists());
        drop(tx);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_signal_setup_failure_keeps_collecting() {
        let dir = tempfile::tempdir().unwrap();
        let mut c = collector(&dir);

        let (tx, rx) = mpsc::channel(8);
        tx.send("MSG,1,1,1,ABCDEF,1,,,,,,RYR123,,,,,,,,,".to_string()).await.unwrap();
        tx.send("MSG,1,1,1,4CA123,1,,,,,,DLH9AB,,,,,,,,,".to_string()).await.unwrap();
        drop(tx);

        let broken = async { Err(io::Error::new(io::ErrorKind::Other, "no signal support")) };
        assert_eq!(c.run_until(rx, broken).await, Shutdown::EndOfStream);
        assert_eq!(c.counters().id, 2);
    }

    #[cfg(unix)]
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_sigint_between_lines_stops_run() {
        use tokio::signal::unix::{signal, SignalKind};

        // install the process handler first so SIGINT cannot kill the test binary
        let _guard = signal(SignalKind::interrupt()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.out");
        let mut c = collector(&dir);

        let (tx, rx) = mpsc::channel(8);
        tx.send("MSG,1,1,1,ABCDEF,1,,,,,,RYR123,,,,,,,,,".to_string()).await.unwrap();

        let run = tokio::spawn(async move {
            let reason = c.run(rx).await;
            (reason, c.counters())
        });

        tokio::time::sleep(Duration::from_millis(200)).await;
        unsafe {
            libc::kill(libc::getpid(), libc::SIGINT);
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
        // the sender stays open; only the signal can end the loop
        let _ = tx.send("MSG,1,1,1,4CA123,1,,,,,,DLH9AB,,,,,,,,,".to_string()).await;

        let (reason, counters) = tokio::time::timeout(Duration::from_secs(2), run)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reason, Shutdown::Signal);
        assert!(counters.id >= 1);
        assert!(path.exists());
    }
}
