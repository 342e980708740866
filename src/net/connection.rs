// Feed connection
// Line reader over the TCP connection to the SBS source

use std::io;
use std::net::SocketAddr;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{TcpStream, ToSocketAddrs};

/// Read side of a connection to a dump1090 style SBS port
pub struct FeedConnection {
    reader: BufReader<TcpStream>,
    peer_addr: SocketAddr,
    buf: Vec<u8>,
}

impl FeedConnection {
    /// Connect to the SBS source
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream))
    }

    /// Wrap an already connected stream
    pub fn new(stream: TcpStream) -> Self {
        let peer_addr = stream
            .peer_addr()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 0)));
        FeedConnection {
            reader: BufReader::with_capacity(8192, stream),
            peer_addr,
            buf: Vec::with_capacity(256),
        }
    }

    /// Get the peer address
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Read the next line without its terminator; `None` at end of stream
    ///
    /// Bytes that are not UTF-8 are replaced rather than failing the stream;
    /// such lines are rejected later by the SBS parser.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        self.buf.clear();
        let n = self.reader.read_until(b'\n', &mut self.buf).await?;
        if n == 0 {
            return Ok(None);
        }

        // Remove trailing newline
        if self.buf.ends_with(b"\n") {
            self.buf.pop();
            if self.buf.ends_with(b"\r") {
                self.buf.pop();
            }
        }

        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}
