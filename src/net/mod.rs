// Network layer module
// Input side only: the SBS line source feeding the collector

pub mod connection;
pub mod feeder;

pub use connection::FeedConnection;
pub use feeder::{connect_source, forward_lines};
