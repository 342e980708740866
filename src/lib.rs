pub mod constants;
pub mod geodesy;
pub mod sbs;
pub mod flight_buffer;
pub mod stats;
pub mod snapshot;
pub mod scheduler;
pub mod airline_db;
pub mod output;
pub mod net;
pub mod collector;
pub mod config;
