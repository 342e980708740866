// SBS-1 BaseStation text format
// Decoded Mode-S records as emitted by dump1090 on its SBS output port

pub mod message;

pub use message::{parse_line, RecordTag, SbsMessage, SbsParseError};
