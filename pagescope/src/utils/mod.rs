//! Small shared helpers.

pub mod timestamps;

pub use timestamps::{format_timestamp, local_timestamp, parse_timestamp, TimestampError, HISTORY_FORMAT};
