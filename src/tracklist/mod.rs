//! Tracklist parsing.
//!
//! This module turns free-form timestamped text into a validated, ordered
//! [`Tracklist`]. It performs no I/O beyond reading the tracklist file and
//! never logs; warnings are returned to the caller.

mod parser;
mod sanitize;
mod timestamp;
mod types;

pub use parser::{parse_lines, parse_str, parse_tracklist_file};
pub use sanitize::sanitize_label;
pub use timestamp::{format_timestamp, parse_timestamp};
pub use types::{CutPoint, ParseWarning, ParsedTracklist, Tracklist};
