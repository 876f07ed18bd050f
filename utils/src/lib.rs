//! Shared utilities for ridepay.

pub mod logging;
pub mod time;
pub mod units;

pub use logging::{init_tracing, LogFormat};
pub use time::format_duration;
pub use units::{format_allowance, format_ether, format_units, parse_ether, parse_units, UnitsError};
