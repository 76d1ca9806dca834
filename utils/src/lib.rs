//! Shared utilities for the tavern keeper.

pub mod amount;
pub mod logging;
pub mod time;

pub use amount::format_amount;
pub use logging::{init_logging, LogFormat};
pub use time::format_duration;
