//! Utility functions for formatting and timestamps.

pub mod formatting;
pub mod helpers;

pub use formatting::{format_token_amount, with_0x_prefix};
pub use helpers::current_timestamp_millis;
