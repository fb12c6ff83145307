//! Common types module for the price resolver.
//!
//! This module defines the core data types shared by every resolver
//! component: token symbols, provenance-tagged quotes, synthetic history
//! points, HTTP payloads and the configuration validation framework.

/// API types for HTTP endpoints and request/response structures.
pub mod api;
/// Synthetic price history types.
pub mod history;
/// Price quotes and their provenance tags.
pub mod quote;
/// Registry trait for self-registering implementations.
pub mod registry;
/// Token symbol normalization.
pub mod symbol;
/// Utility functions for formatting and timestamps.
pub mod utils;
/// Configuration validation types for ensuring type-safe configurations.
pub mod validation;

// Re-export all types for convenient access
pub use api::*;
pub use history::{LabelStyle, PriceHistoryPoint, Timeframe};
pub use quote::{PriceQuote, QuoteSource};
pub use registry::ImplementationRegistry;
pub use symbol::TokenSymbol;
pub use utils::{current_timestamp_millis, format_token_amount, with_0x_prefix};
pub use validation::*;
