//! Core price resolution for the price resolver service.
//!
//! This crate ties the configured price sources, the static token tables
//! and the synthetic history generator together. `ResolverBuilder` turns a
//! `Config` into a `PriceResolver`; the resolver is then shared immutably
//! by whatever front end serves requests.

pub mod builder;
pub mod history;
pub mod resolver;
pub mod tokens;

pub use builder::{BuilderError, ResolverBuilder};
pub use history::{generate_history, HistoryGenerator};
pub use resolver::PriceResolver;
pub use tokens::TokenTable;
