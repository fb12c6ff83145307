//! Builder pattern for constructing the price resolver.
//!
//! Sources are instantiated from `[sources.implementations]` through
//! factory functions, in the order given by `sources.order`.

use crate::{PriceResolver, TokenTable};
use resolver_config::Config;
use resolver_sources::{PriceSourceError, PriceSourceInterface};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during resolver construction.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
}

/// Builder for constructing a `PriceResolver` with pluggable sources.
pub struct ResolverBuilder {
	config: Config,
}

impl ResolverBuilder {
	/// Creates a new ResolverBuilder with the given configuration.
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the resolver using the given source factories, keyed by
	/// implementation name.
	pub fn build<F>(self, factories: &HashMap<String, F>) -> Result<PriceResolver, BuilderError>
	where
		F: Fn(&toml::Value) -> Result<Box<dyn PriceSourceInterface>, PriceSourceError>,
	{
		let implementations = &self.config.sources.implementations;
		let mut sources: Vec<Arc<dyn PriceSourceInterface>> =
			Vec::with_capacity(self.config.sources.order.len());

		for name in &self.config.sources.order {
			let source_config = implementations.get(name).ok_or_else(|| {
				BuilderError::Config(format!("Source '{}' has no implementation block", name))
			})?;
			let factory = factories.get(name).ok_or_else(|| {
				BuilderError::MissingComponent(format!("No factory registered for source '{}'", name))
			})?;

			let source = factory(source_config).map_err(|e| {
				BuilderError::Config(format!("Failed to create source '{}': {}", name, e))
			})?;

			tracing::info!(component = "source", implementation = %name, tag = %source.source(), "Loaded");
			sources.push(Arc::from(source));
		}

		for name in implementations.keys() {
			if !self.config.sources.order.contains(name) {
				tracing::debug!(implementation = %name, "Configured source not in order, skipped");
			}
		}

		if sources.is_empty() {
			tracing::warn!("No live price sources configured; serving fallback prices only");
		}

		Ok(PriceResolver::new(
			sources,
			TokenTable::from_config(&self.config.tokens),
		))
	}
}
