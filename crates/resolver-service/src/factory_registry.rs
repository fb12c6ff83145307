//! Dynamic factory registry for price source implementations.
//!
//! Every source crate registers its factories here once; the resolver is
//! then assembled from whichever implementations the configuration names.

use resolver_config::Config;
use resolver_core::{PriceResolver, ResolverBuilder};
use resolver_sources::PriceSourceFactory;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Global registry for all implementation factories
pub struct FactoryRegistry {
	pub sources: HashMap<String, PriceSourceFactory>,
}

impl FactoryRegistry {
	/// Create a new empty registry
	pub fn new() -> Self {
		Self {
			sources: HashMap::new(),
		}
	}

	/// Register a price source implementation
	pub fn register_source(&mut self, name: impl Into<String>, factory: PriceSourceFactory) {
		self.sources.insert(name.into(), factory);
	}
}

impl Default for FactoryRegistry {
	fn default() -> Self {
		Self::new()
	}
}

static REGISTRY: OnceLock<FactoryRegistry> = OnceLock::new();

/// Initialize the global registry with all available implementations
pub fn initialize_registry() -> &'static FactoryRegistry {
	REGISTRY.get_or_init(|| {
		let mut registry = FactoryRegistry::new();

		for (name, factory) in resolver_sources::get_all_implementations() {
			tracing::debug!("Registering price source implementation: {}", name);
			registry.register_source(name, factory);
		}

		registry
	})
}

/// Get the global factory registry
pub fn get_registry() -> &'static FactoryRegistry {
	initialize_registry()
}

/// Build the resolver using the registry and config.
///
/// Fails on any configured implementation name the registry does not know,
/// listing the available ones.
pub fn build_resolver_from_config(
	config: Config,
) -> Result<PriceResolver, Box<dyn std::error::Error>> {
	let registry = get_registry();

	let mut factories = HashMap::new();
	for name in config.sources.implementations.keys() {
		match registry.sources.get(name) {
			Some(factory) => {
				factories.insert(name.clone(), *factory);
			},
			None => {
				let mut available: Vec<_> = registry.sources.keys().cloned().collect();
				available.sort();
				return Err(format!(
					"Unknown price source implementation '{}'. Available: [{}]",
					name,
					available.join(", ")
				)
				.into());
			},
		}
	}

	Ok(ResolverBuilder::new(config).build(&factories)?)
}
