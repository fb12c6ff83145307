//! Registry trait for self-registering implementations.
//!
//! Every price source module provides a `Registry` struct implementing this
//! trait, declaring the name it is configured under and its factory.

/// Base trait for implementation registries.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation.
	///
	/// This must match the key under `[sources.implementations]`, for example
	/// "coingecko" for `sources.implementations.coingecko`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
