//! Token symbol type.
//!
//! Symbols arrive from query strings in any case and with stray whitespace.
//! `TokenSymbol` is the normalized form used for every table lookup.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Uppercase, trimmed token identifier such as `WLD` or `USDCE`.
///
/// No registry validation happens here; unknown symbols are legal and
/// simply miss every lookup table downstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TokenSymbol(String);

impl TokenSymbol {
	/// Normalizes a raw symbol.
	pub fn new(raw: impl AsRef<str>) -> Self {
		Self(raw.as_ref().trim().to_uppercase())
	}

	/// Returns the normalized symbol.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Returns true when the symbol is blank after trimming.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl fmt::Display for TokenSymbol {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for TokenSymbol {
	fn from(raw: &str) -> Self {
		Self::new(raw)
	}
}

impl From<String> for TokenSymbol {
	fn from(raw: String) -> Self {
		Self::new(raw)
	}
}

impl AsRef<str> for TokenSymbol {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl<'de> Deserialize<'de> for TokenSymbol {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;
		Ok(Self::new(raw))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_normalizes_case_and_whitespace() {
		assert_eq!(TokenSymbol::new("  wld ").as_str(), "WLD");
		assert_eq!(TokenSymbol::from("usdc.e"), TokenSymbol::new("USDC.E"));
	}

	#[test]
	fn test_blank_symbol_is_empty() {
		assert!(TokenSymbol::new("   ").is_empty());
		assert!(!TokenSymbol::new("x").is_empty());
	}

	#[test]
	fn test_deserialize_normalizes() {
		let symbol: TokenSymbol = serde_json::from_str("\"tpf\"").unwrap();
		assert_eq!(symbol.as_str(), "TPF");
	}
}
