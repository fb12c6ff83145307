//! String formatting utilities.
//!
//! Helpers for contract addresses in request paths and for fixed-point
//! amounts returned by price endpoints.

/// Adds "0x" prefix to a hex address if it doesn't already have one.
pub fn with_0x_prefix(hex_str: &str) -> String {
	if hex_str.to_lowercase().starts_with("0x") {
		hex_str.to_string()
	} else {
		format!("0x{}", hex_str)
	}
}

/// Renders a fixed-point integer amount as a decimal string.
///
/// `("1510763", 6)` becomes `"1.510763"`. Trailing fractional zeros are
/// dropped. Returns `None` when `amount` is not a plain run of ASCII digits.
pub fn format_token_amount(amount: &str, decimals: u8) -> Option<String> {
	let amount = amount.trim();
	if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
		return None;
	}

	if decimals == 0 {
		return Some(amount.to_string());
	}

	let decimal_places = decimals as usize;

	let (integer_part, decimal_part) = if amount.len() <= decimal_places {
		let decimal_str = format!("{:0>width$}", amount, width = decimal_places);
		("0".to_string(), decimal_str)
	} else {
		let split_pos = amount.len() - decimal_places;
		(
			amount[..split_pos].to_string(),
			amount[split_pos..].to_string(),
		)
	};

	let decimal_trimmed = decimal_part.trim_end_matches('0');

	if decimal_trimmed.is_empty() {
		Some(integer_part)
	} else {
		Some(format!("{}.{}", integer_part, decimal_trimmed))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_with_0x_prefix() {
		assert_eq!(
			with_0x_prefix("2cfc85d8e48f8eab294be644d9e25c3030863003"),
			"0x2cfc85d8e48f8eab294be644d9e25c3030863003"
		);
		assert_eq!(
			with_0x_prefix("0x2cfc85d8e48f8eab294be644d9e25c3030863003"),
			"0x2cfc85d8e48f8eab294be644d9e25c3030863003"
		);
	}

	#[test]
	fn test_format_token_amount() {
		// Worldcoin app prices use 6 decimals
		assert_eq!(format_token_amount("1510763", 6).as_deref(), Some("1.510763"));
		assert_eq!(format_token_amount("2500000", 6).as_deref(), Some("2.5"));
		assert_eq!(format_token_amount("1000000", 6).as_deref(), Some("1"));
		assert_eq!(format_token_amount("42", 6).as_deref(), Some("0.000042"));
		assert_eq!(format_token_amount("1000", 0).as_deref(), Some("1000"));
	}

	#[test]
	fn test_format_token_amount_rejects_garbage() {
		assert_eq!(format_token_amount("", 6), None);
		assert_eq!(format_token_amount("-5", 6), None);
		assert_eq!(format_token_amount("1.5", 6), None);
	}
}
