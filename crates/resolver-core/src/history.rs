//! Synthetic price history.
//!
//! The series is decoration for charts: each point is the current price
//! perturbed by an independent uniform draw. It carries no market
//! information and the series is not a random walk.

use chrono::{DateTime, Utc};
use rand::Rng;
use resolver_config::HistoryConfig;
use resolver_types::{LabelStyle, PriceHistoryPoint, Timeframe};

/// Generates `timeframe.steps() + 1` points ending at `now`, oldest first.
///
/// Each price is `current_price * (1 + U(-volatility, volatility))`,
/// floored at zero. Volatility is clamped to `[0, 1]`; a non-finite
/// volatility yields a flat series.
pub fn generate_history<R: Rng + ?Sized>(
	current_price: f64,
	timeframe: Timeframe,
	volatility: f64,
	now: DateTime<Utc>,
	rng: &mut R,
) -> Vec<PriceHistoryPoint> {
	let base = if current_price.is_finite() {
		current_price.max(0.0)
	} else {
		0.0
	};
	let band = if volatility.is_finite() {
		volatility.clamp(0.0, 1.0)
	} else {
		0.0
	};
	let steps = timeframe.steps();
	let interval = timeframe.interval();
	let style = timeframe.label_style();

	(0..=steps)
		.map(|index| {
			let at = now - interval * (steps - index) as i32;
			let jitter = if band > 0.0 {
				rng.random_range(-band..=band)
			} else {
				0.0
			};
			PriceHistoryPoint {
				time: format_label(at, style),
				price: (base * (1.0 + jitter)).max(0.0),
			}
		})
		.collect()
}

fn format_label(at: DateTime<Utc>, style: LabelStyle) -> String {
	match style {
		LabelStyle::Short => at.format("%H:%M").to_string(),
		LabelStyle::Full => at.format("%b %d, %H:%M").to_string(),
		LabelStyle::Date => at.format("%b %d").to_string(),
	}
}

/// History generator bound to the configured volatility.
#[derive(Debug, Clone, Copy)]
pub struct HistoryGenerator {
	volatility: f64,
}

impl HistoryGenerator {
	pub fn new(volatility: f64) -> Self {
		Self { volatility }
	}

	pub fn from_config(config: &HistoryConfig) -> Self {
		Self::new(config.volatility)
	}

	pub fn volatility(&self) -> f64 {
		self.volatility
	}

	/// Series ending now, drawn from the thread-local generator.
	pub fn generate(&self, current_price: f64, timeframe: Timeframe) -> Vec<PriceHistoryPoint> {
		generate_history(
			current_price,
			timeframe,
			self.volatility,
			Utc::now(),
			&mut rand::rng(),
		)
	}
}

impl Default for HistoryGenerator {
	fn default() -> Self {
		Self::from_config(&HistoryConfig::default())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use rand::{rngs::StdRng, SeedableRng};

	fn noon() -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap()
	}

	#[test]
	fn test_hourly_series_stays_in_band() {
		let mut rng = StdRng::seed_from_u64(7);
		let points = generate_history(2.5, Timeframe::OneHour, 0.05, noon(), &mut rng);

		assert_eq!(points.len(), 25);
		for point in &points {
			assert!(point.price >= 2.375 - 1e-9, "{} below band", point.price);
			assert!(point.price <= 2.625 + 1e-9, "{} above band", point.price);
		}
	}

	#[test]
	fn test_minute_buckets_have_sixty_steps() {
		let mut rng = StdRng::seed_from_u64(1);
		for timeframe in [
			Timeframe::OneMinute,
			Timeframe::FiveMinutes,
			Timeframe::FifteenMinutes,
		] {
			let points = generate_history(1.0, timeframe, 0.05, noon(), &mut rng);
			assert_eq!(points.len(), 61);
		}
	}

	#[test]
	fn test_labels_end_at_now() {
		let mut rng = StdRng::seed_from_u64(3);

		let minutes = generate_history(1.0, Timeframe::FiveMinutes, 0.05, noon(), &mut rng);
		assert_eq!(minutes.first().unwrap().time, "07:00");
		assert_eq!(minutes.last().unwrap().time, "12:00");

		let hours = generate_history(1.0, Timeframe::OneHour, 0.05, noon(), &mut rng);
		assert_eq!(hours.first().unwrap().time, "Mar 04, 12:00");
		assert_eq!(hours.last().unwrap().time, "Mar 05, 12:00");

		let days = generate_history(1.0, Timeframe::OneDay, 0.05, noon(), &mut rng);
		assert_eq!(days.first().unwrap().time, "Feb 10");
		assert_eq!(days.last().unwrap().time, "Mar 05");
	}

	#[test]
	fn test_seeded_generation_is_reproducible() {
		let a = generate_history(
			2.35,
			Timeframe::FourHours,
			0.05,
			noon(),
			&mut StdRng::seed_from_u64(42),
		);
		let b = generate_history(
			2.35,
			Timeframe::FourHours,
			0.05,
			noon(),
			&mut StdRng::seed_from_u64(42),
		);
		assert_eq!(a, b);
	}

	#[test]
	fn test_zero_price_and_zero_volatility() {
		let mut rng = StdRng::seed_from_u64(9);
		let zero = generate_history(0.0, Timeframe::OneWeek, 0.05, noon(), &mut rng);
		assert!(zero.iter().all(|point| point.price == 0.0));

		let flat = generate_history(3.0, Timeframe::OneHour, 0.0, noon(), &mut rng);
		assert!(flat.iter().all(|point| point.price == 3.0));

		let nan = generate_history(3.0, Timeframe::OneHour, f64::NAN, noon(), &mut rng);
		assert!(nan.iter().all(|point| point.price == 3.0));
	}

	#[test]
	fn test_generator_uses_configured_volatility() {
		let generator = HistoryGenerator::from_config(&HistoryConfig { volatility: 0.1 });
		assert_eq!(generator.volatility(), 0.1);
		let points = generator.generate(10.0, Timeframe::OneDay);
		assert_eq!(points.len(), 25);
		assert!(points.iter().all(|p| p.price >= 9.0 - 1e-9 && p.price <= 11.0 + 1e-9));
	}
}
