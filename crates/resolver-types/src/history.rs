//! Synthetic price history types.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single point of a generated history series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryPoint {
	/// Display label for the point's time.
	pub time: String,
	/// Perturbed USD price.
	pub price: f64,
}

/// How a history point's time is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
	/// Time of day only.
	Short,
	/// Date and time of day.
	Full,
	/// Date only.
	Date,
}

/// Chart bucket requested by the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Timeframe {
	OneMinute,
	FiveMinutes,
	FifteenMinutes,
	#[default]
	OneHour,
	FourHours,
	OneDay,
	OneWeek,
}

impl Timeframe {
	/// Parses a timeframe label. Unrecognized labels map to the default bucket.
	pub fn parse(raw: &str) -> Self {
		match raw.trim().to_lowercase().as_str() {
			"1m" => Timeframe::OneMinute,
			"5m" => Timeframe::FiveMinutes,
			"15m" => Timeframe::FifteenMinutes,
			"1h" => Timeframe::OneHour,
			"4h" => Timeframe::FourHours,
			"1d" => Timeframe::OneDay,
			"1w" => Timeframe::OneWeek,
			_ => Timeframe::default(),
		}
	}

	/// Number of steps in the series; the series holds `steps() + 1` points.
	pub fn steps(&self) -> usize {
		match self {
			Timeframe::OneMinute | Timeframe::FiveMinutes | Timeframe::FifteenMinutes => 60,
			_ => 24,
		}
	}

	/// Spacing between consecutive points.
	pub fn interval(&self) -> TimeDelta {
		match self {
			Timeframe::OneMinute => TimeDelta::minutes(1),
			Timeframe::FiveMinutes => TimeDelta::minutes(5),
			Timeframe::FifteenMinutes => TimeDelta::minutes(15),
			Timeframe::OneHour => TimeDelta::hours(1),
			Timeframe::FourHours => TimeDelta::hours(4),
			Timeframe::OneDay => TimeDelta::days(1),
			Timeframe::OneWeek => TimeDelta::weeks(1),
		}
	}

	pub fn label_style(&self) -> LabelStyle {
		match self {
			Timeframe::OneMinute | Timeframe::FiveMinutes | Timeframe::FifteenMinutes => {
				LabelStyle::Short
			},
			Timeframe::OneHour | Timeframe::FourHours => LabelStyle::Full,
			Timeframe::OneDay | Timeframe::OneWeek => LabelStyle::Date,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Timeframe::OneMinute => "1m",
			Timeframe::FiveMinutes => "5m",
			Timeframe::FifteenMinutes => "15m",
			Timeframe::OneHour => "1h",
			Timeframe::FourHours => "4h",
			Timeframe::OneDay => "1d",
			Timeframe::OneWeek => "1w",
		}
	}
}

impl fmt::Display for Timeframe {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
