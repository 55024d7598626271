//! Upstream quote items and their mapping onto [`ShippingOption`]s.

// crates.io
use serde::Deserializer;
// self
use crate::{_prelude::*, quote::ShippingOption};

/// Carrier company attached to a quote item.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCompany {
	/// Display name of the carrier.
	#[serde(default)]
	pub name: String,
}

/// Single item of the upstream quotes response.
///
/// Items the upstream could not price carry `has_error` and/or an `error` message, and often
/// no price at all, so every field is optional on the wire.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderQuote {
	/// Upstream service identifier.
	#[serde(default)]
	pub id: Option<u64>,
	/// Service name, e.g. `SEDEX`.
	#[serde(default)]
	pub name: String,
	/// Price as a number or numeric string; unparsable values become `0`.
	#[serde(default, deserialize_with = "lenient_price")]
	pub price: f64,
	/// Delivery time in days.
	#[serde(default, rename = "delivery_time")]
	pub delivery_time_days: Option<u32>,
	/// Upstream flag for items that could not be quoted.
	#[serde(default)]
	pub has_error: bool,
	/// Upstream error message for items that could not be quoted.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	/// Carrier company.
	#[serde(default)]
	pub company: Option<ProviderCompany>,
}
impl ProviderQuote {
	/// Returns `true` when the item can be offered to callers.
	pub fn is_offerable(&self) -> bool {
		let errored =
			self.has_error || self.error.as_deref().is_some_and(|message| !message.trim().is_empty());

		!errored && self.price.is_finite() && self.price > 0.
	}
}

/// Drops unusable items and converts the rest, preserving upstream order.
pub fn map_quotes(items: Vec<ProviderQuote>) -> Vec<ShippingOption> {
	items
		.into_iter()
		.filter(ProviderQuote::is_offerable)
		.map(|item| ShippingOption {
			carrier: item.company.map(|company| company.name).unwrap_or_default(),
			service_code: item.name,
			price: item.price,
			estimated_days: item.delivery_time_days.unwrap_or_default(),
		})
		.collect()
}

fn lenient_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum RawPrice {
		Number(f64),
		Text(String),
	}

	Ok(match Option::<RawPrice>::deserialize(deserializer)? {
		Some(RawPrice::Number(value)) => value,
		Some(RawPrice::Text(text)) => text.trim().parse().unwrap_or_default(),
		None => 0.,
	})
}
