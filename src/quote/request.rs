//! Upstream request body and its cache fingerprint.

// self
use crate::{
	_prelude::*,
	quote::{Parcel, normalize_postal_code},
};

/// Postal address as the upstream expects it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
	/// Digits-only postal code.
	pub postal_code: String,
}

/// Package weight and dimensions sent upstream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageDimensions {
	/// Weight in kilograms.
	pub weight: f64,
	/// Height in centimeters.
	pub height: f64,
	/// Width in centimeters.
	pub width: f64,
	/// Length in centimeters.
	pub length: f64,
}
impl From<Parcel> for PackageDimensions {
	fn from(parcel: Parcel) -> Self {
		Self { weight: parcel.weight, height: parcel.height, width: parcel.width, length: parcel.length }
	}
}

/// Extra services requested with the quote.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteOptions {
	/// Declared value.
	pub insurance_value: f64,
	/// Set exactly when `insurance_value` is positive.
	pub use_insurance_value: bool,
	/// Hand delivery to the addressee only.
	pub own_hand: bool,
	/// Delivery receipt.
	pub receipt: bool,
}

/// JSON body posted to the quotes endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
	/// Origin address.
	pub from: PostalAddress,
	/// Destination address.
	pub to: PostalAddress,
	/// Package being quoted.
	pub package: PackageDimensions,
	/// Comma-separated service filter; omitted when empty.
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub services: String,
	/// Extra services.
	pub options: QuoteOptions,
}
impl QuoteRequest {
	/// Maps caller inputs onto the wire shape.
	///
	/// Only the first parcel is used. An empty slice yields a zero-sized package, which the
	/// upstream is free to reject.
	pub fn build(
		origin: &str,
		destination: &str,
		parcels: &[Parcel],
		insured_value: f64,
		services: &str,
	) -> Self {
		let package = parcels.first().copied().map(PackageDimensions::from).unwrap_or_default();

		Self {
			from: PostalAddress { postal_code: normalize_postal_code(origin) },
			to: PostalAddress { postal_code: normalize_postal_code(destination) },
			package,
			services: services.trim().to_owned(),
			options: QuoteOptions {
				insurance_value: insured_value,
				use_insurance_value: insured_value > 0.,
				own_hand: false,
				receipt: false,
			},
		}
	}

	/// Cache key identifying the logical content of this request.
	///
	/// Measurements are rounded to a fixed precision so float noise never splits entries.
	pub fn fingerprint(&self) -> String {
		let package = &self.package;

		format!(
			"{}|{}|{}|{}|{}|{}|{}|{}",
			self.from.postal_code,
			self.to.postal_code,
			fixed(package.weight, 3),
			fixed(package.height, 1),
			fixed(package.width, 1),
			fixed(package.length, 1),
			fixed(self.options.insurance_value, 2),
			self.services,
		)
	}
}

fn fixed(value: f64, precision: usize) -> String {
	let rendered = format!("{value:.precision$}");

	// Negative values that round to zero must share the key of zero.
	match rendered.strip_prefix('-') {
		Some(magnitude) if magnitude.chars().all(|c| c == '0' || c == '.') => magnitude.to_owned(),
		_ => rendered,
	}
}
