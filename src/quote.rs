//! Quote domain: caller inputs, wire shapes, and the mapping between them.

pub mod postal;
pub mod request;
pub mod response;

pub use postal::*;
pub use request::*;
pub use response::*;

// self
use crate::_prelude::*;

/// Parcel dimensions supplied by the caller (kilograms and centimeters).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
	/// Weight in kilograms.
	pub weight: f64,
	/// Height in centimeters.
	pub height: f64,
	/// Width in centimeters.
	pub width: f64,
	/// Length in centimeters.
	pub length: f64,
}
impl Parcel {
	/// Creates a parcel from its weight and dimensions.
	pub fn new(weight: f64, height: f64, width: f64, length: f64) -> Self {
		Self { weight, height, width, length }
	}
}

/// Carrier service offered for a route, as returned to callers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShippingOption {
	/// Carrier (company) name.
	pub carrier: String,
	/// Carrier service name, e.g. `SEDEX`.
	pub service_code: String,
	/// Quoted price; always positive.
	pub price: f64,
	/// Estimated delivery time in days.
	pub estimated_days: u32,
}

/// Parameters of a quote lookup.
///
/// Only the first parcel is quoted; additional parcels are ignored.
#[derive(Clone, Debug, PartialEq)]
pub struct QuoteQuery {
	/// Origin postal code in any formatting.
	pub origin: String,
	/// Destination postal code in any formatting.
	pub destination: String,
	/// Parcels to ship.
	pub parcels: Vec<Parcel>,
	/// Declared value for insurance; zero disables insurance.
	pub insured_value: f64,
	/// Time budget for the whole lookup, token refresh and retries included.
	pub deadline: Option<Duration>,
}
impl QuoteQuery {
	/// Creates a query without a deadline.
	pub fn new(
		origin: impl Into<String>,
		destination: impl Into<String>,
		parcels: impl Into<Vec<Parcel>>,
		insured_value: f64,
	) -> Self {
		Self {
			origin: origin.into(),
			destination: destination.into(),
			parcels: parcels.into(),
			insured_value,
			deadline: None,
		}
	}

	/// Bounds the lookup by `budget`; negative budgets are treated as already elapsed.
	pub fn with_deadline(mut self, budget: Duration) -> Self {
		self.deadline = Some(if budget.is_negative() { Duration::ZERO } else { budget });

		self
	}
}
