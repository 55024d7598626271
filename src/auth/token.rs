//! Bearer token models with redacted formatting.

// self
use crate::_prelude::*;

/// Redacted token secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Access token issued by the client-credentials grant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessToken {
	/// Bearer secret; callers must avoid logging it.
	pub secret: TokenSecret,
	/// Instant after which the upstream rejects the token.
	pub expires_at: OffsetDateTime,
}
impl AccessToken {
	/// Creates a token that expires at `expires_at`.
	pub fn new(secret: impl Into<String>, expires_at: OffsetDateTime) -> Self {
		Self { secret: TokenSecret::new(secret), expires_at }
	}

	/// Returns `true` while `now` is earlier than the expiry minus `skew`.
	pub fn is_valid_at(&self, now: OffsetDateTime, skew: Duration) -> bool {
		now < self.expires_at - skew
	}

	/// Formats the `Authorization` header value.
	pub fn bearer(&self) -> String {
		format!("Bearer {}", self.secret.expose())
	}
}
