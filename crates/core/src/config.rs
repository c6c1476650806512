//! Bridge configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use wearbridge_protocol::constants::DEVICES_LIST_KEY;
use wearbridge_runtime::{Error, Result};

/// Delay before the device-selection UI is shown, in milliseconds.
pub const DEFAULT_PAIRING_UI_DELAY_MS: u64 = 500;

/// Configuration passed to [`Bridge::initialize_with`](crate::Bridge::initialize_with).
///
/// # Example
///
/// ```ignore
/// let config: BridgeConfig = serde_json::from_str(r#"{
///     "urlScheme": "myapp",
///     "appId": "3f1c2b0e-5a7d-4c39-9e1b-2d8f6a4b7c01"
/// }"#)?;
/// config.validate()?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeConfig {
	/// URL scheme the pairing flow calls back on.
	pub url_scheme: String,
	/// Identifier of the companion app running on the device.
	pub app_id: String,
	/// Key under which paired devices are persisted.
	#[serde(default = "default_storage_key")]
	pub storage_key: String,
	#[serde(default = "default_pairing_ui_delay_ms")]
	pub pairing_ui_delay_ms: u64,
}

fn default_storage_key() -> String {
	DEVICES_LIST_KEY.to_string()
}

fn default_pairing_ui_delay_ms() -> u64 {
	DEFAULT_PAIRING_UI_DELAY_MS
}

impl BridgeConfig {
	pub fn new(url_scheme: impl Into<String>, app_id: impl Into<String>) -> Self {
		Self {
			url_scheme: url_scheme.into(),
			app_id: app_id.into(),
			storage_key: default_storage_key(),
			pairing_ui_delay_ms: DEFAULT_PAIRING_UI_DELAY_MS,
		}
	}

	pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
		self.storage_key = key.into();
		self
	}

	pub fn with_pairing_ui_delay(mut self, delay: Duration) -> Self {
		self.pairing_ui_delay_ms = delay.as_millis().try_into().unwrap_or(u64::MAX);
		self
	}

	pub fn pairing_ui_delay(&self) -> Duration {
		Duration::from_millis(self.pairing_ui_delay_ms)
	}

	/// Checks that every required field is usable.
	///
	/// # Errors
	///
	/// Returns [`Error::InvalidConfig`] naming the first offending field.
	pub fn validate(&self) -> Result<()> {
		if self.url_scheme.is_empty() {
			return Err(Error::InvalidConfig("urlScheme must not be empty".into()));
		}
		if !is_valid_scheme(&self.url_scheme) {
			return Err(Error::InvalidConfig(format!(
				"urlScheme {:?} must start with a letter and contain only letters, digits, '+', '-' or '.'",
				self.url_scheme
			)));
		}
		if self.app_id.trim().is_empty() {
			return Err(Error::InvalidConfig("appId must not be empty".into()));
		}
		if self.storage_key.is_empty() {
			return Err(Error::InvalidConfig("storageKey must not be empty".into()));
		}
		Ok(())
	}
}

/// RFC 3986 scheme syntax: `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`.
fn is_valid_scheme(scheme: &str) -> bool {
	let mut chars = scheme.chars();
	chars.next().is_some_and(|c| c.is_ascii_alphabetic())
		&& chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
