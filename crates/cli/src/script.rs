//! Scenario scripts for `wearbridge simulate`.
//!
//! A script is a JSON document with an optional bridge configuration and a
//! list of steps, each tagged by `step`:
//!
//! ```json
//! {
//!   "config": { "urlScheme": "demo", "appId": "app-1" },
//!   "steps": [
//!     { "step": "pair", "devices": [{ "id": "A", "name": "Watch1", "model": "X" }] },
//!     { "step": "connect", "id": "A", "model": "X", "name": "Watch1" },
//!     { "step": "status", "id": "A", "status": "connected" },
//!     { "step": "receive", "id": "A", "messages": 42 }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use wearbridge::{BridgeConfig, SdkDeviceStatus, SendOutcome, SimDevice};

use crate::error::{CliError, Result};

/// Scheme used when neither the script nor `--config` provides one.
pub const DEFAULT_SCHEME: &str = "wearbridge";

/// App id used when neither the script nor `--config` provides one.
pub const DEFAULT_APP_ID: &str = "simulator";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
	#[serde(default)]
	pub config: Option<BridgeConfig>,
	pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "step", rename_all = "camelCase")]
pub enum Step {
	/// Select `devices` in the pairing UI and deliver the response URL.
	Pair { devices: Vec<SimDevice> },
	/// Hand an arbitrary URL to the bridge.
	OpenUrl { url: String },
	/// Print the merged device listing.
	ListDevices,
	Connect {
		id: String,
		#[serde(default)]
		model: String,
		#[serde(default)]
		name: String,
	},
	/// Report a vendor status (`connected`, `notConnected`, ...) for a device.
	Status { id: String, status: String },
	/// Deliver inbound app messages of any shape from a device.
	Receive { id: String, messages: Value },
	Send { payload: Value },
	/// How later sends complete; `null` leaves them pending.
	SendOutcome { outcome: Option<String> },
	CompanionMissing,
	RequestPairing,
	Sleep { ms: u64 },
	Teardown,
}

impl Step {
	pub fn name(&self) -> &'static str {
		match self {
			Step::Pair { .. } => "pair",
			Step::OpenUrl { .. } => "openUrl",
			Step::ListDevices => "listDevices",
			Step::Connect { .. } => "connect",
			Step::Status { .. } => "status",
			Step::Receive { .. } => "receive",
			Step::Send { .. } => "send",
			Step::SendOutcome { .. } => "sendOutcome",
			Step::CompanionMissing => "companionMissing",
			Step::RequestPairing => "requestPairing",
			Step::Sleep { .. } => "sleep",
			Step::Teardown => "teardown",
		}
	}
}

/// Text handed to `send_message`: strings verbatim, anything else as JSON.
pub fn send_payload(payload: &Value) -> String {
	match payload {
		Value::String(text) => text.clone(),
		other => other.to_string(),
	}
}

pub fn parse_status(raw: &str) -> SdkDeviceStatus {
	match raw.parse() {
		Ok(status) => status,
		Err(never) => match never {},
	}
}

pub fn parse_outcome(path: &Path, raw: Option<&str>) -> Result<Option<SendOutcome>> {
	raw.map(|raw| raw.parse().map_err(|err: String| CliError::script(path, err)))
		.transpose()
}

impl Script {
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path).map_err(|source| CliError::Read {
			path: path.to_path_buf(),
			source,
		})?;
		Self::parse(path, &content)
	}

	pub fn parse(path: &Path, content: &str) -> Result<Self> {
		let script: Script = serde_json::from_str(content).map_err(|err| CliError::script(path, err.to_string()))?;
		if script.steps.is_empty() {
			return Err(CliError::script(path, "no steps"));
		}
		Ok(script)
	}

	/// Effective bridge configuration: the override, then the script's, then defaults.
	pub fn bridge_config(&self, override_config: Option<BridgeConfig>) -> BridgeConfig {
		override_config
			.or_else(|| self.config.clone())
			.unwrap_or_else(|| BridgeConfig::new(DEFAULT_SCHEME, DEFAULT_APP_ID))
	}
}
