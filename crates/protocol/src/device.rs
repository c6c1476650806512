//! Device identity and liveness types.

use serde::{Deserialize, Serialize};

/// Durable identity of a paired device.
///
/// Records are written once per pairing response and never mutated. `id` is
/// the vendor-assigned identifier and the only key used to match a record
/// against a live session handle; `name` and `model` are display metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceRecord {
	/// Stable vendor-assigned identifier.
	pub id: String,
	/// Friendly name shown to the user.
	pub name: String,
	/// Hardware model name.
	pub model: String,
}

impl DeviceRecord {
	pub fn new(id: impl Into<String>, name: impl Into<String>, model: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
			model: model.into(),
		}
	}
}

/// Coarse device status reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkStatus {
	/// A live handle exists (or the device is reachable but its app is closed).
	Online,
	/// No live handle, or the device cannot be reached.
	Offline,
	/// The device app is connected and messaging is possible.
	Connected,
}

impl LinkStatus {
	pub fn as_str(self) -> &'static str {
		match self {
			LinkStatus::Online => "ONLINE",
			LinkStatus::Offline => "OFFLINE",
			LinkStatus::Connected => "CONNECTED",
		}
	}
}

impl std::fmt::Display for LinkStatus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A persisted record merged with the liveness of the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceListing {
	pub id: String,
	pub name: String,
	pub model: String,
	/// `ONLINE` when a live handle exists, `OFFLINE` otherwise.
	pub status: LinkStatus,
	/// True when the device must go through the pairing flow again.
	pub needs_repairing: bool,
}

impl DeviceListing {
	/// Annotates `record` with whether a live handle exists for it.
	pub fn from_record(record: DeviceRecord, live: bool) -> Self {
		Self {
			id: record.id,
			name: record.name,
			model: record.model,
			status: if live { LinkStatus::Online } else { LinkStatus::Offline },
			needs_repairing: !live,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn record_survives_json_round_trip() {
		let record = DeviceRecord::new("A1B2", "Forerunner \"Blue\"", "fr965");
		let bytes = serde_json::to_vec(&record).unwrap();
		let loaded: DeviceRecord = serde_json::from_slice(&bytes).unwrap();
		assert_eq!(loaded, record);
	}

	#[test]
	fn listing_flags_missing_handle_as_needing_repair() {
		let record = DeviceRecord::new("A", "Watch1", "X");

		let live = DeviceListing::from_record(record.clone(), true);
		assert_eq!(live.status, LinkStatus::Online);
		assert!(!live.needs_repairing);

		let stale = DeviceListing::from_record(record, false);
		assert_eq!(stale.status, LinkStatus::Offline);
		assert!(stale.needs_repairing);
	}

	#[test]
	fn listing_serializes_camel_case() {
		let listing = DeviceListing::from_record(DeviceRecord::new("A", "Watch1", "X"), true);
		let json = serde_json::to_value(&listing).unwrap();
		assert_eq!(
			json,
			serde_json::json!({
				"id": "A",
				"name": "Watch1",
				"model": "X",
				"status": "ONLINE",
				"needsRepairing": false,
			})
		);
	}
}
