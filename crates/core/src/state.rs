//! Per-device connection state derived from vendor status.

use wearbridge_protocol::{DeviceStatusPayload, LinkStatus};
use wearbridge_runtime::SdkDeviceStatus;

/// Connection state of one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
	/// The device app is open; messaging is possible.
	Connected,
	/// The device is in range but its app is not open.
	Reachable,
	/// Bluetooth is off, or the vendor reported a status we do not know.
	BluetoothUnavailable,
	/// The SDK no longer recognizes the device.
	InvalidDevice,
	/// The companion app could not find the device.
	NotFound,
}

impl ConnectionState {
	/// Maps a vendor status to a state and its debug reason.
	pub fn from_sdk(status: &SdkDeviceStatus) -> (Self, &'static str) {
		match status {
			SdkDeviceStatus::Connected => (ConnectionState::Connected, "connected"),
			SdkDeviceStatus::NotConnected => (
				ConnectionState::Reachable,
				"notConnected - device reachable but app not open",
			),
			SdkDeviceStatus::BluetoothNotReady => (
				ConnectionState::BluetoothUnavailable,
				"bluetoothNotReady - turn on Bluetooth",
			),
			SdkDeviceStatus::InvalidDevice => (ConnectionState::InvalidDevice, "invalidDevice - re-pair required"),
			SdkDeviceStatus::NotFound => (ConnectionState::NotFound, "notFound - open the companion app"),
			SdkDeviceStatus::Unrecognized(_) => (ConnectionState::BluetoothUnavailable, "unknown"),
		}
	}

	/// Status reported to the host for this state.
	pub fn link_status(self) -> LinkStatus {
		match self {
			ConnectionState::Connected => LinkStatus::Connected,
			ConnectionState::Reachable => LinkStatus::Online,
			ConnectionState::BluetoothUnavailable | ConnectionState::InvalidDevice | ConnectionState::NotFound => {
				LinkStatus::Offline
			}
		}
	}

	pub fn needs_repairing(self) -> bool {
		self == ConnectionState::InvalidDevice
	}

	pub fn is_connected(self) -> bool {
		self == ConnectionState::Connected
	}

	/// Builds the `deviceStatusChanged` body for a transition into this state.
	pub fn status_payload(self, name: impl Into<String>, reason: impl Into<String>) -> DeviceStatusPayload {
		DeviceStatusPayload {
			name: name.into(),
			status: self.link_status(),
			reason: reason.into(),
			needs_repairing: self.needs_repairing().then_some(true),
			error: None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn vendor_statuses_map_to_fixed_table() {
		let cases = [
			(SdkDeviceStatus::Connected, ConnectionState::Connected, LinkStatus::Connected),
			(SdkDeviceStatus::NotConnected, ConnectionState::Reachable, LinkStatus::Online),
			(
				SdkDeviceStatus::BluetoothNotReady,
				ConnectionState::BluetoothUnavailable,
				LinkStatus::Offline,
			),
			(SdkDeviceStatus::InvalidDevice, ConnectionState::InvalidDevice, LinkStatus::Offline),
			(SdkDeviceStatus::NotFound, ConnectionState::NotFound, LinkStatus::Offline),
			(
				SdkDeviceStatus::Unrecognized("pairing".into()),
				ConnectionState::BluetoothUnavailable,
				LinkStatus::Offline,
			),
		];

		for (vendor, state, link) in cases {
			let (mapped, _) = ConnectionState::from_sdk(&vendor);
			assert_eq!(mapped, state, "{vendor}");
			assert_eq!(mapped.link_status(), link, "{vendor}");
		}
	}

	#[test]
	fn reasons_are_prefixed_with_vendor_name() {
		let (_, reason) = ConnectionState::from_sdk(&SdkDeviceStatus::NotConnected);
		assert!(reason.starts_with("notConnected"));
		assert!(reason.contains("app not open"));

		let (_, reason) = ConnectionState::from_sdk(&SdkDeviceStatus::Unrecognized("x".into()));
		assert_eq!(reason, "unknown");
	}

	#[test]
	fn only_invalid_device_flags_repairing() {
		let payload = ConnectionState::InvalidDevice.status_payload("Watch1", "invalidDevice - re-pair required");
		assert_eq!(payload.needs_repairing, Some(true));
		assert_eq!(payload.status, LinkStatus::Offline);

		let payload = ConnectionState::NotFound.status_payload("Watch1", "notFound");
		assert_eq!(payload.needs_repairing, None);
	}
}
