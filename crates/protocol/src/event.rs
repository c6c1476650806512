//! Outbound event contract.
//!
//! Every outcome of a bridge operation reaches the host as a [`BridgeEvent`].
//! On the wire an event is an envelope naming the event and carrying its body:
//!
//! ```json
//! { "event": "deviceStatusChanged",
//!   "body": { "name": "Watch1", "status": "CONNECTED", "reason": "connected" } }
//! ```

use serde::{Deserialize, Serialize};

use crate::device::LinkStatus;

/// Body of a `deviceStatusChanged` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatusPayload {
	/// Display name of the device.
	pub name: String,
	pub status: LinkStatus,
	/// Informational reason for the status. Not meant to be parsed.
	pub reason: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub needs_repairing: Option<bool>,
	/// Human-actionable description when the status reflects a failure.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

/// A normalized inbound application message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
	#[serde(rename = "type")]
	pub kind: String,
	pub payload: String,
}

impl InboundMessage {
	pub fn new(kind: impl Into<String>, payload: impl Into<String>) -> Self {
		Self {
			kind: kind.into(),
			payload: payload.into(),
		}
	}
}

/// Event emitted by the bridge towards the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "body", rename_all = "camelCase")]
pub enum BridgeEvent {
	/// The SDK finished initializing.
	Ready(bool),
	/// A failure the host should surface to the user.
	Error(String),
	/// Informational notice (for example, a missing companion app).
	Info(String),
	DeviceStatusChanged(DeviceStatusPayload),
	Message(InboundMessage),
}

impl BridgeEvent {
	/// Returns the wire name of this event.
	pub fn name(&self) -> &'static str {
		match self {
			BridgeEvent::Ready(_) => "ready",
			BridgeEvent::Error(_) => "error",
			BridgeEvent::Info(_) => "info",
			BridgeEvent::DeviceStatusChanged(_) => "deviceStatusChanged",
			BridgeEvent::Message(_) => "message",
		}
	}

	pub fn as_status(&self) -> Option<&DeviceStatusPayload> {
		match self {
			BridgeEvent::DeviceStatusChanged(payload) => Some(payload),
			_ => None,
		}
	}

	pub fn as_message(&self) -> Option<&InboundMessage> {
		match self {
			BridgeEvent::Message(message) => Some(message),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn status_event_omits_absent_optionals() {
		let event = BridgeEvent::DeviceStatusChanged(DeviceStatusPayload {
			name: "Watch1".into(),
			status: LinkStatus::Connected,
			reason: "connected".into(),
			needs_repairing: None,
			error: None,
		});

		assert_eq!(
			serde_json::to_value(&event).unwrap(),
			json!({
				"event": "deviceStatusChanged",
				"body": { "name": "Watch1", "status": "CONNECTED", "reason": "connected" }
			})
		);
	}

	#[test]
	fn repair_event_carries_flag_and_error() {
		let event = BridgeEvent::DeviceStatusChanged(DeviceStatusPayload {
			name: "Watch1".into(),
			status: LinkStatus::Offline,
			reason: "no live handle".into(),
			needs_repairing: Some(true),
			error: Some("Session expired. Tap to re-pair.".into()),
		});

		let value = serde_json::to_value(&event).unwrap();
		assert_eq!(value["body"]["needsRepairing"], true);
		assert_eq!(value["body"]["error"], "Session expired. Tap to re-pair.");
	}

	#[test]
	fn message_event_uses_type_field() {
		let event = BridgeEvent::Message(InboundMessage::new("CMD", "{\"x\":1}"));
		assert_eq!(
			serde_json::to_value(&event).unwrap(),
			json!({ "event": "message", "body": { "type": "CMD", "payload": "{\"x\":1}" } })
		);
		assert_eq!(event.name(), "message");
	}

	#[test]
	fn scalar_events_deserialize() {
		let ready: BridgeEvent = serde_json::from_value(json!({"event": "ready", "body": true})).unwrap();
		assert_eq!(ready, BridgeEvent::Ready(true));

		let info: BridgeEvent =
			serde_json::from_value(json!({"event": "info", "body": "Companion app is required."})).unwrap();
		assert_eq!(info.name(), "info");
	}
}
