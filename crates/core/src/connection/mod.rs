//! Connection state machine.
//!
//! Tracks every device the host asked to connect to, maps vendor status
//! callbacks onto [`ConnectionState`], and owns the single active messaging
//! session. The machine lives inside the bridge worker and is never shared,
//! so it needs no locking.
//!
//! # Session lifecycle
//!
//! ```text
//!              connect(id) ──► no handle ──► OFFLINE, needsRepairing
//!                   │
//!                   ▼
//!   register device events, query status, emit
//!                   │
//!       ┌───────────┴────────────┐
//!   Connected                 anything else
//!       │                        │
//!  arm session               disarm session (if it is this device)
//! ```

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::sync::Arc;

use wearbridge_protocol::{BridgeEvent, DeviceStatusPayload, LinkStatus};
use wearbridge_runtime::{AppBinding, DeviceSdk, Error, LiveHandle, SdkDeviceStatus};

use crate::events::EventBus;
use crate::state::ConnectionState;

/// Debug reason attached to status events for devices without a live handle.
pub const NO_LIVE_HANDLE_REASON: &str = "no live handle - device not in current session";

/// Reason attached when a new pairing replaced the handle of a connected device.
pub const HANDLE_REPLACED_REASON: &str = "paired again - connect to resume messaging";

struct TrackedDevice {
	handle: LiveHandle,
	name: String,
	state: Option<ConnectionState>,
}

pub(crate) struct ConnectionMachine {
	sdk: Arc<dyn DeviceSdk>,
	events: Arc<EventBus<BridgeEvent>>,
	app_id: String,
	tracked: HashMap<String, TrackedDevice>,
	session: Option<AppBinding>,
}

impl ConnectionMachine {
	pub fn new(sdk: Arc<dyn DeviceSdk>, events: Arc<EventBus<BridgeEvent>>, app_id: impl Into<String>) -> Self {
		Self {
			sdk,
			events,
			app_id: app_id.into(),
			tracked: HashMap::new(),
			session: None,
		}
	}

	/// The armed messaging session, if any.
	pub fn session(&self) -> Option<&AppBinding> {
		self.session.as_ref()
	}

	#[cfg(test)]
	pub fn state_of(&self, id: &str) -> Option<ConnectionState> {
		self.tracked.get(id).and_then(|device| device.state)
	}

	/// Starts tracking `id` using the live handle resolved for it.
	///
	/// Without a handle no SDK call is made; the host is told to re-pair.
	pub fn connect(&mut self, id: &str, model: &str, name: &str, handle: Option<LiveHandle>) {
		let Some(handle) = handle else {
			tracing::warn!(device_id = %id, model, "Device not in current session, re-pairing required");
			let err = Error::NoLiveHandle { id: id.to_string() };
			self.emit_status(DeviceStatusPayload {
				name: name.to_string(),
				status: LinkStatus::Offline,
				reason: NO_LIVE_HANDLE_REASON.to_string(),
				needs_repairing: Some(err.needs_repairing()),
				error: Some(err.to_string()),
			});
			return;
		};

		let replaced = self
			.tracked
			.remove(id)
			.filter(|previous| !previous.handle.same_object(&handle));
		if let Some(previous) = replaced {
			tracing::debug!(device_id = %id, "Replacing handle from an earlier pairing");
			if self.session.as_ref().is_some_and(|s| s.device_id() == id) {
				self.disarm();
			}
			self.sdk.unregister_device_events(&previous.handle);
		}

		let display_name = handle.friendly_name().unwrap_or(name).to_string();
		tracing::info!(device_id = %id, name = %display_name, "Connecting to device");

		self.sdk.register_device_events(&handle);
		let status = self.sdk.device_status(&handle);
		self.tracked.insert(
			id.to_string(),
			TrackedDevice {
				handle,
				name: display_name,
				state: None,
			},
		);
		self.transition(id, &status);
	}

	/// Handles a status callback from the SDK.
	///
	/// Callbacks for untracked devices, or for a handle that is no longer the
	/// tracked one, are ignored.
	pub fn on_device_status(&mut self, device: &LiveHandle, status: &SdkDeviceStatus) {
		let id = device.id();
		match self.tracked.get(id) {
			None => {
				tracing::trace!(device_id = %id, %status, "Ignoring status for untracked device");
			}
			Some(tracked) if !tracked.handle.same_object(device) => {
				tracing::debug!(device_id = %id, %status, "Ignoring status for stale handle");
			}
			Some(_) => self.transition(id, status),
		}
	}

	/// Stops tracking every device whose handle is no longer the live one.
	///
	/// `resolve` returns the current live handle for an id. Each dropped
	/// device is unsubscribed at the SDK. If the session belonged to one of
	/// them it is torn down and an OFFLINE status is emitted for that device.
	pub fn drop_invalidated<F>(&mut self, resolve: F)
	where
		F: Fn(&str) -> Option<LiveHandle>,
	{
		let invalidated: Vec<(String, Option<LiveHandle>)> = self
			.tracked
			.iter()
			.filter_map(|(id, tracked)| {
				let current = resolve(id);
				let live = current.as_ref().is_some_and(|handle| handle.same_object(&tracked.handle));
				(!live).then(|| (id.clone(), current))
			})
			.collect();

		for (id, current) in invalidated {
			let Some(tracked) = self.tracked.remove(&id) else {
				continue;
			};
			tracing::info!(device_id = %id, repaired = current.is_some(), "Dropping invalidated handle");
			self.sdk.unregister_device_events(&tracked.handle);

			if !self.session.as_ref().is_some_and(|s| s.device.same_object(&tracked.handle)) {
				continue;
			}
			self.disarm();
			let payload = match current {
				Some(_) => DeviceStatusPayload {
					name: tracked.name,
					status: LinkStatus::Offline,
					reason: HANDLE_REPLACED_REASON.to_string(),
					needs_repairing: Some(false),
					error: None,
				},
				None => {
					let err = Error::NoLiveHandle { id: id.clone() };
					DeviceStatusPayload {
						name: tracked.name,
						status: LinkStatus::Offline,
						reason: NO_LIVE_HANDLE_REASON.to_string(),
						needs_repairing: Some(err.needs_repairing()),
						error: Some(err.to_string()),
					}
				}
			};
			self.emit_status(payload);
		}
	}

	/// Forgets every tracked device and drops the session without SDK calls.
	pub fn reset(&mut self) {
		self.tracked.clear();
		self.session = None;
	}

	fn transition(&mut self, id: &str, status: &SdkDeviceStatus) {
		let (state, reason) = ConnectionState::from_sdk(status);
		let Some(tracked) = self.tracked.get_mut(id) else {
			return;
		};
		tracked.state = Some(state);
		let payload = state.status_payload(tracked.name.clone(), reason);
		let handle = tracked.handle.clone();
		tracing::debug!(device_id = %id, %status, state = ?state, "Device status");

		if state.is_connected() {
			self.emit_status(payload);
			self.arm(handle);
		} else {
			if self.session.as_ref().is_some_and(|s| s.device_id() == id) {
				self.disarm();
			}
			self.emit_status(payload);
		}
	}

	fn arm(&mut self, handle: LiveHandle) {
		if let Some(session) = &self.session {
			if session.device.same_object(&handle) {
				return;
			}
			self.disarm();
		}

		let binding = AppBinding::new(self.app_id.clone(), handle);
		self.sdk.register_app_messages(&binding);
		tracing::info!(device_id = %binding.device_id(), app_id = %binding.app_id, "Messaging session armed");
		self.session = Some(binding);
	}

	fn disarm(&mut self) {
		if let Some(binding) = self.session.take() {
			self.sdk.unregister_app_messages(&binding);
			tracing::info!(device_id = %binding.device_id(), "Messaging session torn down");
		}
	}

	fn emit_status(&self, payload: DeviceStatusPayload) {
		self.events.emit(BridgeEvent::DeviceStatusChanged(payload));
	}
}
