//! Scriptable in-process [`DeviceSdk`].
//!
//! [`SimulatedSdk`] stands in for a vendor SDK in tests and in the CLI's
//! `simulate` command. It records every call made into it, answers status
//! queries from a table, and lets the caller push callbacks the way a real
//! SDK would when a device changes state or an app sends messages.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::callback::CallbackSink;
use crate::handle::{AppBinding, LiveHandle, SdkDevice};
use crate::sdk::{DeviceSdk, SdkDeviceStatus, SendOutcome};

/// Simulated device object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimDevice {
	pub id: String,
	#[serde(default)]
	pub name: Option<String>,
	pub model: String,
}

impl SimDevice {
	pub fn new(id: impl Into<String>, name: impl Into<String>, model: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			name: Some(name.into()),
			model: model.into(),
		}
	}

	pub fn into_handle(self) -> LiveHandle {
		LiveHandle::new(Arc::new(self))
	}

	pub fn binding(self, app_id: impl Into<String>) -> AppBinding {
		AppBinding::new(app_id, self.into_handle())
	}
}

impl SdkDevice for SimDevice {
	fn id(&self) -> &str {
		&self.id
	}

	fn friendly_name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	fn model_name(&self) -> &str {
		&self.model
	}
}

/// A call made into the simulator.
#[derive(Debug, Clone, PartialEq)]
pub enum SdkCall {
	Initialize { url_scheme: String },
	ShowDeviceSelection,
	ParseDeviceSelection { url: String },
	RegisterDeviceEvents { device_id: String },
	UnregisterDeviceEvents { device_id: String },
	UnregisterAllDeviceEvents,
	DeviceStatus { device_id: String },
	RegisterAppMessages { device_id: String, app_id: String },
	UnregisterAppMessages { device_id: String },
	UnregisterAllAppMessages,
	SendMessage { device_id: String, message: Value },
}

impl SdkCall {
	/// Returns true for calls that reach a specific device.
	pub fn touches_device(&self, id: &str) -> bool {
		match self {
			SdkCall::RegisterDeviceEvents { device_id }
			| SdkCall::UnregisterDeviceEvents { device_id }
			| SdkCall::DeviceStatus { device_id }
			| SdkCall::RegisterAppMessages { device_id, .. }
			| SdkCall::UnregisterAppMessages { device_id }
			| SdkCall::SendMessage { device_id, .. } => device_id == id,
			_ => false,
		}
	}
}

#[derive(Default)]
struct SimState {
	callbacks: Option<CallbackSink>,
	selection: Vec<SimDevice>,
	handles: HashMap<String, LiveHandle>,
	statuses: HashMap<String, SdkDeviceStatus>,
	device_subscriptions: HashSet<String>,
	app_subscriptions: HashMap<String, AppBinding>,
	send_outcome: Option<SendOutcome>,
	calls: Vec<SdkCall>,
}

/// In-process [`DeviceSdk`] driven by the caller.
///
/// Devices not given an explicit status report `notConnected`. Sends complete
/// immediately with the configured outcome, or never if none is set.
pub struct SimulatedSdk {
	state: Mutex<SimState>,
}

impl Default for SimulatedSdk {
	fn default() -> Self {
		Self::new()
	}
}

impl SimulatedSdk {
	pub fn new() -> Self {
		Self {
			state: Mutex::new(SimState {
				send_outcome: Some(SendOutcome::Success),
				..Default::default()
			}),
		}
	}

	/// Sets the devices the next device-selection response will contain.
	pub fn set_selection(&self, devices: Vec<SimDevice>) {
		self.state.lock().selection = devices;
	}

	/// Sets the status returned by status queries for `device_id`.
	pub fn set_status(&self, device_id: &str, status: SdkDeviceStatus) {
		self.state.lock().statuses.insert(device_id.to_string(), status);
	}

	/// Sets how future sends complete. `None` leaves them pending forever.
	pub fn set_send_outcome(&self, outcome: Option<SendOutcome>) {
		self.state.lock().send_outcome = outcome;
	}

	/// Changes a device's status and notifies the bridge if it subscribed.
	///
	/// Returns whether a callback was delivered.
	pub fn push_status(&self, device_id: &str, status: SdkDeviceStatus) -> bool {
		let delivery = {
			let mut state = self.state.lock();
			state.statuses.insert(device_id.to_string(), status.clone());
			if !state.device_subscriptions.contains(device_id) {
				None
			} else {
				state
					.handles
					.get(device_id)
					.cloned()
					.zip(state.callbacks.clone())
			}
		};

		match delivery {
			Some((handle, sink)) => {
				sink.device_status_changed(handle, status);
				true
			}
			None => false,
		}
	}

	/// Delivers inbound app messages from `device_id` if its app is subscribed.
	pub fn push_messages(&self, device_id: &str, messages: Value) -> bool {
		let delivery = {
			let state = self.state.lock();
			state
				.app_subscriptions
				.get(device_id)
				.cloned()
				.zip(state.callbacks.clone())
		};

		match delivery {
			Some((app, sink)) => {
				sink.messages_received(app, messages);
				true
			}
			None => false,
		}
	}

	/// Reports that the companion app has to be installed.
	pub fn push_companion_missing(&self) -> bool {
		let sink = self.state.lock().callbacks.clone();
		match sink {
			Some(sink) => {
				sink.companion_app_missing();
				true
			}
			None => false,
		}
	}

	/// Returns every call recorded so far.
	pub fn calls(&self) -> Vec<SdkCall> {
		self.state.lock().calls.clone()
	}

	pub fn clear_calls(&self) {
		self.state.lock().calls.clear();
	}

	pub fn is_app_subscribed(&self, device_id: &str) -> bool {
		self.state.lock().app_subscriptions.contains_key(device_id)
	}

	pub fn is_device_subscribed(&self, device_id: &str) -> bool {
		self.state.lock().device_subscriptions.contains(device_id)
	}

	fn record(&self, call: SdkCall) {
		self.state.lock().calls.push(call);
	}
}

impl DeviceSdk for SimulatedSdk {
	fn initialize(&self, url_scheme: &str, callbacks: CallbackSink) {
		let mut state = self.state.lock();
		state.calls.push(SdkCall::Initialize {
			url_scheme: url_scheme.to_string(),
		});
		state.callbacks = Some(callbacks);
	}

	fn show_device_selection(&self) {
		self.record(SdkCall::ShowDeviceSelection);
	}

	fn parse_device_selection(&self, url: &Url) -> Vec<LiveHandle> {
		let mut state = self.state.lock();
		state.calls.push(SdkCall::ParseDeviceSelection { url: url.to_string() });

		let handles: Vec<LiveHandle> = state.selection.iter().cloned().map(SimDevice::into_handle).collect();
		state.handles = handles.iter().map(|h| (h.id().to_string(), h.clone())).collect();
		handles
	}

	fn register_device_events(&self, device: &LiveHandle) {
		let mut state = self.state.lock();
		state.calls.push(SdkCall::RegisterDeviceEvents {
			device_id: device.id().to_string(),
		});
		state.device_subscriptions.insert(device.id().to_string());
		state.handles.insert(device.id().to_string(), device.clone());
	}

	fn unregister_device_events(&self, device: &LiveHandle) {
		let mut state = self.state.lock();
		state.calls.push(SdkCall::UnregisterDeviceEvents {
			device_id: device.id().to_string(),
		});
		state.device_subscriptions.remove(device.id());
	}

	fn unregister_all_device_events(&self) {
		let mut state = self.state.lock();
		state.calls.push(SdkCall::UnregisterAllDeviceEvents);
		state.device_subscriptions.clear();
	}

	fn device_status(&self, device: &LiveHandle) -> SdkDeviceStatus {
		let mut state = self.state.lock();
		state.calls.push(SdkCall::DeviceStatus {
			device_id: device.id().to_string(),
		});
		state
			.statuses
			.get(device.id())
			.cloned()
			.unwrap_or(SdkDeviceStatus::NotConnected)
	}

	fn register_app_messages(&self, app: &AppBinding) {
		let mut state = self.state.lock();
		state.calls.push(SdkCall::RegisterAppMessages {
			device_id: app.device_id().to_string(),
			app_id: app.app_id.clone(),
		});
		state.app_subscriptions.insert(app.device_id().to_string(), app.clone());
	}

	fn unregister_app_messages(&self, app: &AppBinding) {
		let mut state = self.state.lock();
		state.calls.push(SdkCall::UnregisterAppMessages {
			device_id: app.device_id().to_string(),
		});
		state.app_subscriptions.remove(app.device_id());
	}

	fn unregister_all_app_messages(&self) {
		let mut state = self.state.lock();
		state.calls.push(SdkCall::UnregisterAllAppMessages);
		state.app_subscriptions.clear();
	}

	fn send_message(&self, app: &AppBinding, message: Value) {
		let completion = {
			let mut state = self.state.lock();
			state.calls.push(SdkCall::SendMessage {
				device_id: app.device_id().to_string(),
				message,
			});
			state.send_outcome.zip(state.callbacks.clone())
		};

		if let Some((outcome, sink)) = completion {
			sink.send_completed(app.clone(), outcome);
		}
	}
}
