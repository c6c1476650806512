//! Capability interface over the vendor wearable SDK.
//!
//! The bridge core never talks to a vendor SDK directly. It depends on
//! [`DeviceSdk`], which an adapter implements over the real SDK, and receives
//! everything asynchronous (status changes, inbound messages, send results)
//! through the [`CallbackSink`] handed over at initialization.
//!
//! # Synchronous vs. asynchronous calls
//!
//! | Call | Result |
//! |------|--------|
//! | [`device_status`](DeviceSdk::device_status) | returned immediately |
//! | [`parse_device_selection`](DeviceSdk::parse_device_selection) | returned immediately |
//! | [`register_device_events`](DeviceSdk::register_device_events) | status changes via sink |
//! | [`register_app_messages`](DeviceSdk::register_app_messages) | inbound messages via sink |
//! | [`send_message`](DeviceSdk::send_message) | [`SendOutcome`] via sink, possibly never |

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use url::Url;

use crate::callback::CallbackSink;
use crate::handle::{AppBinding, LiveHandle};

/// Device status as reported by the vendor SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdkDeviceStatus {
	/// The device app is open and reachable.
	Connected,
	/// The device is in range but the app is not open.
	NotConnected,
	/// Bluetooth is off or unavailable on the host.
	BluetoothNotReady,
	/// The SDK no longer recognizes the device.
	InvalidDevice,
	/// The companion app is not installed or not running.
	NotFound,
	/// A status value this bridge does not know.
	Unrecognized(String),
}

impl SdkDeviceStatus {
	/// Returns the vendor's name for this status.
	pub fn as_str(&self) -> &str {
		match self {
			SdkDeviceStatus::Connected => "connected",
			SdkDeviceStatus::NotConnected => "notConnected",
			SdkDeviceStatus::BluetoothNotReady => "bluetoothNotReady",
			SdkDeviceStatus::InvalidDevice => "invalidDevice",
			SdkDeviceStatus::NotFound => "notFound",
			SdkDeviceStatus::Unrecognized(raw) => raw,
		}
	}
}

impl FromStr for SdkDeviceStatus {
	type Err = std::convert::Infallible;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(match s {
			"connected" => SdkDeviceStatus::Connected,
			"notConnected" => SdkDeviceStatus::NotConnected,
			"bluetoothNotReady" => SdkDeviceStatus::BluetoothNotReady,
			"invalidDevice" => SdkDeviceStatus::InvalidDevice,
			"notFound" => SdkDeviceStatus::NotFound,
			other => SdkDeviceStatus::Unrecognized(other.to_string()),
		})
	}
}

impl fmt::Display for SdkDeviceStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Result of an outbound app message, as reported by the vendor SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
	Success,
	Unknown,
	InternalError,
	DeviceNotAvailable,
	AppNotFound,
	DeviceIsBusy,
	UnsupportedType,
	InsufficientMemory,
	Timeout,
	MaxRetries,
	PromptNotDisplayed,
	AppAlreadyRunning,
}

impl SendOutcome {
	pub fn is_success(self) -> bool {
		self == SendOutcome::Success
	}

	/// Human-readable description of the outcome.
	pub fn describe(self) -> &'static str {
		match self {
			SendOutcome::Success => "success",
			SendOutcome::Unknown => "unknown error",
			SendOutcome::InternalError => "internal SDK error",
			SendOutcome::DeviceNotAvailable => "device not available, check that it is in range",
			SendOutcome::AppNotFound => "app not found on the device, install it and retry",
			SendOutcome::DeviceIsBusy => "device is busy, try again shortly",
			SendOutcome::UnsupportedType => "message contains an unsupported type",
			SendOutcome::InsufficientMemory => "device is out of memory",
			SendOutcome::Timeout => "timed out waiting for the device",
			SendOutcome::MaxRetries => "gave up after the maximum number of retries",
			SendOutcome::PromptNotDisplayed => "the device did not display the prompt",
			SendOutcome::AppAlreadyRunning => "the app is already running on the device",
		}
	}
}

impl FromStr for SendOutcome {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"success" => Ok(SendOutcome::Success),
			"unknown" => Ok(SendOutcome::Unknown),
			"internalError" => Ok(SendOutcome::InternalError),
			"deviceNotAvailable" => Ok(SendOutcome::DeviceNotAvailable),
			"appNotFound" => Ok(SendOutcome::AppNotFound),
			"deviceIsBusy" => Ok(SendOutcome::DeviceIsBusy),
			"unsupportedType" => Ok(SendOutcome::UnsupportedType),
			"insufficientMemory" => Ok(SendOutcome::InsufficientMemory),
			"timeout" => Ok(SendOutcome::Timeout),
			"maxRetries" => Ok(SendOutcome::MaxRetries),
			"promptNotDisplayed" => Ok(SendOutcome::PromptNotDisplayed),
			"appAlreadyRunning" => Ok(SendOutcome::AppAlreadyRunning),
			other => Err(format!("unknown send outcome: {other}")),
		}
	}
}

impl fmt::Display for SendOutcome {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.describe())
	}
}

/// Operations the bridge needs from a vendor wearable SDK.
///
/// Implementations must be cheap to call from the bridge worker: every method
/// returns without waiting on the device. Registration calls are expected to
/// be idempotent.
pub trait DeviceSdk: Send + Sync {
	/// One-time SDK setup. Asynchronous results are delivered to `callbacks`
	/// from then on.
	fn initialize(&self, url_scheme: &str, callbacks: CallbackSink);

	/// Opens the vendor's device-selection UI (the pairing flow).
	fn show_device_selection(&self);

	/// Extracts fresh live handles from a device-selection response URL.
	fn parse_device_selection(&self, url: &Url) -> Vec<LiveHandle>;

	/// Subscribes to status changes of `device`.
	fn register_device_events(&self, device: &LiveHandle);

	fn unregister_device_events(&self, device: &LiveHandle);

	fn unregister_all_device_events(&self);

	/// Queries the current status of `device`.
	fn device_status(&self, device: &LiveHandle) -> SdkDeviceStatus;

	/// Subscribes to inbound messages from `app`.
	fn register_app_messages(&self, app: &AppBinding);

	fn unregister_app_messages(&self, app: &AppBinding);

	fn unregister_all_app_messages(&self);

	/// Sends `message` to `app`. The outcome is reported via the sink.
	fn send_message(&self, app: &AppBinding, message: Value);
}
