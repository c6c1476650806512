//! Asynchronous SDK callbacks.
//!
//! Vendor SDKs call back on their own schedulers. Adapters forward every
//! callback into a [`CallbackSink`], which funnels them onto one channel
//! consumed by a single bridge task, so state is only ever mutated from one
//! place.

use serde_json::Value;
use tokio::sync::mpsc;

use crate::handle::{AppBinding, LiveHandle};
use crate::sdk::{SdkDeviceStatus, SendOutcome};

/// A callback delivered by the vendor SDK.
#[derive(Debug)]
pub enum SdkCallback {
	/// A registered device changed status.
	DeviceStatus {
		device: LiveHandle,
		status: SdkDeviceStatus,
	},
	/// A registered app sent one or more messages, in any shape.
	Messages { app: AppBinding, messages: Value },
	/// An outbound message finished.
	SendCompleted { app: AppBinding, outcome: SendOutcome },
	/// The vendor's companion app must be installed first.
	CompanionAppMissing,
}

/// Sending half of the callback channel, handed to [`DeviceSdk::initialize`].
///
/// [`DeviceSdk::initialize`]: crate::DeviceSdk::initialize
#[derive(Debug, Clone)]
pub struct CallbackSink {
	tx: mpsc::UnboundedSender<SdkCallback>,
}

impl CallbackSink {
	/// Creates a sink and the receiver the bridge worker drains.
	pub fn channel() -> (Self, mpsc::UnboundedReceiver<SdkCallback>) {
		let (tx, rx) = mpsc::unbounded_channel();
		(Self { tx }, rx)
	}

	pub fn device_status_changed(&self, device: LiveHandle, status: SdkDeviceStatus) {
		self.deliver(SdkCallback::DeviceStatus { device, status });
	}

	pub fn messages_received(&self, app: AppBinding, messages: Value) {
		self.deliver(SdkCallback::Messages { app, messages });
	}

	pub fn send_completed(&self, app: AppBinding, outcome: SendOutcome) {
		self.deliver(SdkCallback::SendCompleted { app, outcome });
	}

	pub fn companion_app_missing(&self) {
		self.deliver(SdkCallback::CompanionAppMissing);
	}

	/// Returns true once the bridge has stopped listening.
	pub fn is_closed(&self) -> bool {
		self.tx.is_closed()
	}

	fn deliver(&self, callback: SdkCallback) {
		if let Err(err) = self.tx.send(callback) {
			tracing::debug!(callback = ?err.0, "Bridge stopped, dropping SDK callback");
		}
	}
}
