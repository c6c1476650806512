//! Message gateway between the host and the armed messaging session.

mod normalize;


use std::sync::Arc;

pub use normalize::{normalize, outbound_message, text_form};
use serde_json::Value;
use wearbridge_protocol::BridgeEvent;
use wearbridge_runtime::{AppBinding, DeviceSdk, Error, SendOutcome};

use crate::events::EventBus;

pub(crate) struct MessageGateway {
	sdk: Arc<dyn DeviceSdk>,
	events: Arc<EventBus<BridgeEvent>>,
}

impl MessageGateway {
	pub fn new(sdk: Arc<dyn DeviceSdk>, events: Arc<EventBus<BridgeEvent>>) -> Self {
		Self { sdk, events }
	}

	/// Sends `payload` over `session`.
	///
	/// Without a session an `error` event is emitted and the SDK is not called.
	/// The outcome arrives later through [`on_send_completed`](Self::on_send_completed).
	pub fn send(&self, session: Option<&AppBinding>, payload: &str) {
		let Some(app) = session else {
			tracing::warn!("Send requested without an armed messaging session");
			self.events.emit(BridgeEvent::Error(Error::NotConnected.to_string()));
			return;
		};

		let message = outbound_message(payload);
		tracing::debug!(device_id = %app.device_id(), %message, "Sending app message");
		self.sdk.send_message(app, message);
	}

	pub fn on_send_completed(&self, app: &AppBinding, outcome: SendOutcome) {
		if outcome.is_success() {
			tracing::debug!(device_id = %app.device_id(), "App message delivered");
			return;
		}
		let err = Error::SendFailed(outcome);
		tracing::warn!(device_id = %app.device_id(), error = %err, "App message failed");
		self.events.emit(BridgeEvent::Error(err.to_string()));
	}

	/// Emits one `message` event per inbound item from the armed session.
	pub fn on_receive(&self, session: Option<&AppBinding>, app: &AppBinding, raw: &Value) {
		if !session.is_some_and(|armed| armed.matches(app)) {
			tracing::debug!(device_id = %app.device_id(), "Dropping messages from an app without a session");
			return;
		}

		for message in normalize(raw) {
			tracing::trace!(kind = %message.kind, "Inbound app message");
			self.events.emit(BridgeEvent::Message(message));
		}
	}
}
