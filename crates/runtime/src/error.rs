//! Error types for the bridge runtime.

use thiserror::Error;

use crate::sdk::SendOutcome;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while bridging the vendor SDK.
///
/// Display strings are written for end users: most failures share the same
/// recovery action (run the pairing flow again), so each message says what to
/// do rather than exposing a bare code.
#[derive(Debug, Error)]
pub enum Error {
	/// An operation was attempted before `initialize`.
	#[error("Bridge is not initialized. Call initialize() with the app scheme and id first.")]
	NotInitialized,

	/// `initialize` was called outside a tokio runtime.
	#[error("Bridge must be initialized from within a tokio runtime.")]
	NoRuntime,

	/// The device is known but has no handle in the current session.
	#[error("Session expired. Tap to re-pair.")]
	NoLiveHandle { id: String },

	/// No messaging session is armed.
	#[error("Device app not connected. Open the app on your device.")]
	NotConnected,

	/// The SDK reported a non-success send outcome.
	#[error("Send failed: {0}")]
	SendFailed(SendOutcome),

	/// A stored or inbound item could not be decoded.
	#[error("Failed to decode {what}: {reason}")]
	DecodeFailed { what: &'static str, reason: String },

	/// A pairing callback did not match the configured scheme or shape.
	#[error("Callback ignored: {0}")]
	CallbackMismatch(String),

	/// Configuration rejected by validation.
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),

	/// Persistent storage failed.
	#[error("Storage error: {0}. Paired devices could not be saved.")]
	Storage(String),

	/// Timeout waiting for an event.
	#[error("Timeout: {0}")]
	Timeout(String),

	/// The event or command channel closed.
	#[error("Channel closed unexpectedly")]
	ChannelClosed,

	/// I/O error.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl Error {
	/// Returns true if the recovery action is running the pairing flow again.
	pub fn needs_repairing(&self) -> bool {
		matches!(self, Error::NoLiveHandle { .. })
	}

	/// Returns true if the error is swallowed rather than reported to the host.
	pub fn is_silent(&self) -> bool {
		matches!(self, Error::CallbackMismatch(_) | Error::DecodeFailed { .. })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn messages_are_actionable() {
		let err = Error::NoLiveHandle { id: "A".into() };
		assert!(err.needs_repairing());
		assert!(err.to_string().contains("re-pair"));

		let err = Error::SendFailed(SendOutcome::DeviceIsBusy);
		assert_eq!(err.to_string(), "Send failed: device is busy, try again shortly");
	}

	#[test]
	fn mismatch_and_decode_are_silent() {
		assert!(Error::CallbackMismatch("scheme".into()).is_silent());
		assert!(
			Error::DecodeFailed {
				what: "device record",
				reason: "eof".into()
			}
			.is_silent()
		);
		assert!(!Error::NotConnected.is_silent());
	}
}
