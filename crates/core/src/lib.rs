//! wearbridge: event-driven bridge to a vendor wearable SDK
//!
//! A vendor SDK hands out device handles that are only valid for the current
//! process, while a host application wants a stable list of paired devices
//! across restarts. This crate reconciles the two: it persists device
//! identity, caches live handles per session, tracks connection state from
//! SDK callbacks, and relays app messages, reporting everything to the host
//! as [`BridgeEvent`]s.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use wearbridge::{Bridge, BridgeEvent, FileBlobStore};
//!
//! #[tokio::main]
//! async fn main() -> wearbridge::Result<()> {
//!     let bridge = Bridge::new(Arc::new(MyVendorAdapter::new()), Arc::new(FileBlobStore::new("devices.json")));
//!     bridge.initialize("myapp", "3f1c2b0e-5a7d-4c39-9e1b-2d8f6a4b7c01")?;
//!
//!     // Hand URLs opened on "myapp://" to the bridge.
//!     bridge.handle_open_url("myapp://device-select-resp?...");
//!
//!     let connected = bridge.wait_for_event(
//!         |e| matches!(e.as_status(), Some(s) if s.status == wearbridge::LinkStatus::Connected),
//!         Duration::from_secs(30),
//!     );
//!     bridge.connect("A1B2", "fr965", "Forerunner")?;
//!     connected.wait().await?;
//!
//!     bridge.send_message(r#"{"type":"START","payload":{}}"#)?;
//!     Ok(())
//! }
//! ```

mod bridge;
mod directory;
mod worker;

pub mod config;
pub mod connection;
pub mod events;
pub mod gateway;
pub mod pairing;
pub mod state;

pub use bridge::Bridge;
pub use config::BridgeConfig;
pub use events::{EventStream, EventSubscription, EventWaiter};
pub use state::ConnectionState;
pub use wearbridge_protocol::{
	BridgeEvent, DeviceListing, DeviceRecord, DeviceStatusPayload, InboundMessage, LinkStatus, constants,
};
pub use wearbridge_runtime::{
	AppBinding, BlobStore, CallbackSink, DeviceIdentityStore, DeviceSdk, Error, FileBlobStore, LiveHandle,
	MemoryBlobStore, Result, SdkCall, SdkCallback, SdkDevice, SdkDeviceStatus, SendOutcome, SimDevice, SimulatedSdk,
};
pub use worker::COMPANION_APP_REQUIRED;
