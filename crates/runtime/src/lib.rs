//! Wearbridge runtime: vendor SDK seam, stores, and error taxonomy
//!
//! This crate holds the pieces the bridge core is built on:
//!
//! - **SDK seam**: [`DeviceSdk`] plus the [`CallbackSink`] through which the
//!   vendor SDK reports asynchronous results
//! - **Handles**: [`LiveHandle`] and [`AppBinding`], session-scoped references
//!   to vendor device objects
//! - **Device identity store**: durable display metadata of paired devices
//! - **Session handle registry**: process-lifetime map of device id to handle
//! - **Simulator**: [`SimulatedSdk`], an in-process SDK for tests and demos
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │  wearbridge  │  Bridge facade, state machine, gateway
//! └──────┬───────┘
//!        │ DeviceSdk / BlobStore
//! ┌──────▼───────┐
//! │   runtime    │  This crate
//! │  ┌────────┐  │
//! │  │ Store  │  │  DeviceRecord blobs under one key
//! │  └────────┘  │
//! │  ┌────────┐  │
//! │  │Registry│  │  id -> LiveHandle
//! │  └────────┘  │
//! └──────┬───────┘
//!        │ vendor adapter
//! ┌──────▼───────┐
//! │  vendor SDK  │
//! └──────────────┘
//! ```

pub mod callback;
pub mod error;
pub mod handle;
pub mod identity_store;
pub mod sdk;
pub mod session_registry;
pub mod simulator;

// Re-export key types at crate root
pub use callback::{CallbackSink, SdkCallback};
pub use error::{Error, Result};
pub use handle::{AppBinding, LiveHandle, SdkDevice};
pub use identity_store::{BlobStore, DeviceIdentityStore, FileBlobStore, MemoryBlobStore};
pub use sdk::{DeviceSdk, SdkDeviceStatus, SendOutcome};
pub use session_registry::SessionRegistry;
pub use simulator::{SdkCall, SimDevice, SimulatedSdk};
