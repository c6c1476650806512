//! Wire types shared between the bridge core and its host application.
//!
//! Everything a host sees crosses the boundary as one of these types:
//!
//! - [`DeviceRecord`] - durable device identity as persisted between runs
//! - [`DeviceListing`] - a record annotated with session liveness
//! - [`BridgeEvent`] - the outbound event contract (`ready`, `error`, `info`,
//!   `deviceStatusChanged`, `message`)
//!
//! Live SDK handles never appear here; they are session-scoped and owned by
//! the runtime crate.

pub mod constants;
pub mod device;
pub mod event;

pub use device::{DeviceListing, DeviceRecord, LinkStatus};
pub use event::{BridgeEvent, DeviceStatusPayload, InboundMessage};
