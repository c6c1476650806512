//! Session-scoped device handles.
//!
//! A [`LiveHandle`] wraps the vendor SDK's device object. It is valid only for
//! the process session that produced it: the vendor cannot restore one from
//! persisted data, so the type intentionally has no serde implementation.

use std::fmt;
use std::sync::Arc;

use downcast_rs::{DowncastSync, impl_downcast};
use wearbridge_protocol::DeviceRecord;

/// Device object owned by a vendor SDK adapter.
///
/// Adapters implement this for their native device type and recover it with
/// [`LiveHandle::downcast_ref`] when the SDK needs the concrete object back.
pub trait SdkDevice: DowncastSync + fmt::Debug {
	/// Stable vendor-assigned identifier.
	fn id(&self) -> &str;

	/// User-assigned friendly name, if the SDK reports one.
	fn friendly_name(&self) -> Option<&str>;

	/// Hardware model name.
	fn model_name(&self) -> &str;
}

impl_downcast!(sync SdkDevice);

/// Live reference to a paired device for the current session.
#[derive(Clone)]
pub struct LiveHandle {
	device: Arc<dyn SdkDevice>,
}

impl LiveHandle {
	pub fn new(device: Arc<dyn SdkDevice>) -> Self {
		Self { device }
	}

	pub fn id(&self) -> &str {
		self.device.id()
	}

	/// Friendly name, or `None` when the SDK does not know one.
	pub fn friendly_name(&self) -> Option<&str> {
		self.device.friendly_name()
	}

	pub fn model(&self) -> &str {
		self.device.model_name()
	}

	/// Returns the adapter's concrete device type.
	pub fn downcast_ref<T: SdkDevice>(&self) -> Option<&T> {
		(*self.device).downcast_ref::<T>()
	}

	/// Returns true if both handles wrap the same SDK object.
	pub fn same_object(&self, other: &LiveHandle) -> bool {
		Arc::ptr_eq(&self.device, &other.device)
	}

	/// Display metadata to persist for this device.
	///
	/// Devices without a friendly name are recorded under their model name.
	pub fn to_record(&self) -> DeviceRecord {
		DeviceRecord::new(
			self.id(),
			self.friendly_name().unwrap_or_else(|| self.model()),
			self.model(),
		)
	}
}

impl fmt::Debug for LiveHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LiveHandle").field("id", &self.id()).finish()
	}
}

/// Binding of an application id to a connected device.
///
/// This is what the SDK subscribes for inbound app messages and addresses
/// outbound sends to.
#[derive(Clone, Debug)]
pub struct AppBinding {
	pub app_id: String,
	pub device: LiveHandle,
}

impl AppBinding {
	pub fn new(app_id: impl Into<String>, device: LiveHandle) -> Self {
		Self {
			app_id: app_id.into(),
			device,
		}
	}

	pub fn device_id(&self) -> &str {
		self.device.id()
	}

	/// Returns true if `other` targets the same app on the same SDK object.
	pub fn matches(&self, other: &AppBinding) -> bool {
		self.app_id == other.app_id && self.device.same_object(&other.device)
	}
}
