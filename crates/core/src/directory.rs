//! Device directory: the identity store and session registry as one unit.
//!
//! The two stores are owned independently and keyed by the same device id.
//! They are only merged at read time, in [`DeviceDirectory::list_devices`].
//! A pairing response rewrites both under one write lock, so readers always
//! see either the old pair or the new pair, never a mix.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use wearbridge_protocol::{DeviceListing, DeviceRecord};
use wearbridge_runtime::{BlobStore, DeviceIdentityStore, LiveHandle, Result, SessionRegistry};

pub struct DeviceDirectory {
	pairing: RwLock<()>,
	store: DeviceIdentityStore,
	registry: SessionRegistry,
}

impl DeviceDirectory {
	pub fn new(backend: Arc<dyn BlobStore>, storage_key: impl Into<String>) -> Self {
		Self {
			pairing: RwLock::new(()),
			store: DeviceIdentityStore::new(backend, storage_key),
			registry: SessionRegistry::new(),
		}
	}

	/// Replaces the persisted list and the live handles with one pairing result.
	///
	/// Duplicate ids keep their first position and the last handle. If the
	/// records cannot be persisted the registry is left untouched.
	pub fn apply_pairing(&self, handles: Vec<LiveHandle>) -> Result<Vec<DeviceRecord>> {
		let handles = dedup_by_id(handles);
		let records: Vec<DeviceRecord> = handles.iter().map(LiveHandle::to_record).collect();

		let _guard = self.pairing.write();
		self.store.replace_all(&records)?;
		self.registry.rebuild(handles);

		tracing::info!(count = records.len(), "Pairing result applied");
		Ok(records)
	}

	/// Persisted devices in storage order, each annotated with liveness.
	pub fn list_devices(&self) -> Result<Vec<DeviceListing>> {
		let _guard = self.pairing.read();
		let records = self.store.list()?;
		Ok(records
			.into_iter()
			.map(|record| {
				let live = self.registry.contains(&record.id);
				DeviceListing::from_record(record, live)
			})
			.collect())
	}

	pub fn resolve(&self, id: &str) -> Option<LiveHandle> {
		let _guard = self.pairing.read();
		self.registry.resolve(id)
	}

	pub fn has_live_sessions(&self) -> bool {
		let _guard = self.pairing.read();
		!self.registry.is_empty()
	}

	/// Drops every live handle. Persisted records stay.
	pub fn clear_sessions(&self) {
		let _guard = self.pairing.write();
		self.registry.clear();
	}

	/// Removes the persisted list and every live handle.
	pub fn forget_all(&self) -> Result<()> {
		let _guard = self.pairing.write();
		self.store.clear()?;
		self.registry.clear();
		Ok(())
	}
}

fn dedup_by_id(handles: Vec<LiveHandle>) -> Vec<LiveHandle> {
	let mut positions: HashMap<String, usize> = HashMap::new();
	let mut unique: Vec<LiveHandle> = Vec::with_capacity(handles.len());
	for handle in handles {
		match positions.get(handle.id()) {
			Some(&index) => unique[index] = handle,
			None => {
				positions.insert(handle.id().to_string(), unique.len());
				unique.push(handle);
			}
		}
	}
	unique
}
