//! Process-lifetime registry of live device handles.
//!
//! The registry is rebuilt wholesale from every pairing response: a fresh
//! response is the only source of truth for which devices are live, so
//! handles from earlier responses are discarded rather than merged.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::handle::LiveHandle;

/// Thread-safe map of device id to [`LiveHandle`] for the current session.
#[derive(Default)]
pub struct SessionRegistry {
	handles: RwLock<HashMap<String, LiveHandle>>,
}

impl SessionRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces every cached handle with `handles` under one write lock.
	///
	/// A later handle with a duplicate id wins.
	pub fn rebuild(&self, handles: impl IntoIterator<Item = LiveHandle>) {
		let mut map = self.handles.write();
		map.clear();
		for handle in handles {
			tracing::debug!(device_id = %handle.id(), "Cached live handle");
			map.insert(handle.id().to_string(), handle);
		}
	}

	/// Looks up a live handle by device id.
	pub fn resolve(&self, id: &str) -> Option<LiveHandle> {
		self.handles.read().get(id).cloned()
	}

	pub fn contains(&self, id: &str) -> bool {
		self.handles.read().contains_key(id)
	}

	/// True when no device in this session has a usable handle, meaning the
	/// pairing flow has to run before anything can connect.
	pub fn is_empty(&self) -> bool {
		self.handles.read().is_empty()
	}

	pub fn len(&self) -> usize {
		self.handles.read().len()
	}

	/// Drops every handle.
	pub fn clear(&self) {
		self.handles.write().clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::simulator::SimDevice;

	fn handle(id: &str, name: &str) -> LiveHandle {
		SimDevice::new(id, name, "X").into_handle()
	}

	#[test]
	fn rebuild_discards_previous_session() {
		let registry = SessionRegistry::new();
		assert!(registry.is_empty());

		registry.rebuild([handle("A", "Watch1"), handle("B", "Watch2")]);
		assert_eq!(registry.len(), 2);

		registry.rebuild([handle("C", "Watch3")]);
		assert!(!registry.contains("A"));
		assert!(!registry.contains("B"));
		assert_eq!(registry.resolve("C").unwrap().friendly_name(), Some("Watch3"));
	}

	#[test]
	fn resolve_matches_id_only() {
		let registry = SessionRegistry::new();
		registry.rebuild([handle("A", "Watch1")]);

		assert!(registry.resolve("Watch1").is_none());
		assert!(registry.resolve("X").is_none());
		assert!(registry.resolve("A").is_some());
	}

	#[test]
	fn clear_empties_registry() {
		let registry = SessionRegistry::new();
		registry.rebuild([handle("A", "Watch1")]);
		registry.clear();
		assert!(registry.is_empty());
		assert!(registry.resolve("A").is_none());
	}
}
