//! Durable device identity store.
//!
//! Persists the display metadata ([`DeviceRecord`]) of the devices returned by
//! the most recent pairing response. The list is only ever replaced as a
//! whole, so it always mirrors exactly one pairing response.
//!
//! Layout: one JSON-encoded record per blob, stored in order under a single
//! key of a [`BlobStore`].

mod storage;


use std::sync::Arc;

pub use storage::{BlobStore, FileBlobStore, MemoryBlobStore};
use wearbridge_protocol::DeviceRecord;
use wearbridge_protocol::constants::DEVICES_LIST_KEY;

use crate::error::{Error, Result};

/// Persisted list of paired devices.
pub struct DeviceIdentityStore {
	backend: Arc<dyn BlobStore>,
	key: String,
}

impl DeviceIdentityStore {
	pub fn new(backend: Arc<dyn BlobStore>, key: impl Into<String>) -> Self {
		Self {
			backend,
			key: key.into(),
		}
	}

	/// Store under the default [`DEVICES_LIST_KEY`].
	pub fn with_default_key(backend: Arc<dyn BlobStore>) -> Self {
		Self::new(backend, DEVICES_LIST_KEY)
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	/// Overwrites the persisted list with `records`.
	pub fn replace_all(&self, records: &[DeviceRecord]) -> Result<()> {
		let blobs = records.iter().map(encode_record).collect::<Result<Vec<_>>>()?;
		self.backend.store(&self.key, blobs)?;
		tracing::debug!(key = %self.key, count = records.len(), "Persisted device records");
		Ok(())
	}

	/// Returns persisted records in storage order.
	///
	/// Records that fail to decode are skipped.
	pub fn list(&self) -> Result<Vec<DeviceRecord>> {
		let Some(blobs) = self.backend.load(&self.key)? else {
			return Ok(Vec::new());
		};

		Ok(blobs
			.iter()
			.enumerate()
			.filter_map(|(index, blob)| match decode_record(blob) {
				Ok(record) => Some(record),
				Err(err) => {
					tracing::warn!(key = %self.key, index, error = %err, "Skipping corrupt device record");
					None
				}
			})
			.collect())
	}

	/// Removes the persisted list.
	pub fn clear(&self) -> Result<()> {
		self.backend.remove(&self.key)
	}
}

/// Encodes one record as a storage blob.
pub fn encode_record(record: &DeviceRecord) -> Result<Vec<u8>> {
	Ok(serde_json::to_vec(record)?)
}

/// Decodes one storage blob.
pub fn decode_record(blob: &[u8]) -> Result<DeviceRecord> {
	serde_json::from_slice(blob).map_err(|err| Error::DecodeFailed {
		what: "device record",
		reason: err.to_string(),
	})
}
