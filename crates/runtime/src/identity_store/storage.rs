//! Blob storage backends for persisted device records.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use parking_lot::Mutex;

use crate::error::{Error, Result};

/// Durable key-value storage holding an ordered list of blobs per key.
pub trait BlobStore: Send + Sync {
	/// Loads the blobs stored under `key`, or `None` if nothing is stored.
	fn load(&self, key: &str) -> Result<Option<Vec<Vec<u8>>>>;

	/// Replaces everything stored under `key` with `blobs`.
	fn store(&self, key: &str, blobs: Vec<Vec<u8>>) -> Result<()>;

	fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory [`BlobStore`] that lives as long as the process.
#[derive(Default)]
pub struct MemoryBlobStore {
	entries: Mutex<HashMap<String, Vec<Vec<u8>>>>,
}

impl MemoryBlobStore {
	pub fn new() -> Self {
		Self::default()
	}
}

impl BlobStore for MemoryBlobStore {
	fn load(&self, key: &str) -> Result<Option<Vec<Vec<u8>>>> {
		Ok(self.entries.lock().get(key).cloned())
	}

	fn store(&self, key: &str, blobs: Vec<Vec<u8>>) -> Result<()> {
		self.entries.lock().insert(key.to_string(), blobs);
		Ok(())
	}

	fn remove(&self, key: &str) -> Result<()> {
		self.entries.lock().remove(key);
		Ok(())
	}
}

/// On-disk document: key -> base64-encoded blobs.
type Document = BTreeMap<String, Vec<String>>;

/// [`BlobStore`] persisted as a single JSON document.
///
/// Writes go to a sibling temp file that is renamed over the document, so a
/// crash mid-write leaves the previous document intact.
pub struct FileBlobStore {
	path: PathBuf,
	lock: Mutex<()>,
}

impl FileBlobStore {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			lock: Mutex::new(()),
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Reads the document, or `None` if the file exists but does not parse.
	fn parse_document(&self) -> Result<Option<Document>> {
		let content = match fs::read_to_string(&self.path) {
			Ok(content) => content,
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Some(Document::new())),
			Err(err) => return Err(err.into()),
		};
		match serde_json::from_str(&content) {
			Ok(document) => Ok(Some(document)),
			Err(err) => {
				tracing::warn!(path = %self.path.display(), error = %err, "Device store unreadable");
				Ok(None)
			}
		}
	}

	fn read_document(&self) -> Result<Document> {
		Ok(self.parse_document()?.unwrap_or_default())
	}

	/// Like [`read_document`](Self::read_document), but an unreadable file is
	/// moved to `<path>.bak` first so the rewrite cannot destroy it.
	fn read_for_update(&self) -> Result<Document> {
		if let Some(document) = self.parse_document()? {
			return Ok(document);
		}
		let backup = self.backup_path();
		fs::rename(&self.path, &backup).map_err(|err| Error::Storage(format!("{}: {err}", backup.display())))?;
		tracing::warn!(
			path = %self.path.display(),
			backup = %backup.display(),
			"Moved unreadable device store aside, starting empty"
		);
		Ok(Document::new())
	}

	/// Where an unreadable store is moved before it is rewritten.
	pub fn backup_path(&self) -> PathBuf {
		let mut name = self.path.as_os_str().to_owned();
		name.push(".bak");
		PathBuf::from(name)
	}

	fn write_document(&self, document: &Document) -> Result<()> {
		if let Some(parent) = self.path.parent() {
			fs::create_dir_all(parent)?;
		}
		let tmp = self.path.with_extension("json.tmp");
		fs::write(&tmp, serde_json::to_string_pretty(document)?)?;
		fs::rename(&tmp, &self.path).map_err(|err| Error::Storage(format!("{}: {err}", self.path.display())))
	}
}

impl BlobStore for FileBlobStore {
	fn load(&self, key: &str) -> Result<Option<Vec<Vec<u8>>>> {
		let _guard = self.lock.lock();
		let document = self.read_document()?;
		let Some(entries) = document.get(key) else {
			return Ok(None);
		};

		let blobs = entries
			.iter()
			.enumerate()
			.filter_map(|(index, entry)| match STANDARD.decode(entry) {
				Ok(blob) => Some(blob),
				Err(err) => {
					tracing::warn!(key, index, error = %err, "Skipping undecodable blob");
					None
				}
			})
			.collect();
		Ok(Some(blobs))
	}

	fn store(&self, key: &str, blobs: Vec<Vec<u8>>) -> Result<()> {
		let _guard = self.lock.lock();
		let mut document = self.read_for_update()?;
		document.insert(key.to_string(), blobs.iter().map(|blob| STANDARD.encode(blob)).collect());
		self.write_document(&document)
	}

	fn remove(&self, key: &str) -> Result<()> {
		let _guard = self.lock.lock();
		let mut document = self.read_for_update()?;
		if document.remove(key).is_some() {
			self.write_document(&document)?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use tempfile::TempDir;

	use super::*;

	#[test]
	fn memory_store_replaces_and_removes() {
		let store = MemoryBlobStore::new();
		assert!(store.load("k").unwrap().is_none());

		store.store("k", vec![b"one".to_vec(), b"two".to_vec()]).unwrap();
		store.store("k", vec![b"three".to_vec()]).unwrap();
		assert_eq!(store.load("k").unwrap(), Some(vec![b"three".to_vec()]));

		store.remove("k").unwrap();
		assert!(store.load("k").unwrap().is_none());
	}

	#[test]
	fn file_store_persists_across_instances() {
		let tmp = TempDir::new().unwrap();
		let path = tmp.path().join("nested").join("devices.json");

		FileBlobStore::new(&path)
			.store("k", vec![b"first".to_vec(), vec![0, 159, 255]])
			.unwrap();

		let reopened = FileBlobStore::new(&path);
		assert_eq!(reopened.load("k").unwrap(), Some(vec![b"first".to_vec(), vec![0, 159, 255]]));
		assert!(reopened.load("other").unwrap().is_none());
	}

	#[test]
	fn file_store_skips_bad_base64_entries() {
		let tmp = TempDir::new().unwrap();
		let path = tmp.path().join("devices.json");
		fs::write(&path, r#"{"k": ["b2s=", "***not base64***", "Zm9v"]}"#).unwrap();

		let store = FileBlobStore::new(&path);
		assert_eq!(store.load("k").unwrap(), Some(vec![b"ok".to_vec(), b"foo".to_vec()]));
	}

	#[test]
	fn corrupt_document_is_moved_aside_before_rewrite() {
		let tmp = TempDir::new().unwrap();
		let path = tmp.path().join("devices.json");
		fs::write(&path, "{ not json").unwrap();

		let store = FileBlobStore::new(&path);
		assert!(store.load("k").unwrap().is_none());

		assert!(!store.backup_path().exists());

		store.store("k", vec![b"fresh".to_vec()]).unwrap();
		assert_eq!(store.load("k").unwrap(), Some(vec![b"fresh".to_vec()]));
		assert_eq!(fs::read_to_string(store.backup_path()).unwrap(), "{ not json");
		assert_eq!(store.backup_path(), tmp.path().join("devices.json.bak"));
	}

	#[test]
	fn file_store_remove_keeps_other_keys() {
		let tmp = TempDir::new().unwrap();
		let store = FileBlobStore::new(tmp.path().join("devices.json"));
		store.store("a", vec![b"1".to_vec()]).unwrap();
		store.store("b", vec![b"2".to_vec()]).unwrap();

		store.remove("a").unwrap();
		assert!(store.load("a").unwrap().is_none());
		assert_eq!(store.load("b").unwrap(), Some(vec![b"2".to_vec()]));
	}
}
