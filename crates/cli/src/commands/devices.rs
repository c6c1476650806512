use std::sync::Arc;

use wearbridge::constants::DEVICES_LIST_KEY;
use wearbridge::{DeviceIdentityStore, DeviceListing, FileBlobStore};

use super::store_path;
use crate::cli::DevicesArgs;
use crate::error::Result;
use crate::output::{self, OutputFormat};

/// Lists persisted devices. A fresh process holds no live handles, so every
/// device shows as offline and in need of re-pairing.
pub fn execute(args: &DevicesArgs, format: OutputFormat) -> Result<()> {
	let path = store_path(&args.store)?;
	let key = args.store.storage_key.as_deref().unwrap_or(DEVICES_LIST_KEY);
	tracing::debug!(path = %path.display(), key, "Reading device store");

	let store = DeviceIdentityStore::new(Arc::new(FileBlobStore::new(path)), key);
	let devices: Vec<DeviceListing> = store
		.list()?
		.into_iter()
		.map(|record| DeviceListing::from_record(record, false))
		.collect();

	match format {
		OutputFormat::Json => output::print_json(&output::devices_record(&devices))?,
		OutputFormat::Text => println!("{}", output::devices_text(&devices)),
	}
	Ok(())
}
