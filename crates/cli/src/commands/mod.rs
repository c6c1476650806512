mod check_url;
mod devices;
mod simulate;

use std::path::PathBuf;

use crate::cli::{Cli, Commands, StoreArgs};
use crate::error::{CliError, Result};

pub async fn dispatch(cli: Cli) -> Result<()> {
	let format = cli.format;
	match cli.command {
		Commands::Devices(args) => devices::execute(&args, format),
		Commands::CheckUrl(args) => check_url::execute(&args, format),
		Commands::Simulate(args) => simulate::execute(&args).await,
	}
}

/// Device store file: `--store`, else `<data dir>/wearbridge/devices.json`.
pub(crate) fn store_path(args: &StoreArgs) -> Result<PathBuf> {
	if let Some(path) = &args.store {
		return Ok(path.clone());
	}
	dirs::data_dir()
		.map(|dir| dir.join("wearbridge").join("devices.json"))
		.ok_or(CliError::NoDataDir)
}
