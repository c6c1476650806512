#[cfg(test)]
mod tests;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;

/// Root CLI for wearbridge.
#[derive(Parser, Debug)]
#[command(name = "wearbridge")]
#[command(about = "Wearable bridge CLI - inspect paired devices and replay bridge scenarios")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format: json (default) or text
	#[arg(short = 'f', long, global = true, value_enum, default_value = "json")]
	pub format: OutputFormat,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// List persisted devices as a fresh process sees them.
	Devices(DevicesArgs),
	/// Check whether a URL would be accepted as a device-selection response.
	CheckUrl(CheckUrlArgs),
	/// Replay a scripted scenario against the simulated SDK (NDJSON output).
	Simulate(SimulateArgs),
}

/// Where paired devices are persisted.
#[derive(Args, Debug, Clone, Default)]
pub struct StoreArgs {
	/// Device store file (defaults to the platform data directory)
	#[arg(long, value_name = "FILE")]
	pub store: Option<PathBuf>,

	/// Key the device list is stored under
	#[arg(long, value_name = "KEY")]
	pub storage_key: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct DevicesArgs {
	#[command(flatten)]
	pub store: StoreArgs,
}

#[derive(Args, Debug, Clone)]
pub struct CheckUrlArgs {
	/// URL opened on the host's scheme
	#[arg(value_name = "URL")]
	pub url: String,

	/// URL scheme the pairing flow calls back on
	#[arg(long, value_name = "SCHEME")]
	pub scheme: String,
}

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
	/// Scenario script (JSON)
	#[arg(value_name = "SCRIPT")]
	pub script: PathBuf,

	#[command(flatten)]
	pub store: StoreArgs,

	/// Bridge configuration file; overrides the script's `config`
	#[arg(long, value_name = "FILE")]
	pub config: Option<PathBuf>,
}
