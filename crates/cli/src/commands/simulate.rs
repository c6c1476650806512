use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use wearbridge::constants::DEVICE_SELECT_RESPONSE;
use wearbridge::{BlobStore, Bridge, BridgeConfig, BridgeEvent, EventStream, FileBlobStore, MemoryBlobStore, SimulatedSdk};

use super::store_path;
use crate::cli::SimulateArgs;
use crate::error::{CliError, Result};
use crate::output;
use crate::script::{Script, Step, parse_outcome, parse_status, send_payload};

/// Replays a scenario script, streaming one NDJSON record per event or
/// step result to stdout.
///
/// Without `--store` the paired devices live in memory only.
pub async fn execute(args: &SimulateArgs) -> Result<()> {
	let script = Script::load(&args.script)?;
	let override_config = args.config.as_deref().map(load_config).transpose()?;
	let mut config = script.bridge_config(override_config);
	if let Some(key) = &args.store.storage_key {
		config = config.with_storage_key(key.clone());
	}

	let storage: Arc<dyn BlobStore> = match &args.store.store {
		Some(_) => Arc::new(FileBlobStore::new(store_path(&args.store)?)),
		None => Arc::new(MemoryBlobStore::new()),
	};

	let mut out = io::stdout().lock();
	let mut simulation = Simulation::new(storage, &args.script);
	simulation.run(&script, config, &mut out).await
}

fn load_config(path: &Path) -> Result<BridgeConfig> {
	let content = std::fs::read_to_string(path).map_err(|source| CliError::Read {
		path: path.to_path_buf(),
		source,
	})?;
	serde_json::from_str(&content).map_err(|err| CliError::Config(format!("{}: {err}", path.display())))
}

/// A bridge wired to the simulated SDK, plus the event stream it reports on.
pub(crate) struct Simulation<'a> {
	sdk: Arc<SimulatedSdk>,
	bridge: Bridge,
	events: EventStream<BridgeEvent>,
	script_path: &'a Path,
	scheme: String,
}

impl<'a> Simulation<'a> {
	pub(crate) fn new(storage: Arc<dyn BlobStore>, script_path: &'a Path) -> Self {
		let sdk = Arc::new(SimulatedSdk::new());
		let bridge = Bridge::new(sdk.clone(), storage);
		let events = bridge.subscribe();
		Self {
			sdk,
			bridge,
			events,
			script_path,
			scheme: String::new(),
		}
	}

	pub(crate) async fn run<W: Write>(&mut self, script: &Script, config: BridgeConfig, out: &mut W) -> Result<()> {
		self.scheme = config.url_scheme.clone();
		self.bridge.initialize_with(config)?;
		self.flush(out).await?;

		for (index, step) in script.steps.iter().enumerate() {
			tracing::info!(index, step = step.name(), "Running step");
			self.step(step, out).await?;
			self.flush(out).await?;
		}

		self.bridge.teardown().await;
		self.flush(out).await
	}

	async fn step<W: Write>(&self, step: &Step, out: &mut W) -> Result<()> {
		match step {
			Step::Pair { devices } => {
				self.sdk.set_selection(devices.clone());
				let url = format!("{}://{DEVICE_SELECT_RESPONSE}", self.scheme);
				let accepted = self.bridge.handle_open_url(&url);
				output::write_line(out, &output::url_record(&url, accepted))?;
			}
			Step::OpenUrl { url } => {
				let accepted = self.bridge.handle_open_url(url);
				output::write_line(out, &output::url_record(url, accepted))?;
			}
			Step::ListDevices => {
				let devices = self.bridge.list_devices()?;
				output::write_line(out, &output::devices_record(&devices))?;
			}
			Step::Connect { id, model, name } => self.bridge.connect(id, model, name)?,
			Step::Status { id, status } => {
				if !self.sdk.push_status(id, parse_status(status)) {
					output::write_line(out, &output::undelivered_record(step.name(), Some(id)))?;
				}
			}
			Step::Receive { id, messages } => {
				if !self.sdk.push_messages(id, messages.clone()) {
					output::write_line(out, &output::undelivered_record(step.name(), Some(id)))?;
				}
			}
			Step::Send { payload } => self.bridge.send_message(&send_payload(payload))?,
			Step::SendOutcome { outcome } => {
				let outcome = parse_outcome(self.script_path, outcome.as_deref())?;
				self.sdk.set_send_outcome(outcome);
			}
			Step::CompanionMissing => {
				if !self.sdk.push_companion_missing() {
					output::write_line(out, &output::undelivered_record(step.name(), None))?;
				}
			}
			Step::RequestPairing => self.bridge.request_pairing_ui()?,
			Step::Sleep { ms } => tokio::time::sleep(Duration::from_millis(*ms)).await,
			Step::Teardown => self.bridge.teardown().await,
		}
		Ok(())
	}

	/// Waits for the bridge to go idle, then writes every pending event.
	async fn flush<W: Write>(&mut self, out: &mut W) -> Result<()> {
		if self.bridge.is_initialized() {
			self.bridge.settle().await?;
		}
		for event in self.events.drain() {
			output::write_line(out, &output::event_record(&event))?;
		}
		Ok(())
	}

	#[cfg(test)]
	pub(crate) fn sdk(&self) -> &SimulatedSdk {
		&self.sdk
	}
}

#[cfg(test)]
mod tests {
	use std::path::PathBuf;

	use serde_json::{Value, json};

	use super::*;

	async fn run(script: &str) -> (Vec<Value>, Result<()>) {
		let path = PathBuf::from("scenario.json");
		let script = Script::parse(&path, script).unwrap();
		let config = script.bridge_config(None);
		let mut simulation = Simulation::new(Arc::new(MemoryBlobStore::new()), &path);
		let mut out = Vec::new();
		let result = simulation.run(&script, config, &mut out).await;
		let records = String::from_utf8(out)
			.unwrap()
			.lines()
			.map(|line| serde_json::from_str(line).unwrap())
			.collect();
		(records, result)
	}

	#[tokio::test]
	async fn pair_connect_receive() {
		let (records, result) = run(r#"{
			"config": {"urlScheme": "demo", "appId": "app-1"},
			"steps": [
				{"step": "pair", "devices": [{"id": "A", "name": "Watch1", "model": "X"}]},
				{"step": "listDevices"},
				{"step": "connect", "id": "A", "model": "X", "name": "Watch1"},
				{"step": "status", "id": "A", "status": "connected"},
				{"step": "receive", "id": "A", "messages": 42}
			]
		}"#)
		.await;
		result.unwrap();

		assert_eq!(records[0], json!({"event": "ready", "body": true}));
		assert_eq!(records[1], json!({"openUrl": "demo://device-select-resp", "accepted": true}));
		assert_eq!(records[2]["devices"][0]["id"], "A");
		assert_eq!(records[2]["devices"][0]["status"], "ONLINE");
		assert!(records.iter().any(|r| r["event"] == "deviceStatusChanged" && r["body"]["status"] == "ONLINE"));
		assert_eq!(
			records.last().unwrap(),
			&json!({"event": "message", "body": {"type": "RAW", "payload": "42"}})
		);
	}

	#[tokio::test]
	async fn unsubscribed_callbacks_are_reported() {
		let (records, result) = run(r#"{"steps": [
			{"step": "status", "id": "Z", "status": "connected"},
			{"step": "receive", "id": "Z", "messages": {"type": "T"}}
		]}"#)
		.await;
		result.unwrap();

		assert_eq!(records[1], json!({"undelivered": "status", "deviceId": "Z"}));
		assert_eq!(records[2], json!({"undelivered": "receive", "deviceId": "Z"}));
	}

	#[tokio::test]
	async fn send_without_session_reports_error_event() {
		let (records, result) = run(r#"{"steps": [{"step": "send", "payload": "hi"}]}"#).await;
		result.unwrap();
		assert!(records.iter().any(|r| r["event"] == "error"));
	}

	#[tokio::test]
	async fn bad_outcome_fails_the_run() {
		let (_, result) = run(r#"{"steps": [{"step": "sendOutcome", "outcome": "exploded"}]}"#).await;
		assert!(matches!(result, Err(CliError::Script { .. })));
	}

	#[tokio::test]
	async fn invalid_config_fails_before_any_step() {
		let path = PathBuf::from("scenario.json");
		let script = Script::parse(&path, r#"{"steps": [{"step": "listDevices"}]}"#).unwrap();
		let mut simulation = Simulation::new(Arc::new(MemoryBlobStore::new()), &path);
		let mut out = Vec::new();
		let result = simulation.run(&script, BridgeConfig::new("", "app"), &mut out).await;

		assert_eq!(result.unwrap_err().code(), "INVALID_CONFIG");
		assert!(out.is_empty());
		assert!(simulation.sdk().calls().is_empty());
	}
}
