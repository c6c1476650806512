//! Stdout rendering for command results.
//!
//! `json` prints one pretty document per command; `simulate` always streams
//! NDJSON, one record per line, so it can be piped into line-oriented tools.

use std::io::{self, Write};

use serde::Serialize;
use serde_json::{Value, json};
use wearbridge::{BridgeEvent, DeviceListing};

/// Output format for CLI results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
	/// JSON output
	#[default]
	Json,
	/// Human-readable text
	Text,
}

/// Prints `value` as one pretty JSON document.
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
	let mut stdout = io::stdout().lock();
	serde_json::to_writer_pretty(&mut stdout, value)?;
	writeln!(stdout)
}

/// Writes `value` as one NDJSON line and flushes.
pub fn write_line<W: Write, T: Serialize>(out: &mut W, value: &T) -> io::Result<()> {
	serde_json::to_writer(&mut *out, value)?;
	writeln!(out)?;
	out.flush()
}

/// Text rendering of a device listing.
pub fn devices_text(devices: &[DeviceListing]) -> String {
	if devices.is_empty() {
		return "No paired devices.".to_string();
	}
	devices
		.iter()
		.map(|d| {
			let repair = if d.needs_repairing { "  (re-pair required)" } else { "" };
			format!("{:<8} {:<20} {:<12} {}{}", d.status.as_str(), d.name, d.model, d.id, repair)
		})
		.collect::<Vec<_>>()
		.join("\n")
}

/// NDJSON record for a bridge event.
pub fn event_record(event: &BridgeEvent) -> Value {
	serde_json::to_value(event).unwrap_or_else(|err| json!({ "event": "unserializable", "body": err.to_string() }))
}

/// NDJSON record for a listing snapshot.
pub fn devices_record(devices: &[DeviceListing]) -> Value {
	json!({ "devices": devices })
}

/// NDJSON record for a URL handed to the bridge.
pub fn url_record(url: &str, accepted: bool) -> Value {
	json!({ "openUrl": url, "accepted": accepted })
}

/// NDJSON record for a simulated callback nobody was subscribed to.
pub fn undelivered_record(step: &str, target: Option<&str>) -> Value {
	json!({ "undelivered": step, "deviceId": target })
}
