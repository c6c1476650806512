//! Payload shaping for app messages.
//!
//! Inbound messages arrive in whatever shape the device app chose: a single
//! object, a list of objects, a list of mixed items, or a bare value. They are
//! decoded by matching on [`Value`] variants, with anything that is not an
//! object falling through to a `RAW` message carrying its text form.

use serde_json::{Map, Value, json};
use wearbridge_protocol::InboundMessage;
use wearbridge_protocol::constants::{
	KEY_MESSAGE_PAYLOAD, KEY_MESSAGE_TYPE, MESSAGE_TYPE_DATA, MESSAGE_TYPE_RAW, MESSAGE_TYPE_UNKNOWN,
};

const TYPE_KEYS: [&str; 2] = ["type", KEY_MESSAGE_TYPE];
const PAYLOAD_KEYS: [&str; 3] = ["payload", KEY_MESSAGE_PAYLOAD, "data"];

/// Normalizes an inbound delivery into one message per item.
///
/// `null` and empty lists yield nothing.
pub fn normalize(raw: &Value) -> Vec<InboundMessage> {
	match raw {
		Value::Null => Vec::new(),
		Value::Array(items) => items.iter().map(normalize_item).collect(),
		other => vec![normalize_item(other)],
	}
}

fn normalize_item(item: &Value) -> InboundMessage {
	match item {
		Value::Object(body) => from_object(body),
		other => InboundMessage::new(MESSAGE_TYPE_RAW, text_form(other)),
	}
}

fn from_object(body: &Map<String, Value>) -> InboundMessage {
	let kind = TYPE_KEYS
		.iter()
		.find_map(|key| body.get(*key).and_then(Value::as_str))
		.unwrap_or(MESSAGE_TYPE_UNKNOWN);

	let payload = PAYLOAD_KEYS
		.iter()
		.find_map(|key| body.get(*key).filter(|value| !value.is_null()))
		.map(text_form)
		.unwrap_or_default();

	InboundMessage::new(kind, payload)
}

/// Text form of a value: strings verbatim, containers as canonical JSON.
pub fn text_form(value: &Value) -> String {
	match value {
		Value::String(text) => text.clone(),
		Value::Object(_) | Value::Array(_) => canonical(value).to_string(),
		other => other.to_string(),
	}
}

/// Copy of `value` with object keys sorted at every level.
fn canonical(value: &Value) -> Value {
	match value {
		Value::Object(map) => {
			let mut entries: Vec<_> = map.iter().collect();
			entries.sort_by(|a, b| a.0.cmp(b.0));
			Value::Object(entries.into_iter().map(|(k, v)| (k.clone(), canonical(v))).collect())
		}
		Value::Array(items) => Value::Array(items.iter().map(canonical).collect()),
		other => other.clone(),
	}
}

/// Shapes a host-supplied payload for sending.
///
/// JSON objects go out as-is; anything else is wrapped as free text.
pub fn outbound_message(payload: &str) -> Value {
	match serde_json::from_str::<Value>(payload) {
		Ok(object @ Value::Object(_)) => object,
		_ => json!({
			"type": MESSAGE_TYPE_DATA,
			"payload": { "text": payload },
		}),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn one(raw: Value) -> InboundMessage {
		let mut messages = normalize(&raw);
		assert_eq!(messages.len(), 1, "{raw}");
		messages.remove(0)
	}

	#[test]
	fn bare_number_becomes_raw() {
		assert_eq!(one(json!(42)), InboundMessage::new("RAW", "42"));
		assert_eq!(one(json!("hello")), InboundMessage::new("RAW", "hello"));
		assert_eq!(one(json!(true)), InboundMessage::new("RAW", "true"));
	}

	#[test]
	fn object_payload_is_canonical_json() {
		let message = one(json!({"type": "CMD", "payload": {"z": 1, "a": [2, {"y": 3, "b": 4}]}}));
		assert_eq!(message.kind, "CMD");
		assert_eq!(message.payload, r#"{"a":[2,{"b":4,"y":3}],"z":1}"#);
	}

	#[test]
	fn fallback_keys_are_consulted_in_order() {
		let message = one(json!({"KEY_MESSAGE_TYPE": "ANGLE", "KEY_MESSAGE_PAYLOAD": 12.5}));
		assert_eq!(message, InboundMessage::new("ANGLE", "12.5"));

		let message = one(json!({"type": "T", "payload": null, "data": "fallback"}));
		assert_eq!(message.payload, "fallback");
	}

	#[test]
	fn non_string_type_counts_as_missing() {
		let message = one(json!({"type": 7, "payload": "x"}));
		assert_eq!(message.kind, "UNKNOWN");

		let message = one(json!({"type": 7, "KEY_MESSAGE_TYPE": "ALT"}));
		assert_eq!(message, InboundMessage::new("ALT", ""));
	}

	#[test]
	fn mixed_lists_yield_one_message_per_item() {
		let messages = normalize(&json!([{"type": "A", "payload": "1"}, 5, null, [1, 2], {}]));
		assert_eq!(
			messages,
			vec![
				InboundMessage::new("A", "1"),
				InboundMessage::new("RAW", "5"),
				InboundMessage::new("RAW", "null"),
				InboundMessage::new("RAW", "[1,2]"),
				InboundMessage::new("UNKNOWN", ""),
			]
		);
	}

	#[test]
	fn empty_input_yields_nothing() {
		assert!(normalize(&Value::Null).is_empty());
		assert!(normalize(&json!([])).is_empty());
	}

	#[test]
	fn outbound_objects_pass_through() {
		let sent = outbound_message(r#"{"type":"CMD","payload":{"x":1}}"#);
		assert_eq!(sent, json!({"type": "CMD", "payload": {"x": 1}}));
	}

	#[test]
	fn outbound_text_is_wrapped() {
		assert_eq!(
			outbound_message("start run"),
			json!({"type": "DATA", "payload": {"text": "start run"}})
		);
		assert_eq!(outbound_message("[1,2]"), json!({"type": "DATA", "payload": {"text": "[1,2]"}}));
		assert_eq!(outbound_message("42")["payload"]["text"], "42");
	}
}
