//! Well-known keys and message types shared with device-side apps.

/// Fallback key for the message type in inbound messages.
pub const KEY_MESSAGE_TYPE: &str = "KEY_MESSAGE_TYPE";

/// Fallback key for the message payload in inbound messages.
pub const KEY_MESSAGE_PAYLOAD: &str = "KEY_MESSAGE_PAYLOAD";

/// Type assigned to outbound free text wrapped by the gateway.
pub const MESSAGE_TYPE_DATA: &str = "DATA";

/// Type assigned to inbound items that have no type/payload shape.
pub const MESSAGE_TYPE_RAW: &str = "RAW";

/// Type assigned to inbound objects without a usable type field.
pub const MESSAGE_TYPE_UNKNOWN: &str = "UNKNOWN";

/// Storage key under which paired device records are persisted.
pub const DEVICES_LIST_KEY: &str = "devicesListKey";

/// Marker identifying a device-selection response from the pairing flow.
pub const DEVICE_SELECT_RESPONSE: &str = "device-select-resp";

/// Query fragment that also identifies a device-selection response.
pub const DEVICES_QUERY_HINT: &str = "devices";
