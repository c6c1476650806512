//! Recognizing device-selection responses from the pairing flow.
//!
//! The vendor's pairing UI hands control back to the host by opening a URL on
//! the host's scheme. Hosts receive many URLs on that scheme, so a callback is
//! only accepted when it also looks like a device-selection response.

use url::Url;
use wearbridge_protocol::constants::{DEVICE_SELECT_RESPONSE, DEVICES_QUERY_HINT};
use wearbridge_runtime::{Error, Result};

/// Parses `raw` and checks that it is a device-selection response on `scheme`.
///
/// # Errors
///
/// Returns [`Error::CallbackMismatch`] describing why the URL was rejected.
pub fn match_device_selection(raw: &str, scheme: &str) -> Result<Url> {
	let url = Url::parse(raw).map_err(|err| Error::CallbackMismatch(format!("unparseable URL: {err}")))?;

	if !url.scheme().eq_ignore_ascii_case(scheme) {
		return Err(Error::CallbackMismatch(format!(
			"scheme {:?} does not match {:?}",
			url.scheme(),
			scheme
		)));
	}

	if !is_device_selection_response(&url) {
		return Err(Error::CallbackMismatch("not a device-selection response".into()));
	}

	Ok(url)
}

/// True if the URL's path or host names the device-selection response, or its
/// query carries a device list.
pub fn is_device_selection_response(url: &Url) -> bool {
	let by_path = url.path().trim_start_matches('/') == DEVICE_SELECT_RESPONSE;
	let by_host = url.host_str() == Some(DEVICE_SELECT_RESPONSE);
	let by_query = url.query().is_some_and(|query| query.contains(DEVICES_QUERY_HINT));
	by_path || by_host || by_query
}
