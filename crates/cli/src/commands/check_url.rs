use serde_json::json;
use wearbridge::Error;
use wearbridge::pairing::match_device_selection;

use crate::cli::CheckUrlArgs;
use crate::error::Result;
use crate::output::{self, OutputFormat};

/// Reports whether a URL would be accepted as a device-selection response.
///
/// A rejected URL is a normal answer, not a command failure.
pub fn execute(args: &CheckUrlArgs, format: OutputFormat) -> Result<()> {
	let reason = match match_device_selection(&args.url, &args.scheme) {
		Ok(_) => None,
		Err(Error::CallbackMismatch(reason)) => Some(reason),
		Err(err) => return Err(err.into()),
	};

	match format {
		OutputFormat::Json => output::print_json(&json!({
			"url": args.url,
			"scheme": args.scheme,
			"accepted": reason.is_none(),
			"reason": reason,
		}))?,
		OutputFormat::Text => match reason {
			None => println!("accepted: {}", args.url),
			Some(reason) => println!("rejected: {} ({reason})", args.url),
		},
	}
	Ok(())
}
