use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	#[error("invalid configuration: {0}")]
	Config(String),

	#[error("script {path}: {message}")]
	Script { path: PathBuf, message: String },

	#[error("no platform data directory found; pass --store FILE")]
	NoDataDir,

	#[error("failed to read {path}")]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Bridge(#[from] wearbridge::Error),
}

impl CliError {
	/// Stable code printed alongside the message on stderr.
	pub fn code(&self) -> &'static str {
		match self {
			CliError::Config(_) => "INVALID_CONFIG",
			CliError::Script { .. } => "INVALID_SCRIPT",
			CliError::NoDataDir | CliError::Read { .. } | CliError::Io(_) => "IO_ERROR",
			CliError::Json(_) => "INVALID_JSON",
			CliError::Bridge(wearbridge::Error::NotInitialized) => "NOT_INITIALIZED",
			CliError::Bridge(wearbridge::Error::InvalidConfig(_)) => "INVALID_CONFIG",
			CliError::Bridge(_) => "BRIDGE_ERROR",
		}
	}

	pub(crate) fn script(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
		CliError::Script {
			path: path.into(),
			message: message.into(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn codes_classify_bridge_errors() {
		assert_eq!(CliError::from(wearbridge::Error::NotInitialized).code(), "NOT_INITIALIZED");
		assert_eq!(
			CliError::from(wearbridge::Error::InvalidConfig("appId".into())).code(),
			"INVALID_CONFIG"
		);
		assert_eq!(CliError::script("a.json", "bad step").to_string(), "script a.json: bad step");
	}
}
