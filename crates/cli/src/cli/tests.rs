use std::path::PathBuf;

use clap::Parser;

use super::*;

#[test]
fn parse_devices_command() {
	let args = vec!["wearbridge", "devices", "--store", "/tmp/devices.json"];
	let cli = Cli::try_parse_from(args).unwrap();

	match cli.command {
		Commands::Devices(args) => {
			assert_eq!(args.store.store, Some(PathBuf::from("/tmp/devices.json")));
			assert_eq!(args.store.storage_key, None);
		}
		_ => panic!("Expected Devices command"),
	}
	assert_eq!(cli.format, OutputFormat::Json);
}

#[test]
fn parse_check_url_requires_scheme() {
	assert!(Cli::try_parse_from(["wearbridge", "check-url", "demo://device-select-resp"]).is_err());

	let cli = Cli::try_parse_from(["wearbridge", "check-url", "demo://device-select-resp", "--scheme", "demo"]).unwrap();
	match cli.command {
		Commands::CheckUrl(args) => {
			assert_eq!(args.url, "demo://device-select-resp");
			assert_eq!(args.scheme, "demo");
		}
		_ => panic!("Expected CheckUrl command"),
	}
}

#[test]
fn parse_simulate_with_globals() {
	let args = vec![
		"wearbridge",
		"-vv",
		"simulate",
		"scenario.json",
		"--storage-key",
		"paired",
		"-f",
		"text",
	];
	let cli = Cli::try_parse_from(args).unwrap();

	assert_eq!(cli.verbose, 2);
	assert_eq!(cli.format, OutputFormat::Text);
	match cli.command {
		Commands::Simulate(args) => {
			assert_eq!(args.script, PathBuf::from("scenario.json"));
			assert_eq!(args.store.storage_key.as_deref(), Some("paired"));
			assert!(args.config.is_none());
		}
		_ => panic!("Expected Simulate command"),
	}
}
