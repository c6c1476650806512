use clap::Parser;
use wearbridge_cli::{cli::Cli, commands, logging};

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	if let Err(err) = commands::dispatch(cli).await {
		eprintln!("error[{}]: {err}", err.code());
		let mut source = std::error::Error::source(&err);
		while let Some(cause) = source {
			eprintln!("  caused by: {cause}");
			source = cause.source();
		}
		std::process::exit(1);
	}
}
