use std::path::Path;
use std::process;

use clap::Parser;
use kiln_cli::Commands;
use kiln_cli::KilnCli;
use kiln_core::KilnResult;
use tracing_subscriber::EnvFilter;

fn main() {
	let args = KilnCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_ansi(use_color)
		.init();

	let result = match args.command {
		Commands::Build { config } => kiln_core::build_from_config_file(&config),
		Commands::Serve { config, port } => run_serve(&config, port),
	};

	if let Err(error) = result {
		let report: miette::Report = error.into();
		eprintln!("{report:?}");
		process::exit(2);
	}
}

/// Build once, then hand the config to the preview server, which keeps the
/// output tree live until shutdown.
fn run_serve(config: &Path, port: u16) -> KilnResult<()> {
	kiln_core::build_from_config_file(config)?;
	kiln_core::serve_site(config, port)
}
