use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Build static sites from markdown, templates, and data collections.",
	long_about = "kiln is a static site generator. It renders a content folder of markdown \
	              pages, jinja templates, and static assets into a complete site, wiring front \
	              matter through named template blocks and exposing glob-selected data \
	              collections to every page.\n\nQuick start:\n  kiln build --config site.yaml   \
	              Render the site once\n  kiln serve --config site.yaml   Preview with live \
	              rebuilds"
)]
pub struct KilnCli {
	#[command(subcommand)]
	pub command: Commands,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Render the site once and exit.
	///
	/// Wipes the output folder, aggregates the configured data collections,
	/// and renders every file under the content folder: markdown pages go
	/// through front matter extraction and their named template, `.jinja`
	/// files render directly, and everything else is copied through
	/// unchanged.
	Build {
		/// Path to the site configuration file.
		#[arg(long, short)]
		config: PathBuf,
	},
	/// Build the site, then serve it with live rebuilds.
	///
	/// Runs a full build, watches the content and template folders, and
	/// serves the output folder over HTTP on localhost. Edits trigger a
	/// debounced full rebuild; rewriting the configuration file restarts
	/// the watchers against the new folders. Stop with Ctrl-C.
	Serve {
		/// Path to the site configuration file.
		#[arg(long, short)]
		config: PathBuf,

		/// Port to bind on localhost.
		#[arg(long, short, default_value_t = 3456)]
		port: u16,
	},
}
