//! `kiln_core` is the engine behind the [kiln](https://github.com/kiln-rs/kiln) static site generator. It turns a folder of markdown, templates, and assets into a ready-to-serve site: front matter picks the layout, markdown becomes highlighted HTML, and minijinja stitches every page into its template with the site's data collections in scope.
//!
//! ## Build Pipeline
//!
//! ```text
//! content/*.md
//!   → front_matter (split the +++ YAML header from the body)
//!   → mask (hide {{ }} and {% %} spans behind placeholder tokens)
//!   → markdown (render to HTML, highlighting fenced code blocks)
//!   → mask (restore the hidden spans into the HTML)
//!   → compose (synthesize a child template extending the page's layout)
//!   → minijinja render against the data collections
//!   → output folder, source extension stripped
//! ```
//!
//! `.jinja` files in the content folder skip the markdown steps and render
//! directly; every other file is copied through untouched.
//!
//! ## Modules
//!
//! - [`config`] - Site configuration loaded from a YAML file: folder layout, code formatting, and data collections.
//! - [`front_matter`] - `+++` fenced YAML front matter extraction.
//! - [`mask`] - Hides template syntax from the markdown renderer and restores it afterwards.
//! - [`markdown`] - Markdown to HTML with syntax highlighted code blocks.
//! - [`compose`] - Wraps rendered pages in their layout templates.
//! - [`data`] - Front matter collections aggregated for every template render.
//! - [`build`] - The full site build, from content walk to written output.
//! - [`watch`] - Filesystem watchers that rebuild the site on change.
//! - [`serve`] - The local preview server.
//! - [`error`] - The crate's error and result types.
//!
//! ## Key Types
//!
//! - [`SiteConfig`] - Parsed configuration, with folder paths resolved against the config file's location.
//! - [`FrontMatter`] - One page's metadata, a string-keyed map of YAML values.
//! - [`MaskTable`] - The placeholder tokens protecting template syntax through a markdown render.
//! - [`MarkupRenderer`] - Markdown renderer with the bundled syntax and theme sets loaded.
//! - [`DataContext`] - Every configured data collection, keyed by collection name.
//! - [`WatchSession`] - A running pair of watchers rebuilding the site on change.
//! - [`KilnError`] - Everything that can go wrong, as miette diagnostics.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use kiln_core::SiteConfig;
//! use kiln_core::build_site;
//!
//! let config = SiteConfig::load(Path::new("site.yaml")).unwrap();
//! build_site(&config).unwrap();
//! ```

pub use build::*;
pub use compose::*;
pub use config::*;
pub use data::*;
pub use error::*;
pub use front_matter::*;
pub use markdown::*;
pub use mask::*;
pub use serve::*;
pub use watch::*;

pub mod build;
pub mod compose;
pub mod config;
pub mod data;
pub mod error;
pub mod front_matter;
pub mod markdown;
pub mod mask;
pub mod serve;
pub mod watch;

#[cfg(test)]
mod __fixtures;
