//! `babel_core` is the core library for babel. It reads keyboard-remapping
//! rule files written in EDN, where each rule carries a metadata map naming
//! the programs it drives, and turns them into key binding configuration
//! for those programs.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Rule file
//!   -> Scanner (locates each ^{metadata}[rule] form in the raw text)
//!   -> Form decoder (decodes the metadata map and the rule vector)
//!   -> Binding builder (trigger, binding, actions, annotations -> BindingEntry)
//!   -> Program filter (keeps the actions of the requested programs)
//!   -> Key normalizer (OT + f1 -> Alt-Ctrl-F1, through per-program lookup tables)
//!   -> Renderer (TOML fragment, JSON map, verb list, or bind-line replacements)
//! ```
//!
//! ## Modules
//!
//! - [`scanner`] - Locates annotated rule forms without parsing the rest of
//!   the file.
//! - [`form`] - Decodes the EDN subset used by rule forms.
//! - [`binding`] - The binding data model and its construction from decoded
//!   forms.
//! - [`lookup`] - Lookup tables and key formatting.
//! - [`filter`] - Program filtering and the display render modes.
//! - [`render`] - The output targets and their grammars.
//! - [`display`] - The binding table printed by `babel display`.
//! - [`splice`] - Applying bind-line replacements to existing config files.
//! - [`project`] - Input file discovery and the per-file pipeline.
//! - [`config`] - Configuration loaded from `babel.toml`.
//!
//! ## Rule Files
//!
//! ```clojure
//! {:rules [:q-mode
//!   ^{:doc/actions [{:program "micro" :name "Copy" :exec "[Copy]"}]}
//!   [:!OTf1 [:!Tc]]]}
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use babel_core::LookupTables;
//! use babel_core::Rendered;
//! use babel_core::project::ScanOptions;
//! use babel_core::project::parse_files;
//! use babel_core::project::resolve_files;
//! use babel_core::render;
//!
//! let files = resolve_files(None, Path::new("."), &ScanOptions::default()).unwrap();
//! let entries = parse_files(&files).unwrap();
//! let tables = LookupTables::builtin().unwrap();
//!
//! if let Rendered::Text(text) = render(&entries, "micro", &tables).unwrap() {
//!     print!("{text}");
//! }
//! ```

pub use binding::*;
pub use display::*;
pub use error::*;
pub use filter::*;
pub use form::Form;
pub use form::FormMap;
pub use lookup::*;
pub use render::*;
pub use splice::*;

pub mod binding;
pub mod config;
pub mod display;
#[allow(unused_assignments)]
mod error;
pub mod filter;
pub mod form;
pub(crate) mod lexer;
pub mod lookup;
pub mod project;
pub mod render;
pub mod scanner;
pub mod splice;

#[cfg(test)]
mod __fixtures;
