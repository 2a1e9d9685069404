use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::BabelError;
use crate::BabelResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["babel.toml", ".babel.toml", ".config/babel.toml"];

/// Extension of rule files when none is configured.
pub const DEFAULT_EXTENSION: &str = "edn";

/// Configuration loaded from `babel.toml`.
///
/// ```toml
/// [scan]
/// extension = "edn"
/// exclude = ["drafts/"]
///
/// [tables]
/// dir = "tables"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BabelConfig {
	#[serde(default)]
	pub scan: ScanConfig,
	#[serde(default)]
	pub tables: TablesConfig,
}

/// Which files under the root are read as rule files.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
	/// File extension without the leading dot.
	#[serde(default = "default_extension")]
	pub extension: String,
	/// Gitignore-style patterns, relative to the root, of files and
	/// directories to skip.
	#[serde(default)]
	pub exclude: Vec<String>,
}

impl Default for ScanConfig {
	fn default() -> Self {
		Self {
			extension: default_extension(),
			exclude: Vec::new(),
		}
	}
}

fn default_extension() -> String {
	DEFAULT_EXTENSION.to_string()
}

/// Where lookup tables are read from.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TablesConfig {
	/// Directory holding `display_binding.toml`, `display_trigger.toml`,
	/// `interpret.toml` and `embed.toml`, relative to the root. Missing
	/// files fall back to the builtin tables.
	pub dir: Option<PathBuf>,
}

impl BabelConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if the file does not exist.
	pub fn load(root: &Path) -> BabelResult<Option<BabelConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		tracing::debug!(path = %config_path.display(), "loading config");
		let content = std::fs::read_to_string(&config_path)?;
		let config: BabelConfig =
			toml::from_str(&content).map_err(|e| BabelError::ConfigParse(e.to_string()))?;

		Ok(Some(config))
	}

	/// The configured tables directory resolved against `root`.
	pub fn tables_dir(&self, root: &Path) -> Option<PathBuf> {
		self.tables.dir.as_ref().map(|dir| root.join(dir))
	}
}
