use std::path::Path;
use std::path::PathBuf;

use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;

use crate::BabelError;
use crate::BabelResult;
use crate::binding::BindingEntry;
use crate::binding::build_entry;
use crate::config::BabelConfig;
use crate::config::DEFAULT_EXTENSION;
use crate::form::decode_map;
use crate::form::decode_vector;
use crate::scanner::LineTable;
use crate::scanner::RawEntry;
use crate::scanner::scan_entries;

/// Keyword introducing the rules vector of a rule file.
const RULES_KEYWORD: &str = ":rules";
/// How far past `:rules` the opening `[` of the rules vector may be.
const RULES_WINDOW: usize = 20;

/// Options controlling which files are read under a root directory.
#[derive(Debug, Clone)]
pub struct ScanOptions {
	/// Extension of rule files, without the leading dot.
	pub extension: String,
	/// Gitignore-style patterns of paths to skip.
	pub exclude: Vec<String>,
}

impl Default for ScanOptions {
	fn default() -> Self {
		Self {
			extension: DEFAULT_EXTENSION.to_string(),
			exclude: Vec::new(),
		}
	}
}

impl ScanOptions {
	pub fn from_config(config: &BabelConfig) -> Self {
		Self {
			extension: config.scan.extension.clone(),
			exclude: config.scan.exclude.clone(),
		}
	}
}

/// The rule files to read: the explicit `file` when given, otherwise every
/// file under `root` with the configured extension, sorted by path.
pub fn resolve_files(file: Option<&Path>, root: &Path, options: &ScanOptions) -> BabelResult<Vec<PathBuf>> {
	if let Some(file) = file {
		if !file.is_file() {
			return Err(BabelError::MissingInput {
				path: file.display().to_string(),
			});
		}
		return Ok(vec![file.to_path_buf()]);
	}

	if !root.is_dir() {
		return Err(BabelError::MissingInput {
			path: root.display().to_string(),
		});
	}

	let exclude = build_exclude_matcher(root, &options.exclude)?;
	let mut files = Vec::new();
	walk_dir(root, &options.extension, &exclude, &mut files)?;
	files.sort();

	if files.is_empty() {
		return Err(BabelError::NoInputFiles {
			root: root.display().to_string(),
			extension: options.extension.clone(),
		});
	}

	tracing::debug!(root = %root.display(), count = files.len(), "resolved rule files");
	Ok(files)
}

fn build_exclude_matcher(root: &Path, patterns: &[String]) -> BabelResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			BabelError::ConfigParse(format!("invalid exclude pattern `{pattern}`: {e}"))
		})?;
	}
	builder
		.build()
		.map_err(|e| BabelError::ConfigParse(format!("failed to build exclude rules: {e}")))
}

fn walk_dir(dir: &Path, extension: &str, exclude: &Gitignore, files: &mut Vec<PathBuf>) -> BabelResult<()> {
	for entry in std::fs::read_dir(dir)? {
		let path = entry?.path();

		if path
			.file_name()
			.and_then(|name| name.to_str())
			.is_some_and(|name| name.starts_with('.'))
		{
			continue;
		}

		let is_dir = path.is_dir();
		if exclude.matched(&path, is_dir).is_ignore() {
			continue;
		}

		if is_dir {
			walk_dir(&path, extension, exclude, files)?;
		} else if path.extension().is_some_and(|ext| ext == extension) {
			files.push(path);
		}
	}

	Ok(())
}

/// The mode label of a rule file, taken from a `:<label>-mode` keyword
/// opening its `:rules` vector, e.g. `q` for `:rules [:q-mode ...`.
/// Empty when the file has no such keyword.
pub fn extract_mode(text: &str) -> &str {
	let Some(rules_start) = text.find(RULES_KEYWORD) else {
		return "";
	};

	let mut window_end = (rules_start + RULES_WINDOW).min(text.len());
	while !text.is_char_boundary(window_end) {
		window_end -= 1;
	}
	let window = &text[rules_start..window_end];

	let Some(bracket) = window.find('[') else {
		return "";
	};
	let Some(keyword) = window[bracket + 1..].strip_prefix(':') else {
		return "";
	};
	let Some(dash) = keyword.find('-') else {
		return "";
	};

	let label = &keyword[..dash];
	if label.is_empty() || label.contains(|c: char| c.is_whitespace() || "[]{}".contains(c)) {
		return "";
	}

	label
}

/// Scan `text` for annotated rules and build their entries in source order.
///
/// A map or vector that fails to decode aborts with its position in the
/// text. Rules that decode but cannot form an entry are skipped.
pub fn parse_entries(text: &str, mode: &str, source_name: &str) -> BabelResult<Vec<BindingEntry>> {
	let lines = LineTable::new(text);
	let mut entries = Vec::new();

	for raw in scan_entries(text) {
		let decode_error = |offset: usize, reason| {
			let (line, column) = lines.line_column(offset);
			BabelError::Decode {
				source_name: source_name.to_string(),
				offset,
				line,
				column,
				reason,
			}
		};

		let RawEntry {
			metadata,
			vector,
			start,
			vector_start,
			..
		} = raw;
		let metadata = decode_map(metadata).map_err(|reason| decode_error(start, reason))?;
		let vector = decode_vector(vector).map_err(|reason| decode_error(vector_start, reason))?;

		match build_entry(&vector, &metadata, mode) {
			Some(entry) => entries.push(entry),
			None => tracing::trace!(offset = start, source_name, "skipping rule without trigger keyword"),
		}
	}

	Ok(entries)
}

/// Read one rule file and build its entries.
pub fn parse_file(path: &Path) -> BabelResult<Vec<BindingEntry>> {
	let text = std::fs::read_to_string(path)?;
	let mode = extract_mode(&text);
	let source_name = path.display().to_string();

	tracing::debug!(path = %source_name, mode, "parsing rule file");
	parse_entries(&text, mode, &source_name)
}

/// Read every rule file in order and concatenate their entries. The first
/// decode error aborts.
pub fn parse_files(paths: &[PathBuf]) -> BabelResult<Vec<BindingEntry>> {
	let mut entries = Vec::new();
	for path in paths {
		entries.extend(parse_file(path)?);
	}
	Ok(entries)
}
