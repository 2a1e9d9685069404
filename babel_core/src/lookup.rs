use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::BabelError;
use crate::BabelResult;
use crate::binding::BindingEntry;
use crate::binding::KeySeq;

/// Program entry used when a program, or a token within a program, has no
/// mapping of its own.
pub const DEFAULT_PROGRAM: &str = "default";

/// Program-name prefixes that collapse onto one family name.
const FAMILY_PREFIXES: &[(&str, &str)] = &[("zellij-", "zellij")];

/// Per-OS and per-mode helix variants sharing the `helix` tables.
const HELIX_VARIANTS: &[&str] = &[
	"helix-common",
	"helix-insert",
	"helix-normal",
	"helix-select",
	"macosx-helix-common",
	"macosx-helix-insert",
	"macosx-helix-normal",
	"macosx-helix-select",
	"ubuntu-helix-common",
	"ubuntu-helix-insert",
	"ubuntu-helix-normal",
	"ubuntu-helix-select",
];

/// Collapse a program identifier onto the name its lookup table is stored
/// under.
pub fn normalize_program(program: &str) -> &str {
	for (prefix, family) in FAMILY_PREFIXES {
		if program.starts_with(prefix) {
			return family;
		}
	}

	if HELIX_VARIANTS.contains(&program) {
		return "helix";
	}

	program
}

/// Rewrite function-key tokens such as `f12` as `F12`.
pub fn normalize_function_key(key: &str) -> Cow<'_, str> {
	let Some(digits) = key.strip_prefix(['f', 'F']) else {
		return Cow::Borrowed(key);
	};

	if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
		Cow::Owned(format!("F{digits}"))
	} else {
		Cow::Borrowed(key)
	}
}

/// How a non-empty mode label appears in a formatted key.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModeStyle {
	/// `(mode) Alt-F1`
	Parenthesized,
	/// `mode<separator>Alt-F1`
	Separated(String),
	/// The mode is left out.
	Hidden,
}

/// What happens to a modifier code with no mapping at any level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmappedModifier {
	Drop,
	PassThrough,
}

/// Formatting options attached to one lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
	/// Joins modifiers and the key. Programs may override it in the table
	/// file's `[separators]` section.
	pub separator: String,
	pub mode_style: ModeStyle,
	pub unmapped_modifier: UnmappedModifier,
}

impl Default for FormatOptions {
	fn default() -> Self {
		Self {
			separator: "-".to_string(),
			mode_style: ModeStyle::Parenthesized,
			unmapped_modifier: UnmappedModifier::PassThrough,
		}
	}
}

/// On-disk layout of a lookup table file.
#[derive(Debug, Default, Deserialize)]
struct TableFile {
	#[serde(default)]
	separators: HashMap<String, String>,
	#[serde(default)]
	modes: HashMap<String, String>,
	#[serde(flatten)]
	programs: HashMap<String, HashMap<String, String>>,
}

/// Program-name to token-to-display mappings with a `default` fallback
/// tier, plus the options used when formatting keys with them.
#[derive(Debug, Clone, Default)]
pub struct LookupTable {
	programs: HashMap<String, HashMap<String, String>>,
	separators: HashMap<String, String>,
	/// Per-program separator between the mode label and the chord.
	modes: HashMap<String, String>,
	options: FormatOptions,
}

impl LookupTable {
	pub fn new(programs: HashMap<String, HashMap<String, String>>, options: FormatOptions) -> Self {
		Self {
			programs,
			separators: HashMap::new(),
			modes: HashMap::new(),
			options,
		}
	}

	/// Parse a table from TOML text.
	///
	/// ```toml
	/// [separators]
	/// zellij = " "
	///
	/// [modes]
	/// helix = ":"
	///
	/// [default]
	/// T = "Ctrl"
	///
	/// [helix]
	/// T = "C"
	/// page_up = "pageup"
	/// ```
	pub fn from_toml(content: &str, options: FormatOptions) -> Result<Self, String> {
		let file: TableFile = toml::from_str(content).map_err(|e| e.to_string())?;
		Ok(Self {
			programs: file.programs,
			separators: file.separators,
			modes: file.modes,
			options,
		})
	}

	pub fn options(&self) -> &FormatOptions {
		&self.options
	}

	/// The separator used for `program`, after family normalization.
	pub fn separator(&self, program: &str) -> &str {
		self.separators
			.get(normalize_program(program))
			.unwrap_or(&self.options.separator)
	}

	/// Look a token up for `program`: the program's own table, then the
	/// `default` table.
	pub fn get(&self, program: &str, token: &str) -> Option<&str> {
		self.programs
			.get(normalize_program(program))
			.and_then(|table| table.get(token))
			.or_else(|| {
				self.programs
					.get(DEFAULT_PROGRAM)
					.and_then(|table| table.get(token))
			})
			.map(String::as_str)
	}

	/// Like [`LookupTable::get`] but falls back to the raw token.
	pub fn lookup<'a>(&'a self, program: &str, token: &'a str) -> &'a str {
		self.get(program, token).unwrap_or(token)
	}

	fn program_maps(&self, program: &str, token: &str) -> bool {
		self.programs
			.get(normalize_program(program))
			.is_some_and(|table| table.contains_key(token))
	}

	/// Translate every modifier code, in source order.
	fn modifiers(&self, modifier: &str, program: &str) -> Vec<String> {
		let mut parts = Vec::with_capacity(modifier.len());
		let mut buffer = [0u8; 4];

		for code in modifier.chars() {
			let code = code.encode_utf8(&mut buffer);
			match (self.get(program, code), self.options.unmapped_modifier) {
				(Some(mapped), _) => parts.push(mapped.to_string()),
				(None, UnmappedModifier::PassThrough) => parts.push(code.to_string()),
				(None, UnmappedModifier::Drop) => {}
			}
		}

		parts
	}

	/// Translate a key token. Function keys are upper-cased first unless the
	/// program maps the raw token itself.
	fn key(&self, key: &str, program: &str) -> String {
		if self.program_maps(program, key) {
			return self.lookup(program, key).to_string();
		}

		let key = normalize_function_key(key);
		self.lookup(program, &key).to_string()
	}

	fn join(&self, modifier: &str, key: &str, program: &str) -> String {
		let separator = self.separator(program);
		let mut parts = self.modifiers(modifier, program);
		if !key.is_empty() {
			parts.push(self.key(key, program));
		}
		parts.join(separator)
	}

	/// How the mode label is shown for `program`: its `[modes]` separator
	/// when the table has one, otherwise the table's mode style.
	pub fn mode_style(&self, program: &str) -> ModeStyle {
		match self.modes.get(normalize_program(program)) {
			Some(separator) => ModeStyle::Separated(separator.clone()),
			None => self.options.mode_style.clone(),
		}
	}

	/// Format a key chord for `program`, e.g. `OT` + `f1` as `Alt-Ctrl-F1`.
	pub fn format_key_seq(&self, seq: &KeySeq, program: &str) -> String {
		let combo = self.join(&seq.modifier, &seq.key, program);

		if seq.mode.is_empty() {
			return combo;
		}

		match self.mode_style(program) {
			ModeStyle::Parenthesized => format!("({}) {combo}", seq.mode),
			ModeStyle::Separated(separator) => format!("{}{separator}{combo}", seq.mode),
			ModeStyle::Hidden => combo,
		}
	}

	/// Format an entry's binding for `program`, using the sequence override
	/// in place of the binding key when one is present.
	pub fn format_binding(&self, entry: &BindingEntry, program: &str) -> String {
		self.join(&entry.binding.modifier, entry.display_key(), program)
	}
}

/// The lookup-table families, one file each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
	/// Binding column of the display table.
	DisplayBinding,
	/// Trigger column of the display table.
	DisplayTrigger,
	/// Keys of interpreted configuration fragments.
	Interpret,
	/// Keys of bind-injection lines.
	Embed,
}

impl TableKind {
	pub const ALL: [TableKind; 4] = [
		TableKind::DisplayBinding,
		TableKind::DisplayTrigger,
		TableKind::Interpret,
		TableKind::Embed,
	];

	pub fn file_name(self) -> &'static str {
		match self {
			TableKind::DisplayBinding => "display_binding.toml",
			TableKind::DisplayTrigger => "display_trigger.toml",
			TableKind::Interpret => "interpret.toml",
			TableKind::Embed => "embed.toml",
		}
	}

	fn builtin(self) -> &'static str {
		match self {
			TableKind::DisplayBinding => include_str!("../tables/display_binding.toml"),
			TableKind::DisplayTrigger => include_str!("../tables/display_trigger.toml"),
			TableKind::Interpret => include_str!("../tables/interpret.toml"),
			TableKind::Embed => include_str!("../tables/embed.toml"),
		}
	}

	pub fn default_options(self) -> FormatOptions {
		match self {
			TableKind::DisplayBinding | TableKind::DisplayTrigger => FormatOptions::default(),
			TableKind::Interpret => {
				FormatOptions {
					mode_style: ModeStyle::Hidden,
					unmapped_modifier: UnmappedModifier::Drop,
					..FormatOptions::default()
				}
			}
			TableKind::Embed => {
				FormatOptions {
					mode_style: ModeStyle::Hidden,
					..FormatOptions::default()
				}
			}
		}
	}
}

/// Every lookup table, loaded once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct LookupTables {
	display_binding: LookupTable,
	display_trigger: LookupTable,
	interpret: LookupTable,
	embed: LookupTable,
}

impl LookupTables {
	/// The tables compiled into the crate.
	pub fn builtin() -> BabelResult<Self> {
		Self::build(|kind| parse_table(kind, kind.builtin(), "<builtin>"))
	}

	/// Load tables from `dir`, using the builtin table for any file that is
	/// not present. Without a directory every table is builtin.
	pub fn load(dir: Option<&Path>) -> BabelResult<Self> {
		let Some(dir) = dir else {
			return Self::builtin();
		};

		Self::build(|kind| {
			let path = dir.join(kind.file_name());
			if !path.is_file() {
				tracing::debug!(table = kind.file_name(), "using builtin lookup table");
				return parse_table(kind, kind.builtin(), "<builtin>");
			}

			tracing::debug!(path = %path.display(), "loading lookup table");
			let content = std::fs::read_to_string(&path)?;
			parse_table(kind, &content, &path.display().to_string())
		})
	}

	fn build(mut load: impl FnMut(TableKind) -> BabelResult<LookupTable>) -> BabelResult<Self> {
		Ok(Self {
			display_binding: load(TableKind::DisplayBinding)?,
			display_trigger: load(TableKind::DisplayTrigger)?,
			interpret: load(TableKind::Interpret)?,
			embed: load(TableKind::Embed)?,
		})
	}

	/// Replace one table, e.g. with one built in memory.
	#[must_use]
	pub fn with_table(mut self, kind: TableKind, table: LookupTable) -> Self {
		*self.slot(kind) = table;
		self
	}

	fn slot(&mut self, kind: TableKind) -> &mut LookupTable {
		match kind {
			TableKind::DisplayBinding => &mut self.display_binding,
			TableKind::DisplayTrigger => &mut self.display_trigger,
			TableKind::Interpret => &mut self.interpret,
			TableKind::Embed => &mut self.embed,
		}
	}

	pub fn get(&self, kind: TableKind) -> &LookupTable {
		match kind {
			TableKind::DisplayBinding => &self.display_binding,
			TableKind::DisplayTrigger => &self.display_trigger,
			TableKind::Interpret => &self.interpret,
			TableKind::Embed => &self.embed,
		}
	}
}

fn parse_table(kind: TableKind, content: &str, path: &str) -> BabelResult<LookupTable> {
	LookupTable::from_toml(content, kind.default_options()).map_err(|reason| {
		BabelError::LookupTable {
			path: path.to_string(),
			reason,
		}
	})
}
