use crate::BabelError;
use crate::BabelResult;
use crate::binding::BindingEntry;
use crate::filter::filter_by_program;
use crate::lookup::LookupTable;
use crate::lookup::LookupTables;
use crate::lookup::TableKind;
use crate::lookup::normalize_program;
use crate::splice::Replacement;

/// Marks a command that is passed whole to a shell instead of being split
/// into list items.
pub const SHELL_ESCAPE_MARKER: &str = ":sh ";

/// The helix modes rendered for the bare `helix` program.
pub const HELIX_MODES: [&str; 4] = ["helix-common", "helix-insert", "helix-normal", "helix-select"];

/// Output grammar of a target program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
	/// `key = ["a","b"]` lines under static header lines.
	Flat,
	/// One JSON object with `"key": "value",` members.
	Json,
	/// An array of `{ key, execution }` objects.
	List,
	/// Replacement pairs for an existing config file.
	BindInjection,
}

/// Which key of an entry the target binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
	Trigger,
	/// The binding, or its sequence override.
	Binding,
}

/// A supported output program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
	pub name: &'static str,
	pub grammar: Grammar,
	pub key_source: KeySource,
	/// Lines emitted before the bindings.
	pub header: &'static [&'static str],
	/// Lines emitted after the bindings.
	pub footer: &'static [&'static str],
	/// minijinja template of one injected line, with `key` and `command` in
	/// scope.
	pub template: Option<&'static str>,
}

impl Target {
	const fn text(
		name: &'static str,
		grammar: Grammar,
		header: &'static [&'static str],
		footer: &'static [&'static str],
	) -> Self {
		Self {
			name,
			grammar,
			key_source: KeySource::Trigger,
			header,
			footer,
			template: None,
		}
	}

	const fn injection(name: &'static str, template: &'static str) -> Self {
		Self {
			name,
			grammar: Grammar::BindInjection,
			key_source: KeySource::Binding,
			header: &[],
			footer: &[],
			template: Some(template),
		}
	}

	/// The lookup table family used for this target's keys.
	pub fn table_kind(&self) -> TableKind {
		match self.grammar {
			Grammar::BindInjection => TableKind::Embed,
			Grammar::Flat | Grammar::Json | Grammar::List => TableKind::Interpret,
		}
	}
}

const TARGETS: &[Target] = &[
	Target::text("helix-common", Grammar::Flat, &["# mode: helix-common"], &[]),
	Target::text(
		"helix-insert",
		Grammar::Flat,
		&["# mode: helix-insert", "[keys.insert]"],
		&[],
	),
	Target::text(
		"helix-normal",
		Grammar::Flat,
		&["# mode: helix-normal", "[keys.normal]"],
		&[],
	),
	Target::text(
		"helix-select",
		Grammar::Flat,
		&["# mode: helix-select", "[keys.select]"],
		&[],
	),
	Target::text(
		"micro",
		Grammar::Json,
		&["// micro bindings.json, generated by babel", "{"],
		&["}"],
	),
	Target::text("broot", Grammar::List, &["verbs: ["], &["]"]),
	Target::injection("lazygit", "    {{ command }}: '<{{ key }}>'"),
	Target::injection("zellij", "bind \"{{ key }}\" { {{ command }} }"),
];

/// Every program name [`target`] accepts.
pub fn supported_targets() -> Vec<&'static str> {
	TARGETS.iter().map(|target| target.name).collect()
}

/// Resolve a program name to its target. Family variants such as
/// `zellij-locked` resolve to their family's target.
pub fn target(program: &str) -> BabelResult<&'static Target> {
	let normalized = normalize_program(program);

	TARGETS
		.iter()
		.find(|target| target.name == program)
		.or_else(|| TARGETS.iter().find(|target| target.name == normalized))
		.ok_or_else(|| BabelError::UnsupportedTarget(program.to_string()))
}

/// The programs rendered for one requested program: `helix` expands to its
/// modes, everything else renders as itself.
pub fn expand_program(program: &str) -> Vec<&str> {
	if program == "helix" {
		HELIX_MODES.to_vec()
	} else {
		vec![program]
	}
}

/// Insertion-ordered key to command mapping. A repeated key keeps its first
/// position and takes the last command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingMap(Vec<(String, String)>);

impl BindingMap {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, key: String, command: String) {
		match self.0.iter_mut().find(|(existing, _)| *existing == key) {
			Some(slot) => slot.1 = command,
			None => self.0.push((key, command)),
		}
	}

	pub fn get(&self, key: &str) -> Option<&str> {
		self.0
			.iter()
			.find(|(existing, _)| existing == key)
			.map(|(_, command)| command.as_str())
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(key, command)| (key.as_str(), command.as_str()))
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

/// Build the key to command mapping of every `(entry, action)` pair, with
/// keys formatted by `table`.
pub fn binding_map(entries: &[BindingEntry], table: &LookupTable, key_source: KeySource) -> BindingMap {
	let mut map = BindingMap::new();

	for entry in entries {
		for action in &entry.actions {
			let key = match key_source {
				KeySource::Trigger => table.format_key_seq(&entry.trigger, &action.program),
				KeySource::Binding => table.format_binding(entry, &action.program),
			};
			map.insert(key, action.command.clone());
		}
	}

	map
}

/// Rendered output of one program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
	Text(String),
	Replacements(Vec<Replacement>),
}

/// Render `entries` for `program`.
///
/// The program name also filters the entries, as a regular expression
/// matched against each action's program.
pub fn render(entries: &[BindingEntry], program: &str, tables: &LookupTables) -> BabelResult<Rendered> {
	let target = target(program)?;
	let filtered = filter_by_program(entries, program)?;
	let map = binding_map(&filtered, tables.get(target.table_kind()), target.key_source);

	tracing::debug!(program, bindings = map.len(), "rendering target");

	match target.grammar {
		Grammar::Flat => Ok(Rendered::Text(render_flat(target, &map))),
		Grammar::Json => Ok(Rendered::Text(render_json(target, &map))),
		Grammar::List => Ok(Rendered::Text(render_list(target, &map))),
		Grammar::BindInjection => render_injection(target, &map).map(Rendered::Replacements),
	}
}

/// Turn a bracketed command into a quoted list literal: `[a b]` becomes
/// `["a","b"]`. A shell command is kept whole as one quoted string.
pub fn list_literal(raw: &str) -> String {
	let trimmed = raw.trim();
	let inner = strip_brackets(trimmed);

	if inner.starts_with(SHELL_ESCAPE_MARKER) {
		return quote(trimmed);
	}

	let items: Vec<_> = inner.split_whitespace().map(quote).collect();
	format!("[{}]", items.join(","))
}

fn strip_brackets(value: &str) -> &str {
	let value = value.strip_prefix('[').unwrap_or(value);
	value.strip_suffix(']').unwrap_or(value)
}

fn quote(value: &str) -> String {
	serde_json::Value::String(value.to_string()).to_string()
}

/// TOML bare keys are limited to ASCII letters, digits, `-` and `_`.
fn toml_key(key: &str) -> String {
	let bare = !key.is_empty()
		&& key
			.bytes()
			.all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');

	if bare { key.to_string() } else { quote(key) }
}

fn with_frame(target: &Target, body: Vec<String>) -> String {
	let mut lines: Vec<String> = target.header.iter().map(ToString::to_string).collect();
	lines.extend(body);
	lines.extend(target.footer.iter().map(ToString::to_string));

	let mut output = lines.join("\n");
	output.push('\n');
	output
}

fn render_flat(target: &Target, map: &BindingMap) -> String {
	let body = map
		.iter()
		.map(|(key, command)| format!("{} = {}", toml_key(key), list_literal(command)))
		.collect();

	with_frame(target, body)
}

fn render_json(target: &Target, map: &BindingMap) -> String {
	let body = map
		.iter()
		.map(|(key, command)| {
			format!(
				"  {}: {},",
				quote(key),
				quote(command.trim().trim_matches(['[', ']']))
			)
		})
		.collect();

	with_frame(target, body)
}

/// broot reads a verb's `execution` as one command line, so values keep
/// their spaces and are never split into list literals. Only the enclosing
/// brackets are removed.
fn render_list(target: &Target, map: &BindingMap) -> String {
	let body = map
		.iter()
		.map(|(key, command)| {
			format!(
				"    {{ key: {}, execution: {} }}",
				quote(key),
				quote(command.trim().trim_matches(['[', ']']))
			)
		})
		.collect();

	with_frame(target, body)
}

fn render_injection(target: &Target, map: &BindingMap) -> BabelResult<Vec<Replacement>> {
	let template_error = |e: minijinja::Error| {
		BabelError::TemplateRender {
			program: target.name.to_string(),
			reason: e.to_string(),
		}
	};

	let mut env = minijinja::Environment::new();
	env.add_template(target.name, target.template.unwrap_or("{{ command }}"))
		.map_err(template_error)?;
	let template = env.get_template(target.name).map_err(template_error)?;

	map.iter()
		.map(|(key, command)| {
			let command = command.trim().trim_matches(['[', ']']);
			let line = template
				.render(minijinja::context! { key => key, command => command })
				.map_err(template_error)?;
			Ok(Replacement::new(command, &line))
		})
		.collect()
}
