use std::collections::BTreeMap;

use serde::Serialize;

use crate::form::Form;
use crate::form::FormMap;

/// Metadata key holding the list of per-program actions.
pub const ACTIONS_KEY: &str = "doc/actions";
/// Separator between the modifier group and the key name in a rule keyword.
pub const GROUP_DELIMITER: &str = "#P";
/// Compact modifier codes: left/right command, control, option and shift.
pub const MODIFIER_ALPHABET: [char; 8] = ['C', 'T', 'O', 'S', 'Q', 'W', 'E', 'R'];

/// A single key chord reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeySeq {
	/// Optional context label, e.g. the layer a rule file belongs to.
	pub mode: String,
	/// Raw compact modifier codes, e.g. `OT`.
	pub modifier: String,
	/// Raw key token, e.g. `f1` or `page_up`.
	pub key: String,
}

impl KeySeq {
	/// Split a rule keyword such as `:!OT#Pf1` into modifier and key.
	///
	/// The leading `:` and `!` markers are dropped. Text containing `#P` is
	/// split there; otherwise the leading run of modifier codes is the
	/// modifier and the remainder is the key.
	pub fn parse(raw: &str, mode: impl Into<String>) -> Self {
		let stripped = raw.trim();
		let stripped = stripped.strip_prefix(':').unwrap_or(stripped);
		let stripped = stripped.strip_prefix('!').unwrap_or(stripped);

		let (modifier, key) = match stripped.split_once(GROUP_DELIMITER) {
			Some((modifier, key)) => (modifier, key),
			None => {
				let split = stripped
					.find(|c: char| !MODIFIER_ALPHABET.contains(&c))
					.unwrap_or(stripped.len());
				stripped.split_at(split)
			}
		};

		Self {
			mode: mode.into(),
			modifier: modifier.to_string(),
			key: key.to_string(),
		}
	}
}

/// One effect a binding produces in one target program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProgramAction {
	pub program: String,
	pub action: String,
	pub command: String,
}

impl ProgramAction {
	fn is_blank(&self) -> bool {
		self.program.trim().is_empty()
			&& self.action.trim().is_empty()
			&& self.command.trim().is_empty()
	}
}

/// A rule from the source file together with everything it binds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BindingEntry {
	/// The physical key event that starts the rule.
	pub trigger: KeySeq,
	/// The logical key combination the rule produces.
	pub binding: KeySeq,
	/// Literal override shown instead of the binding key when present.
	pub sequence: Option<String>,
	/// Per-program actions in source order.
	pub actions: Vec<ProgramAction>,
	/// Rule options from the fourth vector element, e.g. `alone -> [f13]`.
	pub annotations: BTreeMap<String, Vec<String>>,
}

impl BindingEntry {
	/// An entry is unbound when it has no actions, or only actions with no
	/// program, name, or command.
	pub fn is_unbound(&self) -> bool {
		self.actions.iter().all(ProgramAction::is_blank)
	}

	/// The key shown for the binding: the sequence override when non-empty,
	/// otherwise the structural binding key.
	pub fn display_key(&self) -> &str {
		match self.sequence.as_deref() {
			Some(sequence) if !sequence.is_empty() => sequence,
			_ => &self.binding.key,
		}
	}
}

/// Build a [`BindingEntry`] from a decoded rule vector and its metadata.
///
/// Returns `None` when the vector has fewer than two elements or does not
/// start with a keyword. Missing or malformed action metadata yields an
/// entry with no actions.
pub fn build_entry(vector: &[Form], metadata: &FormMap, mode: &str) -> Option<BindingEntry> {
	let [first, second, rest @ ..] = vector else {
		return None;
	};
	let trigger_name = first.as_keyword()?;

	let trigger = KeySeq::parse(trigger_name, mode);
	let binding = KeySeq::parse(&binding_text(second), "");
	let (actions, sequence) = collect_actions(metadata);
	let annotations = rest
		.get(1)
		.and_then(Form::as_map)
		.map(collect_annotations)
		.unwrap_or_default();

	Some(BindingEntry {
		trigger,
		binding,
		sequence,
		actions,
		annotations,
	})
}

/// Join the binding element into one raw string, dropping `:` and `!`
/// markers. A vector binding is joined with spaces.
fn binding_text(form: &Form) -> String {
	let joined = match form {
		Form::Vector(items) | Form::List(items) => {
			items
				.iter()
				.map(Form::text)
				.collect::<Vec<_>>()
				.join(" ")
		}
		other => other.text(),
	};

	joined.replace([':', '!'], "")
}

fn collect_actions(metadata: &FormMap) -> (Vec<ProgramAction>, Option<String>) {
	let Some(actions) = metadata.get(ACTIONS_KEY).and_then(Form::as_seq) else {
		return (Vec::new(), None);
	};

	let mut sequence = None;
	let mut out = Vec::with_capacity(actions.len());

	for action in actions {
		let Some(map) = action.as_map() else {
			continue;
		};
		let fetch = |key: &str| {
			map.get(key)
				.filter(|value| !matches!(value, Form::Nil))
				.map(Form::text)
		};

		if let Some(value) = fetch("sequence") {
			sequence = Some(value);
		}

		out.push(ProgramAction {
			program: fetch("program").unwrap_or_default(),
			action: fetch("action").or_else(|| fetch("name")).unwrap_or_default(),
			command: fetch("exec").unwrap_or_default(),
		});
	}

	(out, sequence)
}

fn collect_annotations(map: &FormMap) -> BTreeMap<String, Vec<String>> {
	map.iter()
		.map(|(key, value)| {
			let values = match value.as_seq() {
				Some(items) => items.iter().map(Form::text).collect(),
				None => vec![value.text()],
			};
			(key.clone(), values)
		})
		.collect()
}
