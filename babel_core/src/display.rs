use std::fmt::Display;
use std::str::FromStr;

use crate::binding::BindingEntry;
use crate::lookup::LookupTables;
use crate::lookup::TableKind;

pub const NO_BINDINGS: &str = "No bindings found.";

const PROGRAM_WIDTH: usize = 12;
const ACTION_WIDTH: usize = 30;
const TRIGGER_WIDTH: usize = 20;
const BINDING_WIDTH: usize = 20;

/// Column the display table is sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
	Program,
	Action,
	#[default]
	Trigger,
	Binding,
}

/// Case-insensitive. Anything unrecognized sorts by trigger.
impl FromStr for SortKey {
	type Err = std::convert::Infallible;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		Ok(match value.to_ascii_lowercase().as_str() {
			"program" => SortKey::Program,
			"action" => SortKey::Action,
			"binding" => SortKey::Binding,
			_ => SortKey::Trigger,
		})
	}
}

impl Display for SortKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			SortKey::Program => "program",
			SortKey::Action => "action",
			SortKey::Trigger => "trigger",
			SortKey::Binding => "binding",
		};
		write!(f, "{name}")
	}
}

/// One flattened `(entry, action)` row of the display table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
	pub program: String,
	pub action: String,
	pub trigger: String,
	pub binding: String,
	/// Set for rows of unbound entries.
	pub unbound: bool,
}

impl TableRow {
	fn column(&self, key: SortKey) -> &str {
		match key {
			SortKey::Program => &self.program,
			SortKey::Action => &self.action,
			SortKey::Trigger => &self.trigger,
			SortKey::Binding => &self.binding,
		}
	}
}

/// Flatten entries into table rows sorted stably by `sort`. An entry
/// without actions yields a single row with empty program and action.
pub fn table_rows(entries: &[BindingEntry], tables: &LookupTables, sort: SortKey) -> Vec<TableRow> {
	let triggers = tables.get(TableKind::DisplayTrigger);
	let bindings = tables.get(TableKind::DisplayBinding);
	let mut rows = Vec::new();

	for entry in entries {
		let unbound = entry.is_unbound();

		if entry.actions.is_empty() {
			rows.push(TableRow {
				trigger: triggers.format_key_seq(&entry.trigger, ""),
				binding: bindings.format_binding(entry, ""),
				unbound,
				..TableRow::default()
			});
			continue;
		}

		for action in &entry.actions {
			rows.push(TableRow {
				program: action.program.clone(),
				action: action.action.clone(),
				trigger: triggers.format_key_seq(&entry.trigger, &action.program),
				binding: bindings.format_binding(entry, &action.program),
				unbound,
			});
		}
	}

	rows.sort_by(|a, b| a.column(sort).cmp(b.column(sort)));
	rows
}

fn border() -> String {
	"=".repeat(PROGRAM_WIDTH + ACTION_WIDTH + TRIGGER_WIDTH + BINDING_WIDTH + 13)
}

fn divider() -> String {
	format!(
		"|{}|{}|{}|{}|",
		"-".repeat(PROGRAM_WIDTH + 2),
		"-".repeat(ACTION_WIDTH + 2),
		"-".repeat(TRIGGER_WIDTH + 2),
		"-".repeat(BINDING_WIDTH + 2),
	)
}

/// Pad to `width` characters. Padding counts characters, so arrow glyphs
/// take one column each.
fn pad(value: &str, width: usize) -> String {
	format!("{value:<width$}")
}

/// Format one row without styling.
pub fn format_row(row: &TableRow) -> String {
	format!(
		"| {} | {} | {} | {} |",
		pad(&row.program, PROGRAM_WIDTH),
		pad(&row.action, ACTION_WIDTH),
		pad(&row.trigger, TRIGGER_WIDTH),
		pad(&row.binding, BINDING_WIDTH),
	)
}

/// Header lines of the table: border, column titles, divider.
pub fn table_header() -> [String; 3] {
	[
		border(),
		format_row(&TableRow {
			program: "Program".into(),
			action: "Action".into(),
			trigger: "Trigger".into(),
			binding: "Binding".into(),
			unbound: false,
		}),
		divider(),
	]
}

pub fn table_footer() -> String {
	border()
}

/// Render the whole markdown table as plain text, or [`NO_BINDINGS`] when
/// there is nothing to show.
pub fn render_table(rows: &[TableRow]) -> String {
	if rows.is_empty() {
		return format!("{NO_BINDINGS}\n");
	}

	let mut lines: Vec<String> = table_header().into();
	lines.extend(rows.iter().map(format_row));
	lines.push(table_footer());

	let mut output = lines.join("\n");
	output.push('\n');
	output
}
