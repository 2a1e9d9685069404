use std::collections::HashMap;

use crate::BindingEntry;
use crate::FormatOptions;
use crate::KeySeq;
use crate::LookupTable;
use crate::LookupTables;
use crate::ProgramAction;
use crate::project::parse_entries;

/// A rule file exercising every output target.
pub const RULES: &str = r#"{:des "editor bindings"
 :rules [:q-mode
   ; the ^ in this comment is not a rule
   ^{:doc/actions [{:program "micro" :name "Copy" :exec "[Copy]"}
                   {:program "helix-normal" :name "Yank" :exec "[yank_main_selection_to_clipboard]"}]}
   [:!OTf1 [:!Tc]]
   ^{:doc/actions [{:program "helix-normal" :name "Shell" :exec "[:sh echo hi]"}
                   {:program "broot" :name "Hidden" :exec "[:toggle_hidden]"}]}
   [:!Tpage_up [:!Tpage_up]]
   ^{:doc/actions [{:program "lazygit" :name "Push" :exec "[push]"}
                   {:program "zellij" :name "Lock" :exec "[SwitchToMode \"Locked\";]"}]}
   [:!Wp [:!Tp]]
   ^{:doc/actions []}
   [:!Sx :x]
   ^{:doc/actions [{:program "micro" :name "Paste" :exec "[Paste]" :sequence "v"}]}
   [:!Tv [:!Tv]]
 ]}
"#;

pub fn rules_entries() -> Vec<BindingEntry> {
	match parse_entries(RULES, "q", "rules.edn") {
		Ok(entries) => entries,
		Err(e) => panic!("fixture rules must parse: {e}"),
	}
}

pub fn builtin_tables() -> LookupTables {
	match LookupTables::builtin() {
		Ok(tables) => tables,
		Err(e) => panic!("builtin tables must parse: {e}"),
	}
}

pub fn key_seq(mode: &str, modifier: &str, key: &str) -> KeySeq {
	KeySeq {
		mode: mode.into(),
		modifier: modifier.into(),
		key: key.into(),
	}
}

pub fn action(program: &str, name: &str, command: &str) -> ProgramAction {
	ProgramAction {
		program: program.into(),
		action: name.into(),
		command: command.into(),
	}
}

pub fn entry(trigger: KeySeq, binding: KeySeq, actions: Vec<ProgramAction>) -> BindingEntry {
	BindingEntry {
		trigger,
		binding,
		actions,
		..BindingEntry::default()
	}
}

/// A table with only a `default` program, e.g. `[("O", "Alt")]`.
pub fn default_only_table(pairs: &[(&str, &str)], options: FormatOptions) -> LookupTable {
	let default = pairs
		.iter()
		.map(|(token, display)| ((*token).to_string(), (*display).to_string()))
		.collect();
	LookupTable::new(HashMap::from([("default".to_string(), default)]), options)
}
