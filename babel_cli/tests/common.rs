use std::path::Path;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

/// Rule file driving micro and zellij, plus one unbound rule.
pub const RULES: &str = r#"{:des "cli fixture"
 :rules [:q-mode
   ^{:doc/actions [{:program "micro" :name "Copy" :exec "[Copy]"}]}
   [:!Tc [:!Tc]]
   ^{:doc/actions [{:program "zellij" :name "Lock" :exec "[SwitchToMode \"Locked\";]"}]}
   [:!Wl [:!Tg]]
   ^{:doc/actions []}
   [:!Sx :x]
 ]}
"#;

pub fn babel_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("babel"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("RUST_LOG");
	cmd
}

/// Write [`RULES`] as `rules.edn` under `root`.
pub fn write_rules(root: &Path) -> std::io::Result<()> {
	std::fs::write(root.join("rules.edn"), RULES)
}
