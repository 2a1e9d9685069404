use std::path::PathBuf;

use babel_core::RenderMode;
use babel_core::SortKey;
use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Render program key bindings from annotated keyboard rule files.",
	long_about = "babel reads keyboard-remapping rule files written in EDN. Each rule may carry \
	              a `^{:doc/actions [...]}` metadata map naming the programs it drives, and \
	              babel turns those annotations into key binding configuration for the \
	              programs.\n\nQuick start:\n  babel display                    Print every \
	              binding as a table\n  babel interpret -p micro         Print a bindings.json \
	              fragment\n  babel embed -p zellij --target config.kdl\n                      \
	              Splice bind lines into an existing config"
)]
pub struct BabelCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Read a single rule file instead of scanning the root directory.
	#[arg(long, short, global = true)]
	pub file: Option<PathBuf>,

	/// Directory scanned for rule files and searched for `babel.toml`.
	#[arg(long, short = 'R', global = true)]
	pub root: Option<PathBuf>,

	/// Program name, matched as a regular expression against each action's
	/// program. Required by `interpret` and `embed`.
	#[arg(long, short, global = true)]
	pub program: Option<String>,

	/// Directory holding lookup table overrides. Takes precedence over
	/// `[tables] dir` in babel.toml.
	#[arg(long, global = true)]
	pub tables: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Print every binding as a table.
	///
	/// Each `(rule, action)` pair becomes one row with the program, the
	/// action name, the trigger key and the key sent to the program. Use
	/// `--program` to narrow the table to matching programs.
	Display {
		/// Which rules to show: `default` shows rules with actions, `empty`
		/// shows rules without any, `full` shows both. Unknown values fall
		/// back to `default`.
		#[arg(long, default_value_t = RenderMode::Default)]
		render: RenderMode,

		/// Column to sort rows by: `trigger`, `program`, `action` or
		/// `binding`.
		#[arg(long, default_value_t = SortKey::Trigger)]
		sort: SortKey,
	},
	/// Print the configuration fragment of one program.
	///
	/// `helix` prints the common, insert, normal and select fragments in
	/// turn. Bind-line programs such as `zellij` print their replacement
	/// pairs.
	Interpret,
	/// Splice bind lines for one program into an existing config file.
	///
	/// Every action's command text in the target file is replaced with the
	/// rendered bind line. The file is only rewritten when its content
	/// changes.
	Embed {
		/// The config file to update.
		#[arg(long, short)]
		target: PathBuf,

		/// Print the replacements and the resulting diff without writing
		/// the file.
		#[arg(long, default_value_t = false)]
		dry_run: bool,
	},
}
