use std::path::Path;
use std::path::PathBuf;
use std::process;

use babel_cli::BabelCli;
use babel_cli::Commands;
use babel_core::BabelError;
use babel_core::BindingEntry;
use babel_core::DryRunSplicer;
use babel_core::FileSplicer;
use babel_core::Grammar;
use babel_core::LookupTables;
use babel_core::NO_BINDINGS;
use babel_core::RenderMode;
use babel_core::Rendered;
use babel_core::Replacement;
use babel_core::SortKey;
use babel_core::SpliceReport;
use babel_core::Splicer;
use babel_core::config::BabelConfig;
use babel_core::expand_program;
use babel_core::filter_by_program;
use babel_core::format_row;
use babel_core::project::ScanOptions;
use babel_core::project::parse_files;
use babel_core::project::resolve_files;
use babel_core::render;
use babel_core::table_footer;
use babel_core::table_header;
use babel_core::table_rows;
use clap::CommandFactory;
use clap::Parser;
use clap::error::ErrorKind;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,dimmed) => {
		if color_enabled() {
			format!("{}", $text.dimmed())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = BabelCli::parse();

	// Respect NO_COLOR env var, --no-color flag, and non-terminal output.
	let use_color = !args.no_color
		&& std::env::var_os("NO_COLOR").is_none()
		&& supports_color::on(supports_color::Stream::Stdout).is_some();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose, use_color);

	let result = match &args.command {
		Some(Commands::Display { render, sort }) => run_display(&args, *render, *sort),
		Some(Commands::Interpret) => run_interpret(&args),
		Some(Commands::Embed { target, dry_run }) => run_embed(&args, target, *dry_run),
		None => {
			eprintln!("No subcommand specified. Run `babel --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		match e.downcast::<BabelError>() {
			Ok(babel_err) => {
				let report: miette::Report = (*babel_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Log to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.without_time()
		.init();
}

fn resolve_root(args: &BabelCli) -> PathBuf {
	args.root
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Exits through clap when the command needs `--program` and none was
/// given.
fn required_program(args: &BabelCli) -> &str {
	match args.program.as_deref() {
		Some(program) if !program.is_empty() => program,
		_ => {
			BabelCli::command()
				.error(
					ErrorKind::MissingRequiredArgument,
					"this command requires `--program <PROGRAM>`",
				)
				.exit()
		}
	}
}

/// Everything read from disk before a command runs.
struct Session {
	entries: Vec<BindingEntry>,
	tables: LookupTables,
}

fn load_session(args: &BabelCli) -> Result<Session, Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config = BabelConfig::load(&root)?.unwrap_or_default();
	let options = ScanOptions::from_config(&config);

	let tables_dir = args.tables.clone().or_else(|| config.tables_dir(&root));
	tracing::debug!(
		root = %root.display(),
		tables = ?tables_dir,
		extension = %options.extension,
		"loading rules"
	);
	let tables = LookupTables::load(tables_dir.as_deref())?;

	let files = resolve_files(args.file.as_deref(), &root, &options)?;
	let entries = parse_files(&files)?;

	if args.verbose {
		eprintln!(
			"Read {} rule(s) from {} file(s)",
			entries.len(),
			files.len()
		);
	}

	Ok(Session { entries, tables })
}

fn run_display(
	args: &BabelCli,
	render_mode: RenderMode,
	sort: SortKey,
) -> Result<(), Box<dyn std::error::Error>> {
	let session = load_session(args)?;
	let pattern = args.program.as_deref().unwrap_or_default();
	let entries = render_mode.select(filter_by_program(&session.entries, pattern)?);
	let rows = table_rows(&entries, &session.tables, sort);

	if rows.is_empty() {
		println!("{NO_BINDINGS}");
		return Ok(());
	}

	let [top, titles, divider] = table_header();
	println!("{top}");
	println!("{}", colored!(titles, bold));
	println!("{divider}");

	for row in &rows {
		let line = format_row(row);
		if row.unbound {
			println!("{}", colored!(line, dimmed));
		} else {
			println!("{line}");
		}
	}

	println!("{}", table_footer());
	Ok(())
}

fn run_interpret(args: &BabelCli) -> Result<(), Box<dyn std::error::Error>> {
	let program = required_program(args);
	let session = load_session(args)?;

	for (index, name) in expand_program(program).into_iter().enumerate() {
		if index > 0 {
			println!();
		}

		match render(&session.entries, name, &session.tables)? {
			Rendered::Text(text) => print!("{text}"),
			Rendered::Replacements(replacements) => print_replacements(&replacements),
		}
	}

	Ok(())
}

fn run_embed(args: &BabelCli, target_path: &Path, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
	let program = required_program(args);
	if babel_core::target(program)?.grammar != Grammar::BindInjection {
		return Err(BabelError::UnsupportedTarget(program.to_string()).into());
	}
	if !target_path.is_file() {
		return Err(BabelError::MissingInput {
			path: target_path.display().to_string(),
		}
		.into());
	}

	let session = load_session(args)?;
	let Rendered::Replacements(replacements) = render(&session.entries, program, &session.tables)?
	else {
		return Err(BabelError::UnsupportedTarget(program.to_string()).into());
	};

	if replacements.is_empty() {
		println!("{NO_BINDINGS}");
		return Ok(());
	}

	if dry_run {
		print_replacements(&replacements);
		let original = std::fs::read_to_string(target_path)?;
		let report = DryRunSplicer.splice(target_path, &replacements)?;
		print_unmatched(&report);

		if report.changed {
			eprintln!("\nWould update {}:", target_path.display());
			print_diff(&original, &report.content);
		} else {
			println!("{} is already up to date.", target_path.display());
		}
		return Ok(());
	}

	let report = FileSplicer.splice(target_path, &replacements)?;
	print_unmatched(&report);

	if report.changed {
		println!(
			"{} {} ({} of {} replacement(s) applied)",
			colored!("Updated", green),
			target_path.display(),
			report.matched,
			replacements.len()
		);
	} else {
		println!("{} is already up to date.", target_path.display());
	}

	Ok(())
}

fn print_replacements(replacements: &[Replacement]) {
	for replacement in replacements {
		println!("{replacement}");
	}
}

fn print_unmatched(report: &SpliceReport) {
	for old in &report.unmatched {
		eprintln!(
			"{} no occurrence of `{old}` in the target file",
			colored!("warning:", yellow)
		);
	}
}

/// Print a unified diff between two strings, colorized.
fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
}
