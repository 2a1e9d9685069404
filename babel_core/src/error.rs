use miette::Diagnostic;
use thiserror::Error;

/// Reasons a metadata map or rule vector failed to decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DecodeError {
	#[error("unterminated string starting at byte {0}")]
	UnterminatedString(usize),

	#[error("unexpected character `{found}` at byte {offset}")]
	UnexpectedCharacter { found: String, offset: usize },

	#[error("invalid number `{0}`")]
	InvalidNumber(String),

	#[error("invalid escape sequence in string `{0}`")]
	InvalidEscape(String),

	#[error("unbalanced `{found}` at byte {offset}")]
	UnbalancedDelimiter { found: char, offset: usize },

	#[error("unexpected end of input, expected `{0}`")]
	UnexpectedEnd(char),

	#[error("map literal has a key without a value")]
	OddMapEntries,

	#[error("expected a map literal")]
	NotAMap,

	#[error("expected a vector literal")]
	NotAVector,

	#[error("unexpected input after the form at byte {0}")]
	TrailingInput(usize),
}

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum BabelError {
	#[error(transparent)]
	#[diagnostic(code(babel::io_error))]
	Io(#[from] std::io::Error),

	#[error("input file not found: `{path}`")]
	#[diagnostic(
		code(babel::missing_input),
		help("pass an existing rule file with `--file` or a directory with `--root`")
	)]
	MissingInput { path: String },

	#[error("no `.{extension}` rule files found under `{root}`")]
	#[diagnostic(
		code(babel::no_input_files),
		help("check `--root`, or the `[scan]` section of babel.toml")
	)]
	NoInputFiles { root: String, extension: String },

	#[error("failed to decode rule at {line}:{column} in {source_name}: {reason}")]
	#[diagnostic(
		code(babel::decode),
		help("the `^{{…}}` metadata map and the `[…]` rule vector must be valid EDN")
	)]
	Decode {
		source_name: String,
		offset: usize,
		line: usize,
		column: usize,
		reason: DecodeError,
	},

	#[error("invalid program pattern `{pattern}`: {reason}")]
	#[diagnostic(code(babel::invalid_program_pattern))]
	InvalidProgramPattern { pattern: String, reason: String },

	#[error("unsupported target program: `{0}`")]
	#[diagnostic(
		code(babel::unsupported_target),
		help(
			"supported targets: helix, helix-common, helix-insert, helix-normal, helix-select, \
			 micro, broot, lazygit, zellij"
		)
	)]
	UnsupportedTarget(String),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(babel::config_parse),
		help("check that babel.toml is valid TOML with [scan] and/or [tables] sections")
	)]
	ConfigParse(String),

	#[error("failed to load lookup table `{path}`: {reason}")]
	#[diagnostic(
		code(babel::lookup_table),
		help("lookup tables map program names to tables of token = \"display\" pairs")
	)]
	LookupTable { path: String, reason: String },

	#[error("failed to render bind template for `{program}`: {reason}")]
	#[diagnostic(code(babel::template_render))]
	TemplateRender { program: String, reason: String },
}

pub type BabelResult<T> = Result<T, BabelError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
