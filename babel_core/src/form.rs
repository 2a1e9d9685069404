use std::borrow::Cow;
use std::fmt::Display;

use derive_more::Deref;
use float_cmp::approx_eq;
use snailquote::unescape;

use crate::DecodeError;
use crate::lexer::RawToken;
use crate::lexer::Spanned;
use crate::lexer::tokenize;

/// A decoded EDN value from the subset babel reads.
#[derive(Debug, Clone)]
pub enum Form {
	/// `nil`
	Nil,
	/// `true` | `false`
	Bool(bool),
	/// An integer, e.g. `42`
	Int(i64),
	/// A floating point number, e.g. `0.5`
	Float(f64),
	/// String content with escapes resolved.
	Str(String),
	/// A keyword, stored without its leading `:`.
	Keyword(String),
	/// Any other bare token, e.g. `helix`.
	Symbol(String),
	/// `[...]`
	Vector(Vec<Form>),
	/// `(...)`
	List(Vec<Form>),
	/// `{...}`
	Map(FormMap),
}

impl Eq for Form {}
impl PartialEq for Form {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Form::Nil, Form::Nil) => true,
			(Form::Bool(value), Form::Bool(other_value)) => value == other_value,
			(Form::Int(value), Form::Int(other_value)) => value == other_value,
			(Form::Float(value), Form::Float(other_value)) => {
				approx_eq!(f64, *value, *other_value, ulps = 2)
			}
			(Form::Str(value), Form::Str(other_value))
			| (Form::Keyword(value), Form::Keyword(other_value))
			| (Form::Symbol(value), Form::Symbol(other_value)) => value == other_value,
			(Form::Vector(items), Form::Vector(other_items))
			| (Form::List(items), Form::List(other_items)) => items == other_items,
			(Form::Map(map), Form::Map(other_map)) => map == other_map,
			_ => false,
		}
	}
}

impl Form {
	pub fn as_keyword(&self) -> Option<&str> {
		match self {
			Form::Keyword(name) => Some(name),
			_ => None,
		}
	}

	/// The elements of a vector or list.
	pub fn as_seq(&self) -> Option<&[Form]> {
		match self {
			Form::Vector(items) | Form::List(items) => Some(items),
			_ => None,
		}
	}

	pub fn as_map(&self) -> Option<&FormMap> {
		match self {
			Form::Map(map) => Some(map),
			_ => None,
		}
	}

	/// Plain text of a value: string content, keyword and symbol names
	/// without sigils, and the canonical EDN text for everything else.
	pub fn text(&self) -> String {
		match self {
			Form::Str(value) | Form::Keyword(value) | Form::Symbol(value) => value.clone(),
			other => other.to_string(),
		}
	}
}

impl Display for Form {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Form::Nil => write!(f, "nil"),
			Form::Bool(value) => write!(f, "{value}"),
			Form::Int(value) => write!(f, "{value}"),
			Form::Float(value) => write!(f, "{value:?}"),
			Form::Str(value) => write!(f, "{value:?}"),
			Form::Keyword(name) => write!(f, ":{name}"),
			Form::Symbol(name) => write!(f, "{name}"),
			Form::Vector(items) => write_seq(f, "[", items, "]"),
			Form::List(items) => write_seq(f, "(", items, ")"),
			Form::Map(map) => {
				write!(f, "{{")?;
				for (index, (key, value)) in map.iter().enumerate() {
					if index > 0 {
						write!(f, " ")?;
					}
					write!(f, "{key} {value}")?;
				}
				write!(f, "}}")
			}
		}
	}
}

fn write_seq(
	f: &mut std::fmt::Formatter<'_>,
	open: &str,
	items: &[Form],
	close: &str,
) -> std::fmt::Result {
	write!(f, "{open}")?;
	for (index, item) in items.iter().enumerate() {
		if index > 0 {
			write!(f, " ")?;
		}
		write!(f, "{item}")?;
	}
	write!(f, "{close}")
}

/// An insertion-ordered map with string keys. Keys are the plain text of
/// the decoded key form (see [`Form::text`]); a repeated key keeps its
/// first position and takes the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct FormMap(Vec<(String, Form)>);

impl FormMap {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, key: impl Into<String>, value: Form) {
		let key = key.into();
		if let Some(slot) = self.0.iter_mut().find(|(existing, _)| *existing == key) {
			slot.1 = value;
		} else {
			self.0.push((key, value));
		}
	}

	pub fn get(&self, key: &str) -> Option<&Form> {
		self.0
			.iter()
			.find(|(existing, _)| existing == key)
			.map(|(_, value)| value)
	}
}

impl FromIterator<(String, Form)> for FormMap {
	fn from_iter<T: IntoIterator<Item = (String, Form)>>(iter: T) -> Self {
		let mut map = FormMap::new();
		for (key, value) in iter {
			map.insert(key, value);
		}
		map
	}
}

/// Decode a single form, rejecting anything left over after it.
pub fn decode(text: &str) -> Result<Form, DecodeError> {
	let tokens = tokenize(text)?;
	let mut reader = Reader {
		source: text,
		tokens: &tokens,
		cursor: 0,
	};
	let form = reader.read_form()?;

	if let Some((_, span)) = reader.tokens.get(reader.cursor) {
		return Err(DecodeError::TrailingInput(span.start));
	}

	Ok(form)
}

/// Decode a metadata map literal such as `{:doc/actions [...]}`.
pub fn decode_map(text: &str) -> Result<FormMap, DecodeError> {
	match decode(text)? {
		Form::Map(map) => Ok(map),
		_ => Err(DecodeError::NotAMap),
	}
}

/// Decode a rule vector literal such as `[:!Tf1 [:!Tpage_up]]`.
pub fn decode_vector(text: &str) -> Result<Vec<Form>, DecodeError> {
	match decode(text)? {
		Form::Vector(items) => Ok(items),
		_ => Err(DecodeError::NotAVector),
	}
}

/// Recursive-descent reader over the flat token stream.
struct Reader<'a> {
	source: &'a str,
	tokens: &'a [Spanned],
	cursor: usize,
}

impl Reader<'_> {
	fn next(&mut self) -> Option<&Spanned> {
		let token = self.tokens.get(self.cursor)?;
		self.cursor += 1;
		Some(token)
	}

	fn read_form(&mut self) -> Result<Form, DecodeError> {
		let source = self.source;
		let Some((token, span)) = self.next().cloned() else {
			return Err(DecodeError::UnexpectedEnd(']'));
		};
		let slice = &source[span.clone()];

		match token {
			RawToken::BracketOpen => self.read_seq(']').map(Form::Vector),
			RawToken::ParenOpen => self.read_seq(')').map(Form::List),
			RawToken::BraceOpen => self.read_map().map(Form::Map),
			RawToken::BraceClose => Err(unbalanced('}', span.start)),
			RawToken::BracketClose => Err(unbalanced(']', span.start)),
			RawToken::ParenClose => Err(unbalanced(')', span.start)),
			RawToken::String => read_string(slice),
			RawToken::Keyword => Ok(Form::Keyword(slice[1..].to_string())),
			RawToken::Number => read_number(slice),
			RawToken::Symbol => {
				Ok(match slice {
					"nil" => Form::Nil,
					"true" => Form::Bool(true),
					"false" => Form::Bool(false),
					_ => Form::Symbol(slice.to_string()),
				})
			}
		}
	}

	fn is_at(&self, close: RawToken) -> bool {
		matches!(self.tokens.get(self.cursor), Some((token, _)) if *token == close)
	}

	fn read_seq(&mut self, close: char) -> Result<Vec<Form>, DecodeError> {
		let close_token = closing_token(close);
		let mut items = Vec::new();

		loop {
			if self.cursor >= self.tokens.len() {
				return Err(DecodeError::UnexpectedEnd(close));
			}
			if self.is_at(close_token) {
				self.cursor += 1;
				return Ok(items);
			}
			items.push(self.read_form()?);
		}
	}

	fn read_map(&mut self) -> Result<FormMap, DecodeError> {
		let mut map = FormMap::new();

		loop {
			if self.cursor >= self.tokens.len() {
				return Err(DecodeError::UnexpectedEnd('}'));
			}
			if self.is_at(RawToken::BraceClose) {
				self.cursor += 1;
				return Ok(map);
			}

			let key = self.read_form()?;
			if self.is_at(RawToken::BraceClose) {
				return Err(DecodeError::OddMapEntries);
			}
			if self.cursor >= self.tokens.len() {
				return Err(DecodeError::UnexpectedEnd('}'));
			}
			let value = self.read_form()?;
			map.insert(key.text(), value);
		}
	}
}

fn closing_token(close: char) -> RawToken {
	match close {
		')' => RawToken::ParenClose,
		'}' => RawToken::BraceClose,
		_ => RawToken::BracketClose,
	}
}

fn unbalanced(found: char, offset: usize) -> DecodeError {
	DecodeError::UnbalancedDelimiter { found, offset }
}

fn read_string(slice: &str) -> Result<Form, DecodeError> {
	let inner = &slice[1..slice.len() - 1];
	if !inner.contains('\\') {
		return Ok(Form::Str(inner.to_string()));
	}

	unescape(&brace_unicode_escapes(slice))
		.map(Form::Str)
		.map_err(|_| DecodeError::InvalidEscape(inner.to_string()))
}

/// Rewrite EDN `\uXXXX` escapes into the `\u{XXXX}` form `unescape` reads.
fn brace_unicode_escapes(slice: &str) -> Cow<'_, str> {
	if !slice.contains("\\u") {
		return Cow::Borrowed(slice);
	}

	let mut output = String::with_capacity(slice.len() + 8);
	let mut chars = slice.chars();

	while let Some(c) = chars.next() {
		if c != '\\' {
			output.push(c);
			continue;
		}

		match chars.next() {
			Some('u') => {
				let rest = chars.as_str();
				match rest.get(..4).filter(|digits| digits.bytes().all(|b| b.is_ascii_hexdigit())) {
					Some(digits) => {
						output.push_str("\\u{");
						output.push_str(digits);
						output.push('}');
						chars = rest[4..].chars();
					}
					None => output.push_str("\\u"),
				}
			}
			Some(escaped) => {
				output.push('\\');
				output.push(escaped);
			}
			None => output.push('\\'),
		}
	}

	Cow::Owned(output)
}

fn read_number(slice: &str) -> Result<Form, DecodeError> {
	let is_float = slice.contains('.') || slice.contains('e') || slice.contains('E');

	if is_float {
		slice
			.parse::<f64>()
			.map(Form::Float)
			.map_err(|_| DecodeError::InvalidNumber(slice.to_string()))
	} else {
		slice
			.parse::<i64>()
			.map(Form::Int)
			.map_err(|_| DecodeError::InvalidNumber(slice.to_string()))
	}
}
