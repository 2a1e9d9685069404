use std::ops::Range;

use logos::Logos;

use crate::DecodeError;

/// Flat tokens of the EDN subset read by the form decoder. Commas count as
/// whitespace and `;` starts a comment running to the end of the line.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip(r"([ \t\r\n\f,]+|;[^\n]*)", allow_greedy = true))]
pub(crate) enum RawToken {
	#[token("{")]
	BraceOpen,
	#[token("}")]
	BraceClose,
	#[token("[")]
	BracketOpen,
	#[token("]")]
	BracketClose,
	#[token("(")]
	ParenOpen,
	#[token(")")]
	ParenClose,
	#[regex(r#""([^"\\]|\\.)*""#)]
	String,
	#[regex(r#":[^ \t\r\n\f,\[\]{}()";]+"#)]
	Keyword,
	#[regex(r#"[+-]?[0-9][^ \t\r\n\f,\[\]{}()";]*"#, priority = 10)]
	Number,
	#[regex(r#"[^ \t\r\n\f,\[\]{}()";:0-9\\#^@`~'][^ \t\r\n\f,\[\]{}()";]*"#)]
	Symbol,
}

/// A token together with the byte span it covers in the decoded text.
pub(crate) type Spanned = (RawToken, Range<usize>);

/// Tokenize `source`, failing on the first byte sequence no token matches.
pub(crate) fn tokenize(source: &str) -> Result<Vec<Spanned>, DecodeError> {
	let mut tokens = Vec::new();

	for (result, span) in RawToken::lexer(source).spanned() {
		let Ok(token) = result else {
			let found = &source[span.clone()];
			if found.starts_with('"') {
				return Err(DecodeError::UnterminatedString(span.start));
			}
			return Err(DecodeError::UnexpectedCharacter {
				found: found.chars().next().map(String::from).unwrap_or_default(),
				offset: span.start,
			});
		};
		tokens.push((token, span));
	}

	Ok(tokens)
}
