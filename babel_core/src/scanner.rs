/// The metadata sigil that introduces an annotated rule form.
pub const METADATA_SIGIL: u8 = b'^';

/// One `^{metadata}[vector]` occurrence located in raw source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEntry<'a> {
	/// The metadata map literal, braces included.
	pub metadata: &'a str,
	/// The rule vector literal, brackets included.
	pub vector: &'a str,
	/// Byte offset of the opening `{` of the metadata map.
	pub start: usize,
	/// Byte offset of the opening `[` of the vector.
	pub vector_start: usize,
	/// Byte offset just past the closing `]` of the vector.
	pub next: usize,
}

/// Find the next annotated rule form at or after `start`.
///
/// A sigil that is not followed (after whitespace) by a balanced map, or a
/// map that is not followed by a vector, is skipped and the search resumes
/// one byte past that sigil. An unbalanced map or vector reaching the end of
/// the text ends the scan.
pub fn find_entry(text: &str, start: usize) -> Option<RawEntry<'_>> {
	let bytes = text.as_bytes();
	let mut cursor = start;

	while cursor < bytes.len() {
		let sigil = cursor + bytes[cursor..].iter().position(|&b| b == METADATA_SIGIL)?;
		cursor = sigil + 1;

		let map_start = skip_whitespace(bytes, sigil + 1);
		if bytes.get(map_start) != Some(&b'{') {
			continue;
		}
		let map_end = balanced_end(bytes, map_start, b'{', b'}')?;

		let vector_start = skip_whitespace(bytes, map_end);
		if bytes.get(vector_start) != Some(&b'[') {
			continue;
		}
		let vector_end = balanced_end(bytes, vector_start, b'[', b']')?;

		return Some(RawEntry {
			metadata: &text[map_start..map_end],
			vector: &text[vector_start..vector_end],
			start: map_start,
			vector_start,
			next: vector_end,
		});
	}

	None
}

/// Collect every annotated rule form in `text`, in source order.
pub fn scan_entries(text: &str) -> Vec<RawEntry<'_>> {
	let mut entries = Vec::new();
	let mut cursor = 0;

	while let Some(entry) = find_entry(text, cursor) {
		cursor = entry.next;
		entries.push(entry);
	}

	entries
}

fn skip_whitespace(bytes: &[u8], mut index: usize) -> usize {
	while index < bytes.len() && bytes[index].is_ascii_whitespace() {
		index += 1;
	}
	index
}

/// Returns the offset just past the delimiter closing the one at `start`.
///
/// Only `open`/`close` affect the depth. String literals and `;` line
/// comments are stepped over so their contents cannot unbalance the count.
fn balanced_end(bytes: &[u8], start: usize, open: u8, close: u8) -> Option<usize> {
	let mut depth = 0usize;
	let mut index = start;

	while index < bytes.len() {
		match bytes[index] {
			b'"' => {
				index += 1;
				while index < bytes.len() && bytes[index] != b'"' {
					if bytes[index] == b'\\' {
						index += 1;
					}
					index += 1;
				}
			}
			b';' => {
				while index < bytes.len() && bytes[index] != b'\n' {
					index += 1;
				}
			}
			byte if byte == open => depth += 1,
			byte if byte == close => {
				depth -= 1;
				if depth == 0 {
					return Some(index + 1);
				}
			}
			_ => {}
		}
		index += 1;
	}

	None
}

/// Pre-computed line-start offsets for turning byte offsets into 1-indexed
/// line/column pairs with a binary search.
pub(crate) struct LineTable {
	line_starts: Vec<usize>,
}

impl LineTable {
	pub(crate) fn new(content: &str) -> Self {
		let mut line_starts = vec![0];
		for (i, byte) in content.bytes().enumerate() {
			if byte == b'\n' {
				line_starts.push(i + 1);
			}
		}
		Self { line_starts }
	}

	pub(crate) fn line_column(&self, offset: usize) -> (usize, usize) {
		let line_idx = match self.line_starts.binary_search(&offset) {
			Ok(exact) => exact,
			Err(insert) => insert.saturating_sub(1),
		};
		(line_idx + 1, offset - self.line_starts[line_idx] + 1)
	}
}
