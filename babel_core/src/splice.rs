use std::fmt::Display;
use std::ops::Range;
use std::path::Path;

use serde::Serialize;

use crate::BabelResult;

/// One literal-text substitution to apply to an existing config file.
///
/// `new` carries double quotes escaped as `\"`, the form used when the pair
/// is passed on a command line as `--replace old="new"`. Splicers unescape
/// it before writing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Replacement {
	pub old: String,
	pub new: String,
}

impl Replacement {
	/// Build a replacement from an unescaped `new` line.
	pub fn new(old: impl Into<String>, new: &str) -> Self {
		Self {
			old: old.into(),
			new: new.replace('"', "\\\""),
		}
	}

	/// The text written into the file.
	pub fn unescaped_new(&self) -> String {
		self.new.replace("\\\"", "\"")
	}
}

impl Display for Replacement {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "--replace {}=\"{}\"", self.old, self.new)
	}
}

/// Outcome of splicing a set of replacements into one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpliceReport {
	/// Replacements whose `old` text occurred at least once.
	pub matched: usize,
	/// The `old` text of every replacement that found nothing to replace.
	pub unmatched: Vec<String>,
	/// Whether the resulting content differs from the original.
	pub changed: bool,
	/// The content after every replacement was applied.
	pub content: String,
}

/// Applies literal-string replacements to a file.
pub trait Splicer {
	fn splice(&self, path: &Path, replacements: &[Replacement]) -> BabelResult<SpliceReport>;
}

/// Rewrites the file in place, and only when its content changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSplicer;

impl Splicer for FileSplicer {
	fn splice(&self, path: &Path, replacements: &[Replacement]) -> BabelResult<SpliceReport> {
		let original = std::fs::read_to_string(path)?;
		let report = apply_replacements(&original, replacements);

		if report.changed {
			tracing::debug!(path = %path.display(), matched = report.matched, "writing spliced file");
			std::fs::write(path, &report.content)?;
		}

		Ok(report)
	}
}

/// Computes the spliced content without touching the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunSplicer;

impl Splicer for DryRunSplicer {
	fn splice(&self, path: &Path, replacements: &[Replacement]) -> BabelResult<SpliceReport> {
		let original = std::fs::read_to_string(path)?;
		Ok(apply_replacements(&original, replacements))
	}
}

/// Apply each replacement in order, replacing every literal occurrence.
///
/// An occurrence of `old` that lies inside text already equal to the new
/// line is left alone, so splicing the same replacements twice is a no-op.
pub fn apply_replacements(content: &str, replacements: &[Replacement]) -> SpliceReport {
	let mut current = content.to_string();
	let mut matched = 0;
	let mut unmatched = Vec::new();

	for replacement in replacements {
		if replacement.old.is_empty() || !current.contains(&replacement.old) {
			tracing::warn!(old = %replacement.old, "replacement matched nothing");
			unmatched.push(replacement.old.clone());
			continue;
		}

		matched += 1;
		let new = replacement.unescaped_new();
		let (spliced, replaced) = replace_unspliced(&current, &replacement.old, &new);
		if replaced == 0 {
			tracing::debug!(old = %replacement.old, "replacement already applied");
			continue;
		}
		current = spliced;
	}

	SpliceReport {
		matched,
		unmatched,
		changed: current != content,
		content: current,
	}
}

/// Replace each occurrence of `old` not contained in an occurrence of
/// `new`. Returns the text and the number of replacements made.
fn replace_unspliced(content: &str, old: &str, new: &str) -> (String, usize) {
	let spliced: Vec<Range<usize>> = if new.is_empty() {
		Vec::new()
	} else {
		content
			.match_indices(new)
			.map(|(start, text)| start..start + text.len())
			.collect()
	};

	let mut output = String::with_capacity(content.len());
	let mut last = 0;
	let mut replaced = 0;

	for (start, text) in content.match_indices(old) {
		let end = start + text.len();
		if spliced.iter().any(|range| range.start <= start && end <= range.end) {
			continue;
		}

		output.push_str(&content[last..start]);
		output.push_str(new);
		last = end;
		replaced += 1;
	}

	output.push_str(&content[last..]);
	(output, replaced)
}
