use std::fmt::Display;
use std::str::FromStr;

use regex::Regex;

use crate::BabelError;
use crate::BabelResult;
use crate::binding::BindingEntry;

/// Narrow `entries` to the actions whose program matches `pattern`.
///
/// The pattern is an unanchored regular expression. Entries left with no
/// actions are dropped. An empty pattern returns every entry untouched,
/// including unbound ones.
pub fn filter_by_program(entries: &[BindingEntry], pattern: &str) -> BabelResult<Vec<BindingEntry>> {
	if pattern.is_empty() {
		return Ok(entries.to_vec());
	}

	let matcher = Regex::new(pattern).map_err(|e| {
		BabelError::InvalidProgramPattern {
			pattern: pattern.to_string(),
			reason: e.to_string(),
		}
	})?;

	let filtered = entries
		.iter()
		.filter_map(|entry| {
			let actions: Vec<_> = entry
				.actions
				.iter()
				.filter(|action| matcher.is_match(&action.program))
				.cloned()
				.collect();

			if actions.is_empty() {
				return None;
			}

			Some(BindingEntry {
				actions,
				..entry.clone()
			})
		})
		.collect();

	Ok(filtered)
}

/// Which entries the display table shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
	/// Entries with at least one meaningful action.
	#[default]
	Default,
	/// Only unbound entries.
	Empty,
	/// Everything.
	Full,
}

impl RenderMode {
	pub fn includes(self, entry: &BindingEntry) -> bool {
		match self {
			RenderMode::Default => !entry.is_unbound(),
			RenderMode::Empty => entry.is_unbound(),
			RenderMode::Full => true,
		}
	}

	/// Keep the entries this mode includes, in order.
	pub fn select(self, entries: Vec<BindingEntry>) -> Vec<BindingEntry> {
		entries
			.into_iter()
			.filter(|entry| self.includes(entry))
			.collect()
	}
}

/// Case-insensitive. Anything unrecognized is [`RenderMode::Default`].
impl FromStr for RenderMode {
	type Err = std::convert::Infallible;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		Ok(match value.to_ascii_uppercase().as_str() {
			"EMPTY" => RenderMode::Empty,
			"FULL" => RenderMode::Full,
			_ => RenderMode::Default,
		})
	}
}

impl Display for RenderMode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			RenderMode::Default => "default",
			RenderMode::Empty => "empty",
			RenderMode::Full => "full",
		};
		write!(f, "{name}")
	}
}
