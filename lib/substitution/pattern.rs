//! Parsed `{{name}}` template strings.

use super::SubstitutionType;
use crate::error::{Error, Result};

/// One piece of a pattern: literal text or a placeholder reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubstitutionChunk {
	Literal(String),
	Placeholder(SubstitutionType),
}

/// An ordered sequence of literal chunks and placeholder references, parsed
/// from a template string such as `obj/{{source_name_part}}.o`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubstitutionPattern {
	chunks: Vec<SubstitutionChunk>,
}

impl SubstitutionPattern {
	pub fn parse(template: &str) -> Result<SubstitutionPattern> {
		let mut chunks = Vec::new();
		let mut rest = template;
		while let Some(open) = rest.find("{{") {
			if open > 0 {
				chunks.push(SubstitutionChunk::Literal(rest[..open].to_string()));
			}
			let after_open = &rest[open + 2..];
			let close = after_open.find("}}").ok_or_else(|| {
				Error::new(format!("Unterminated {{{{ in \"{}\"", template))
			})?;
			let name = &after_open[..close];
			let ty = SubstitutionType::from_name(name).ok_or_else(|| {
				Error::new(format!("Unknown substitution \"{}\" in \"{}\"", name, template))
			})?;
			chunks.push(SubstitutionChunk::Placeholder(ty));
			rest = &after_open[close + 2..];
		}
		if !rest.is_empty() {
			chunks.push(SubstitutionChunk::Literal(rest.to_string()));
		}
		Ok(SubstitutionPattern { chunks })
	}

	/// A pattern consisting of a single literal chunk.
	pub fn literal(text: impl Into<String>) -> SubstitutionPattern {
		SubstitutionPattern {
			chunks: vec![SubstitutionChunk::Literal(text.into())],
		}
	}

	pub fn chunks(&self) -> &[SubstitutionChunk] {
		&self.chunks
	}

	pub fn is_empty(&self) -> bool {
		self.chunks.is_empty()
	}

	/// The placeholders this pattern references, in order of appearance.
	pub fn required_types(&self) -> impl Iterator<Item = SubstitutionType> + '_ {
		self.chunks.iter().filter_map(|chunk| match chunk {
			SubstitutionChunk::Placeholder(ty) => Some(*ty),
			SubstitutionChunk::Literal(_) => None,
		})
	}

	/// Reassemble the template string, for diagnostics.
	pub fn template(&self) -> String {
		let mut out = String::new();
		for chunk in &self.chunks {
			match chunk {
				SubstitutionChunk::Literal(s) => out.push_str(s),
				SubstitutionChunk::Placeholder(ty) => {
					out.push_str("{{");
					out.push_str(ty.name());
					out.push_str("}}");
				}
			}
		}
		out
	}
}

/// An ordered sequence of patterns, e.g. a tool's `outputs` list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubstitutionList {
	patterns: Vec<SubstitutionPattern>,
}

impl SubstitutionList {
	pub fn parse(templates: &[&str]) -> Result<SubstitutionList> {
		let mut patterns = Vec::with_capacity(templates.len());
		for template in templates {
			patterns.push(SubstitutionPattern::parse(template)?);
		}
		Ok(SubstitutionList { patterns })
	}

	pub fn patterns(&self) -> &[SubstitutionPattern] {
		&self.patterns
	}

	pub fn is_empty(&self) -> bool {
		self.patterns.is_empty()
	}

	pub fn required_types(&self) -> impl Iterator<Item = SubstitutionType> + '_ {
		self.patterns.iter().flat_map(|p| p.required_types())
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::substitution::SubstitutionType::*;

	#[test]
	fn parse_pattern() {
		let pattern = SubstitutionPattern::parse("obj/{{source_name_part}}.o").unwrap();
		assert_eq!(
			pattern.chunks(),
			&[
				SubstitutionChunk::Literal("obj/".to_string()),
				SubstitutionChunk::Placeholder(SourceNamePart),
				SubstitutionChunk::Literal(".o".to_string()),
			]
		);
		assert_eq!(pattern.template(), "obj/{{source_name_part}}.o");
	}

	#[test]
	fn parse_errors() {
		assert!(SubstitutionPattern::parse("{{nope}}").is_err());
		assert!(SubstitutionPattern::parse("{{source").is_err());
	}

	#[test]
	fn required_types() {
		let list = SubstitutionList::parse(&["{{source}}", "-o {{output}}"]).unwrap();
		let types: Vec<_> = list.required_types().collect();
		assert_eq!(types, vec![Source, Output]);
	}
}
