//! Expansion of patterns into strings, file names and Ninja rule text.
//!
//! Expansion never escapes: results are plain strings, and the emission site
//! that writes them picks the escape mode for its context.

use super::{SubstitutionChunk, SubstitutionList, SubstitutionPattern, SubstitutionType};
use crate::output_file::OutputFile;
use crate::path_util;
use crate::source_file::SourceFile;
use crate::target::Target;
use crate::tool::Tool;
use raw_string::RawString;

/// Write a pattern as the body of a Ninja rule variable: literal chunks with
/// `$` doubled, placeholders as `${var}` references for Ninja to resolve.
pub fn write_with_ninja_variables(pattern: &SubstitutionPattern, out: &mut RawString) {
	for chunk in pattern.chunks() {
		match chunk {
			SubstitutionChunk::Literal(s) => {
				for b in s.bytes() {
					if b == b'$' {
						out.push_str("$$");
					} else {
						out.push(b);
					}
				}
			}
			SubstitutionChunk::Placeholder(ty) => {
				out.push_str("${");
				out.push_str(ty.ninja_name());
				out.push_str("}");
			}
		}
	}
}

/// The value of a target-scope placeholder, or `None` if the placeholder
/// needs more context (a source or a tool).
pub fn get_target_substitution(target: &Target, ty: SubstitutionType) -> Option<String> {
	match ty {
		SubstitutionType::Label => Some(target.label.to_string()),
		SubstitutionType::LabelName => Some(target.label.name().to_string()),
		SubstitutionType::RootOutDir => Some(".".to_string()),
		SubstitutionType::TargetGenDir => Some(target.label.target_gen_dir()),
		SubstitutionType::TargetOutDir => Some(target.label.target_out_dir()),
		SubstitutionType::TargetOutputName => Some(target.output_name().to_string()),
		SubstitutionType::ModuleName => {
			target.swift.as_ref().map(|swift| swift.module_name.clone())
		}
		SubstitutionType::CrateName => {
			target.rust.as_ref().map(|rust| rust.crate_name.clone())
		}
		_ => None,
	}
}

fn source_substitution(target: &Target, source: &SourceFile, ty: SubstitutionType) -> Option<String> {
	let dir = source.source_dir();
	match ty {
		SubstitutionType::Source => Some(source.build_relative().to_string()),
		SubstitutionType::SourceNamePart => Some(source.name_part().to_string()),
		SubstitutionType::SourceFilePart => Some(source.file_part().to_string()),
		SubstitutionType::SourceDir | SubstitutionType::SourceRootRelativeDir => {
			Some(dir.to_string())
		}
		SubstitutionType::SourceGenDir => Some(if dir.is_empty() {
			"gen".to_string()
		} else {
			format!("gen/{}", dir)
		}),
		SubstitutionType::SourceOutDir => Some(if dir.is_empty() {
			"obj".to_string()
		} else {
			format!("obj/{}", dir)
		}),
		_ => get_target_substitution(target, ty),
	}
}

/// Expand a pattern binding the source-scope placeholders from `source`.
/// Placeholders outside the source and target scopes are a bug in the tool
/// validation and panic.
pub fn apply_pattern_to_source(
	target: &Target,
	source: &SourceFile,
	pattern: &SubstitutionPattern,
) -> String {
	expand(pattern, &mut |ty| source_substitution(target, source, ty))
}

pub fn apply_pattern_to_source_as_output_file(
	target: &Target,
	source: &SourceFile,
	pattern: &SubstitutionPattern,
) -> OutputFile {
	OutputFile::new(path_util::normalize(&apply_pattern_to_source(target, source, pattern)))
}

/// One output file per pattern in `list`, bound to `source`.
pub fn apply_list_to_source(
	target: &Target,
	source: &SourceFile,
	list: &SubstitutionList,
) -> Vec<OutputFile> {
	list.patterns()
		.iter()
		.map(|pattern| apply_pattern_to_source_as_output_file(target, source, pattern))
		.collect()
}

/// The value of a link-scope placeholder. Target overrides win over the
/// tool's defaults for the output directory and extension.
pub fn get_linker_substitution(target: &Target, tool: &Tool, ty: SubstitutionType) -> String {
	match ty {
		SubstitutionType::OutputExtension => match &target.output_extension {
			Some(ext) => ext.clone(),
			None => tool.default_output_extension.clone(),
		},
		SubstitutionType::OutputDir => {
			if let Some(dir) = &target.output_dir {
				return dir.clone();
			}
			match &tool.default_output_dir {
				Some(pattern) => expand(pattern, &mut |ty| get_target_substitution(target, ty)),
				None => ".".to_string(),
			}
		}
		SubstitutionType::TargetOutputName => {
			format!("{}{}", tool.output_prefix, target.output_name())
		}
		_ => get_target_substitution(target, ty).unwrap_or_else(|| {
			panic!("{{{{{}}}}} is not a linker substitution", ty.name())
		}),
	}
}

pub fn apply_pattern_to_linker(target: &Target, tool: &Tool, pattern: &SubstitutionPattern) -> String {
	expand(pattern, &mut |ty| Some(get_linker_substitution(target, tool, ty)))
}

pub fn apply_pattern_to_linker_as_output_file(
	target: &Target,
	tool: &Tool,
	pattern: &SubstitutionPattern,
) -> OutputFile {
	OutputFile::new(path_util::normalize(&apply_pattern_to_linker(target, tool, pattern)))
}

/// One output file per pattern in `list`, bound to the link-scope values.
pub fn apply_list_to_linker(target: &Target, tool: &Tool, list: &SubstitutionList) -> Vec<OutputFile> {
	list.patterns()
		.iter()
		.map(|pattern| apply_pattern_to_linker_as_output_file(target, tool, pattern))
		.collect()
}

/// Expand a list binding target-scope placeholders only, for action outputs.
pub fn apply_list_to_target(target: &Target, list: &SubstitutionList) -> Vec<OutputFile> {
	list.patterns()
		.iter()
		.map(|pattern| {
			let value = expand(pattern, &mut |ty| get_target_substitution(target, ty));
			OutputFile::new(path_util::normalize(&value))
		})
		.collect()
}

fn expand(
	pattern: &SubstitutionPattern,
	bind: &mut dyn FnMut(SubstitutionType) -> Option<String>,
) -> String {
	let mut out = String::new();
	for chunk in pattern.chunks() {
		match chunk {
			SubstitutionChunk::Literal(s) => out.push_str(s),
			SubstitutionChunk::Placeholder(ty) => match bind(*ty) {
				Some(value) => out.push_str(&value),
				None => panic!(
					"No binding for {{{{{}}}}} in \"{}\"",
					ty.name(),
					pattern.template()
				),
			},
		}
	}
	out
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::label::Label;
	use crate::target::OutputType;

	fn test_target() -> Target {
		let mut target = Target::new(
			Label::parse("//a:hello").unwrap(),
			OutputType::Executable,
			Label::parse("//tc:default").unwrap(),
		);
		target.sources.push(SourceFile::new("//a/hello.c"));
		target
	}

	#[test]
	fn source_bindings() {
		let target = test_target();
		let source = SourceFile::new("//a/hello.c");
		let pattern =
			SubstitutionPattern::parse("obj/{{source_root_relative_dir}}/{{label_name}}.{{source_name_part}}.o")
				.unwrap();
		assert_eq!(
			apply_pattern_to_source(&target, &source, &pattern),
			"obj/a/hello.hello.o"
		);
	}

	#[test]
	fn single_placeholder_round_trips() {
		let target = test_target();
		let source = SourceFile::new("//dir/name.cc");
		for (template, expected) in &[
			("{{source}}", "dir/name.cc"),
			("{{source_name_part}}", "name"),
			("{{source_file_part}}", "name.cc"),
			("{{source_dir}}", "dir"),
			("{{source_gen_dir}}", "gen/dir"),
			("{{source_out_dir}}", "obj/dir"),
			("{{label_name}}", "hello"),
			("{{target_out_dir}}", "obj/a"),
			("{{target_gen_dir}}", "gen/a"),
		] {
			let pattern = SubstitutionPattern::parse(template).unwrap();
			assert_eq!(&apply_pattern_to_source(&target, &source, &pattern), expected);
		}
	}

	#[test]
	fn linker_bindings_prefer_target_overrides() {
		let mut target = test_target();
		let mut tool = Tool::general(Tool::LINK);
		tool.default_output_extension = ".exe".to_string();
		tool.default_output_dir = Some(SubstitutionPattern::parse("{{root_out_dir}}").unwrap());

		assert_eq!(
			get_linker_substitution(&target, &tool, SubstitutionType::OutputExtension),
			".exe"
		);
		target.output_extension = Some(String::new());
		assert_eq!(
			get_linker_substitution(&target, &tool, SubstitutionType::OutputExtension),
			""
		);

		let pattern =
			SubstitutionPattern::parse("{{output_dir}}/{{target_output_name}}{{output_extension}}")
				.unwrap();
		assert_eq!(
			apply_pattern_to_linker_as_output_file(&target, &tool, &pattern).value(),
			"hello"
		);
	}

	#[test]
	fn ninja_variable_form() {
		let pattern = SubstitutionPattern::parse("clang -c {{source}} -o {{output}}").unwrap();
		let mut out = RawString::new();
		write_with_ninja_variables(&pattern, &mut out);
		assert_eq!(out, "clang -c ${in} -o ${out}");
	}
}
