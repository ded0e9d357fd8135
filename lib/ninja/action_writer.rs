//! The writer for `action` and `action_foreach` targets.
//!
//! Each action target defines its own Ninja rule. The rule text is returned
//! separately from the target fragment: rules must appear in the toolchain
//! file ahead of the `include` lines that use them.

use super::target_writer::TargetWriter;
use crate::error::{Error, Result};
use crate::output_file::OutputFile;
use crate::substitution::{
	self, writer as substitution_writer, SubstitutionType,
};
use crate::target::{ActionValues, OutputType};
use raw_string::RawString;

/// Source-scope placeholders that need a per-edge variable definition;
/// `{{source}}` itself arrives as `$in`.
const PER_EDGE_SOURCE_TYPES: &[SubstitutionType] = &[
	SubstitutionType::SourceNamePart,
	SubstitutionType::SourceFilePart,
	SubstitutionType::SourceDir,
	SubstitutionType::SourceRootRelativeDir,
	SubstitutionType::SourceGenDir,
	SubstitutionType::SourceOutDir,
];

pub struct NinjaActionTargetWriter<'a> {
	base: TargetWriter<'a>,
}

impl<'a> NinjaActionTargetWriter<'a> {
	pub fn new(base: TargetWriter<'a>) -> NinjaActionTargetWriter<'a> {
		NinjaActionTargetWriter { base }
	}

	pub fn run(mut self) -> Result<(RawString, RawString)> {
		let target = self.base.target;
		let action = target.action.as_ref().ok_or_else(|| {
			Error::in_target(&target.label, "Action target without action values")
		})?;
		let script = action.script.as_ref().ok_or_else(|| {
			Error::in_target(&target.label, "Action target without a script")
		})?;
		self.check_substitutions(action)?;

		let rule_name = format!("{}{}", self.base.rule_prefix, rule_name_for_target(target));
		let mut rule = RawString::new();
		rule.push_str("rule ");
		rule.push_str(&*rule_name);
		rule.push_str("\n  command = ");
		rule.push_str(script.build_relative());
		for pattern in action.args.patterns() {
			rule.push_str(" ");
			write_pattern_for_action_rule(target, pattern, &mut rule);
		}
		rule.push_str("\n");
		if let Some(description) = &action.description {
			rule.push_str("  description = ");
			rule.push_str(&**description);
			rule.push_str("\n");
		}
		if let Some(depfile) = &action.depfile {
			rule.push_str("  depfile = ");
			write_pattern_for_action_rule(target, depfile, &mut rule);
			rule.push_str("\n");
		}

		let num_stamp_uses = target.sources.len().max(1);
		let order_only_deps = self.base.write_input_deps_stamp_and_get_dep(num_stamp_uses);

		let mut all_outputs: Vec<OutputFile> = Vec::new();
		let script_dep = OutputFile::from_source_file(script);
		match target.output_type {
			OutputType::Action => {
				let outputs = substitution_writer::apply_list_to_target(target, &action.outputs);
				let mut implicit: Vec<OutputFile> = vec![script_dep.clone()];
				implicit.extend(target.sources.iter().map(OutputFile::from_source_file));
				implicit.extend(target.inputs.iter().map(OutputFile::from_source_file));
				self.write_action_edge(&rule_name, &outputs, &[], &implicit, &order_only_deps, None);
				all_outputs.extend(outputs);
			}
			OutputType::ActionForEach => {
				let used: Vec<SubstitutionType> = {
					let mut used: Vec<SubstitutionType> = Vec::new();
					let depfile_types = action.depfile.iter().flat_map(|p| p.required_types());
					for ty in action.args.required_types().chain(depfile_types) {
						if PER_EDGE_SOURCE_TYPES.contains(&ty) && !used.contains(&ty) {
							used.push(ty);
						}
					}
					used
				};
				let mut implicit: Vec<OutputFile> = vec![script_dep.clone()];
				implicit.extend(target.inputs.iter().map(OutputFile::from_source_file));
				let sources = target.sources.clone();
				for source in &sources {
					let outputs =
						substitution_writer::apply_list_to_source(target, source, &action.outputs);
					self.write_action_edge(
						&rule_name,
						&outputs,
						&[source.clone()],
						&implicit,
						&order_only_deps,
						Some((&used, source)),
					);
					all_outputs.extend(outputs);
				}
			}
			_ => unreachable!("action writer on a non-action target"),
		}
		for output in &all_outputs {
			self.base
				.scheduler
				.add_generated_file(&target.label, output.clone());
		}

		self.base.out.push_str("\n");
		self.base.write_stamp_for_target(&all_outputs, &[]);
		Ok((self.base.finish(), rule))
	}

	fn write_action_edge(
		&mut self,
		rule_name: &str,
		outputs: &[OutputFile],
		sources: &[crate::source_file::SourceFile],
		implicit: &[OutputFile],
		order_only_deps: &[OutputFile],
		per_edge: Option<(&[SubstitutionType], &crate::source_file::SourceFile)>,
	) {
		self.base.out.push_str("build");
		self.base.path_output.write_output_files(&mut self.base.out, outputs);
		self.base.out.push_str(": ");
		self.base.out.push_str(rule_name);
		self.base.path_output.write_source_files(&mut self.base.out, sources);
		if !implicit.is_empty() {
			self.base.out.push_str(" |");
			self.base.path_output.write_output_files(&mut self.base.out, implicit);
		}
		if !order_only_deps.is_empty() {
			self.base.out.push_str(" ||");
			self.base
				.path_output
				.write_output_files(&mut self.base.out, order_only_deps);
		}
		self.base.out.push_str("\n");
		if let Some((used, source)) = per_edge {
			let target = self.base.target;
			for &ty in used {
				let value = substitution_writer::apply_pattern_to_source(
					target,
					source,
					&crate::substitution::SubstitutionPattern::parse(&format!(
						"{{{{{}}}}}",
						ty.name()
					))
					.expect("known substitution name"),
				);
				self.base.out.push_str("  ");
				self.base.out.push_str(ty.ninja_name());
				self.base.out.push_str(" = ");
				crate::escape::escape_to(
					&mut self.base.out,
					&value,
					crate::escape::EscapeMode::NinjaCommand,
				);
				self.base.out.push_str("\n");
			}
		}
	}

	fn check_substitutions(&self, action: &ActionValues) -> Result<()> {
		let target = self.base.target;
		let foreach = target.output_type == OutputType::ActionForEach;
		let valid = |ty: SubstitutionType, allow_source: bool| -> bool {
			substitution::is_valid_tool_substitution(ty)
				|| (allow_source && substitution::is_valid_copy_substitution(ty))
		};
		let depfile_types = action.depfile.iter().flat_map(|p| p.required_types());
		for ty in action.args.required_types().chain(depfile_types) {
			if !valid(ty, foreach) {
				return Err(Error::in_target(
					&target.label,
					format!("Action may not reference {{{{{}}}}} in its args", ty.name()),
				));
			}
		}
		for ty in action.outputs.required_types() {
			if ty == SubstitutionType::Output || !valid(ty, foreach) {
				return Err(Error::in_target(
					&target.label,
					format!("Action may not reference {{{{{}}}}} in its outputs", ty.name()),
				));
			}
		}
		Ok(())
	}
}

/// The rule is specific to one target, so target-scope placeholders expand
/// inline; only source-scope placeholders (and `{{source}}`/`{{output}}`,
/// which Ninja supplies as `$in`/`$out`) stay variables, defined per edge.
fn write_pattern_for_action_rule(
	target: &crate::target::Target,
	pattern: &crate::substitution::SubstitutionPattern,
	out: &mut RawString,
) {
	use crate::substitution::SubstitutionChunk;
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
				match substitution_writer::get_target_substitution(target, *ty) {
					Some(value) => out.push_str(&*value),
					None => {
						out.push_str("${");
						out.push_str(ty.ninja_name());
						out.push_str("}");
					}
				}
			}
		}
	}
}

/// The Ninja rule name for an action target: the label with separators
/// flattened, e.g. `//a/b:gen` becomes `a_b_gen__rule`.
pub fn rule_name_for_target(target: &crate::target::Target) -> String {
	let mut name = String::new();
	for c in target.label.dir().chars() {
		name.push(if c == '/' { '_' } else { c });
	}
	if !name.is_empty() {
		name.push('_');
	}
	name.push_str(target.label.name());
	name.push_str("__rule");
	name
}
