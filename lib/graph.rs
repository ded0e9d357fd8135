//! The resolved build graph handed to emission.
//!
//! The graph owns every target and toolchain and is immutable while the
//! writers run. Targets refer to each other and to their toolchain by label;
//! all resolution goes through the lookup tables here.

use crate::error::{Error, Result};
use crate::label::Label;
use crate::output_file::OutputFile;
use crate::substitution::writer as substitution_writer;
use crate::target::{OutputType, Target};
use crate::toolchain::Toolchain;
use indexmap::IndexMap;

#[derive(Debug)]
pub struct BuildGraph {
	default_toolchain: Label,
	targets: IndexMap<Label, Target>,
	toolchains: IndexMap<Label, Toolchain>,
}

impl BuildGraph {
	pub fn new(default_toolchain: Label) -> BuildGraph {
		BuildGraph {
			default_toolchain,
			targets: IndexMap::new(),
			toolchains: IndexMap::new(),
		}
	}

	pub fn default_toolchain_label(&self) -> &Label {
		&self.default_toolchain
	}

	pub fn add_toolchain(&mut self, toolchain: Toolchain) {
		self.toolchains.insert(toolchain.label.clone(), toolchain);
	}

	pub fn add_target(&mut self, target: Target) {
		self.targets.insert(target.label.clone(), target);
	}

	pub fn target(&self, label: &Label) -> Option<&Target> {
		self.targets.get(label)
	}

	pub fn toolchain(&self, label: &Label) -> Option<&Toolchain> {
		self.toolchains.get(label)
	}

	pub fn targets(&self) -> impl Iterator<Item = &Target> {
		self.targets.values()
	}

	pub fn toolchains(&self) -> impl Iterator<Item = &Toolchain> {
		self.toolchains.values()
	}

	/// Look up a dependency, reporting a missing target as a user error
	/// attributed to the referencing target.
	pub fn dep_target(&self, origin: &Label, dep: &Label) -> Result<&Target> {
		self.target(dep).ok_or_else(|| {
			Error::in_target(origin, format!("Dependency {} does not exist", dep))
		})
	}

	/// Compute each target's link and dependency output files from its final
	/// output tool. Run once after the front-end has filled in the graph and
	/// before emission starts.
	pub fn resolve_outputs(&mut self) -> Result<()> {
		let labels: Vec<Label> = self.targets.keys().cloned().collect();
		for label in labels {
			let target = &self.targets[&label];
			let toolchain = self.toolchain(&target.toolchain).ok_or_else(|| {
				Error::in_target(
					&target.label,
					format!("Toolchain {} does not exist", target.toolchain),
				)
			})?;
			let (link, dep) = compute_output_files(target, toolchain)?;
			let target = &mut self.targets[&label];
			target.link_output_file = link;
			target.dependency_output_file = dep;
		}
		Ok(())
	}
}

/// The stamp file representing completion of a non-binary target.
pub fn stamp_file_for_target(target: &Target) -> OutputFile {
	OutputFile::new(format!(
		"{}/{}.stamp",
		target.label.target_out_dir(),
		target.label.name()
	))
}

fn compute_output_files(
	target: &Target,
	toolchain: &Toolchain,
) -> Result<(Option<OutputFile>, Option<OutputFile>)> {
	match target.output_type {
		OutputType::Executable
		| OutputType::SharedLibrary
		| OutputType::LoadableModule
		| OutputType::StaticLibrary
		| OutputType::RustLibrary
		| OutputType::RustProcMacro => {
			let tool = toolchain.tool_for_target_final_output(target)?;
			let outputs = substitution_writer::apply_list_to_linker(target, tool, &tool.outputs);
			let first = outputs.into_iter().next().ok_or_else(|| {
				Error::in_target(
					&target.label,
					format!("Tool \"{}\" produced no outputs", tool.name()),
				)
			})?;
			let link = match tool.as_c().and_then(|c| c.link_output.as_ref()) {
				Some(pattern) => {
					substitution_writer::apply_pattern_to_linker_as_output_file(target, tool, pattern)
				}
				None => first.clone(),
			};
			let dep = match tool.as_c().and_then(|c| c.depend_output.as_ref()) {
				Some(pattern) => {
					substitution_writer::apply_pattern_to_linker_as_output_file(target, tool, pattern)
				}
				None => link.clone(),
			};
			Ok((Some(link), Some(dep)))
		}
		OutputType::Group
		| OutputType::SourceSet
		| OutputType::Copy
		| OutputType::Action
		| OutputType::ActionForEach
		| OutputType::Bundle => Ok((None, Some(stamp_file_for_target(target)))),
	}
}
