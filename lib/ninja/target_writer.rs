//! Shared machinery for the per-target writers.

use crate::error::{Error, Result};
use crate::escape::{escape_to, EscapeMode};
use crate::graph::{stamp_file_for_target, BuildGraph};
use crate::label::Label;
use crate::output_file::OutputFile;
use crate::path_output::PathOutput;
use crate::resolved::ResolvedTargetData;
use crate::scheduler::Scheduler;
use crate::source_file::SourceFile;
use crate::substitution::{writer as substitution_writer, SubstitutionType};
use crate::target::{OutputType, Target};
use crate::tool::Tool;
use crate::toolchain::Toolchain;
use indexmap::IndexSet;
use raw_string::RawString;

/// Dependencies of a linking target, grouped by the role they play on the
/// link edge.
pub struct ClassifiedDeps<'a> {
	/// Object files absorbed from source-set dependencies.
	pub extra_object_files: Vec<OutputFile>,
	/// Targets whose output is linked against.
	pub linkable_deps: Vec<&'a Target>,
	/// Targets that only need to have run: order-only on the link edge.
	pub non_linkable_deps: Vec<&'a Target>,
	/// Framework bundles, depended on through their stamp file.
	pub framework_deps: Vec<&'a Target>,
	/// Targets contributing a Swift module.
	pub swiftmodule_deps: Vec<&'a Target>,
}

/// State shared by every per-target writer: the target, its toolchain, the
/// output buffer the Ninja fragment is streamed into, and the thread-local
/// resolved-data cache.
pub struct TargetWriter<'a> {
	pub graph: &'a BuildGraph,
	pub target: &'a Target,
	pub toolchain: &'a Toolchain,
	pub scheduler: &'a Scheduler,
	pub resolved: ResolvedTargetData,
	pub out: RawString,
	pub path_output: PathOutput,
	pub rule_prefix: String,
}

impl<'a> TargetWriter<'a> {
	pub fn new(
		graph: &'a BuildGraph,
		target: &'a Target,
		scheduler: &'a Scheduler,
	) -> Result<TargetWriter<'a>> {
		let toolchain = graph.toolchain(&target.toolchain).ok_or_else(|| {
			Error::in_target(
				&target.label,
				format!("Toolchain {} does not exist", target.toolchain),
			)
		})?;
		Ok(TargetWriter {
			graph,
			target,
			toolchain,
			scheduler,
			resolved: ResolvedTargetData::new(),
			out: RawString::new(),
			path_output: PathOutput::new("", EscapeMode::Ninja),
			rule_prefix: super::rule_prefix_for_toolchain(graph, &target.toolchain),
		})
	}

	pub fn finish(self) -> RawString {
		self.out
	}

	/// Resolve a list of dependency labels, skipping ones the graph does not
	/// know; the front-end has already diagnosed those.
	pub fn dep_targets(&self, labels: &[Label]) -> Vec<&'a Target> {
		labels.iter().filter_map(|label| self.graph.target(label)).collect()
	}

	/// One `build` line: outputs, rule, explicit sources, implicit deps
	/// after `|`, order-only deps after `||`.
	pub fn write_compiler_build_line(
		&mut self,
		sources: &[SourceFile],
		extra_deps: &[OutputFile],
		order_only_deps: &[OutputFile],
		tool_name: &str,
		outputs: &[OutputFile],
	) {
		self.out.push_str("build");
		self.path_output.write_output_files(&mut self.out, outputs);
		self.out.push_str(": ");
		self.out.push_str(&*self.rule_prefix);
		self.out.push_str(tool_name);
		self.path_output.write_source_files(&mut self.out, sources);
		if !extra_deps.is_empty() {
			self.out.push_str(" |");
			self.path_output.write_output_files(&mut self.out, extra_deps);
		}
		if !order_only_deps.is_empty() {
			self.out.push_str(" ||");
			self.path_output.write_output_files(&mut self.out, order_only_deps);
		}
		self.out.push_str("\n");
	}

	/// The stamp edge representing completion of this target.
	pub fn write_stamp_for_target(&mut self, files: &[OutputFile], order_only_deps: &[OutputFile]) {
		let stamp = stamp_file_for_target(self.target);
		self.out.push_str("build");
		self.path_output.write_output_files(&mut self.out, &[stamp]);
		self.out.push_str(": ");
		self.out.push_str(&*self.rule_prefix);
		self.out.push_str(Tool::STAMP);
		self.path_output.write_output_files(&mut self.out, files);
		if !order_only_deps.is_empty() {
			self.out.push_str(" ||");
			self.path_output.write_output_files(&mut self.out, order_only_deps);
		}
		self.out.push_str("\n");
	}

	/// Target-scope variables referenced anywhere in the toolchain.
	pub fn write_shared_vars(&mut self) {
		let shared = [
			SubstitutionType::Label,
			SubstitutionType::RootOutDir,
			SubstitutionType::TargetOutDir,
			SubstitutionType::TargetGenDir,
			SubstitutionType::TargetOutputName,
		];
		let mut wrote = false;
		for &ty in &shared {
			if !self.toolchain.substitution_bits().used(ty) {
				continue;
			}
			if let Some(value) = substitution_writer::get_target_substitution(self.target, ty) {
				self.out.push_str(ty.ninja_name());
				self.out.push_str(" = ");
				escape_to(&mut self.out, &value, EscapeMode::NinjaCommand);
				self.out.push_str("\n");
				wrote = true;
			}
		}
		if wrote {
			self.out.push_str("\n");
		}
	}

	/// Stamp the target's `inputs` list and return what compile edges should
	/// depend on: nothing, the single input, or the stamp.
	pub fn write_inputs_stamp_and_get_dep(&mut self, num_stamp_uses: usize) -> Vec<OutputFile> {
		if self.target.inputs.is_empty() {
			return Vec::new();
		}
		let files: Vec<OutputFile> = self
			.target
			.inputs
			.iter()
			.map(OutputFile::from_source_file)
			.collect();
		if files.len() == 1 || num_stamp_uses == 1 {
			return files;
		}
		let stamp = OutputFile::new(format!(
			"{}/{}.inputs.stamp",
			self.target.label.target_out_dir(),
			self.target.label.name()
		));
		self.out.push_str("build");
		self.path_output.write_output_files(&mut self.out, &[stamp.clone()]);
		self.out.push_str(": ");
		self.out.push_str(&*self.rule_prefix);
		self.out.push_str(Tool::STAMP);
		self.path_output.write_output_files(&mut self.out, &files);
		self.out.push_str("\n");
		vec![stamp]
	}

	/// Collect the dependency-output files of all non-linkable dependencies
	/// and return the order-only list for compile edges: the raw files, or a
	/// single `.inputdeps.stamp` grouping them when several edges would
	/// repeat several files.
	pub fn write_input_deps_stamp_and_get_dep(&mut self, num_stamp_uses: usize) -> Vec<OutputFile> {
		let mut files: IndexSet<OutputFile> = IndexSet::new();
		for dep in self.dep_targets(&self.resolved.linked_deps(self.target)) {
			if dep.is_linkable() {
				continue;
			}
			if let Some(file) = &dep.dependency_output_file {
				files.insert(file.clone());
			}
		}
		let files: Vec<OutputFile> = files.into_iter().collect();
		if files.len() <= 1 || num_stamp_uses == 1 {
			return files;
		}
		let stamp = OutputFile::new(format!(
			"{}/{}.inputdeps.stamp",
			self.target.label.target_out_dir(),
			self.target.label.name()
		));
		self.out.push_str("build");
		self.path_output.write_output_files(&mut self.out, &[stamp.clone()]);
		self.out.push_str(": ");
		self.out.push_str(&*self.rule_prefix);
		self.out.push_str(Tool::STAMP);
		self.path_output.write_output_files(&mut self.out, &files);
		self.out.push_str("\n");
		vec![stamp]
	}

	/// Group this target's dependencies by their role on the link edge.
	pub fn classified_deps(&mut self) -> ClassifiedDeps<'a> {
		let mut classified = ClassifiedDeps {
			extra_object_files: Vec::new(),
			linkable_deps: Vec::new(),
			non_linkable_deps: Vec::new(),
			framework_deps: Vec::new(),
			swiftmodule_deps: Vec::new(),
		};

		for label in self.resolved.inherited_libraries(self.graph, self.target) {
			let dep = match self.graph.target(&label) {
				Some(dep) => dep,
				None => continue,
			};
			match dep.output_type {
				OutputType::SourceSet => {
					self.add_source_set_objects(dep, &mut classified.extra_object_files);
				}
				OutputType::StaticLibrary
				| OutputType::SharedLibrary
				| OutputType::RustLibrary
				| OutputType::RustProcMacro => classified.linkable_deps.push(dep),
				_ => {}
			}
		}

		for dep in self.dep_targets(&self.resolved.linked_deps(self.target)) {
			if dep.builds_swift_module() {
				classified.swiftmodule_deps.push(dep);
			} else if dep.output_type == OutputType::Bundle {
				if dep.bundle.as_ref().map_or(false, |b| b.is_framework) {
					classified.framework_deps.push(dep);
				} else {
					classified.non_linkable_deps.push(dep);
				}
			} else if !dep.is_linkable() && dep.output_type != OutputType::SourceSet {
				classified.non_linkable_deps.push(dep);
			}
		}
		for dep in self.dep_targets(&self.resolved.data_deps(self.target)) {
			classified.non_linkable_deps.push(dep);
		}
		classified
	}

	fn add_source_set_objects(&self, dep: &Target, object_files: &mut Vec<OutputFile>) {
		let toolchain = self
			.graph
			.toolchain(&dep.toolchain)
			.unwrap_or(self.toolchain);
		for source in &dep.sources {
			if source.is_module_map_type() {
				continue;
			}
			if let Some((_, outputs)) = dep.output_files_for_source(toolchain, source) {
				if let Some(first) = outputs.into_iter().next() {
					object_files.push(first);
				}
			}
		}
	}

	/// Record every build-dir source no dependency is known to generate.
	/// The post-drain validation matches these against the written-files and
	/// generated-files registries.
	pub fn record_unknown_generated_inputs(&self) {
		for file in self.target.sources.iter().chain(self.target.inputs.iter()) {
			if !file.is_in_build_dir() {
				continue;
			}
			if !self.file_is_generated_by_dependency(file) {
				self.scheduler
					.add_unknown_generated_input(&self.target.label, file.clone());
			}
		}
	}

	fn file_is_generated_by_dependency(&self, file: &SourceFile) -> bool {
		let want = OutputFile::from_source_file(file);
		let mut visited: IndexSet<Label> = IndexSet::new();
		let mut stack: Vec<Label> = self
			.target
			.linked_deps()
			.chain(self.target.data_deps.iter())
			.cloned()
			.collect();
		while let Some(label) = stack.pop() {
			if !visited.insert(label.clone()) {
				continue;
			}
			let dep = match self.graph.target(&label) {
				Some(dep) => dep,
				None => continue,
			};
			if dep.dependency_output_file.as_ref() == Some(&want)
				|| dep.link_output_file.as_ref() == Some(&want)
			{
				return true;
			}
			if let Some(action) = &dep.action {
				let outputs = match dep.output_type {
					OutputType::Action => {
						substitution_writer::apply_list_to_target(dep, &action.outputs)
					}
					OutputType::ActionForEach | OutputType::Copy => dep
						.sources
						.iter()
						.flat_map(|source| {
							substitution_writer::apply_list_to_source(dep, source, &action.outputs)
						})
						.collect(),
					_ => Vec::new(),
				};
				if outputs.contains(&want) {
					return true;
				}
			}
			stack.extend(dep.linked_deps().chain(dep.data_deps.iter()).cloned());
		}
		false
	}
}
