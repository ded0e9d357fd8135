//! On-demand, memoized data derived from a target's dependency tree.
//!
//! Writers query transitive library lists, framework closures, Swift module
//! closures and inherited-library closures here instead of re-walking the
//! graph for every edge. Values are computed on first query and memoized per
//! target; entries only ever grow.
//!
//! A `ResolvedTargetData` instance is not synchronized. Confine one instance
//! to one thread (each writer task creates its own), or serialize access
//! externally. The input graph must be acyclic; the front-end has already
//! rejected dependency cycles.

use crate::graph::BuildGraph;
use crate::label::Label;
use crate::target::{LibFile, OutputType, Target};
use indexmap::{IndexMap, IndexSet};

#[derive(Default)]
struct TargetInfo {
	has_lib_info: bool,
	libs: Vec<LibFile>,
	lib_dirs: Vec<String>,
	has_framework_info: bool,
	frameworks: Vec<String>,
	has_inherited_info: bool,
	inherited_libraries: Vec<Label>,
	has_swift_info: bool,
	swift_modules: Vec<Label>,
}

pub struct ResolvedTargetData {
	infos: IndexMap<Label, TargetInfo>,
}

impl ResolvedTargetData {
	pub fn new() -> ResolvedTargetData {
		ResolvedTargetData { infos: IndexMap::new() }
	}

	/// The public plus private dependencies of a target, in declaration
	/// order.
	pub fn linked_deps(&self, target: &Target) -> Vec<Label> {
		target.linked_deps().cloned().collect()
	}

	pub fn data_deps(&self, target: &Target) -> Vec<Label> {
		target.data_deps.clone()
	}

	/// All library files to add to a linkable binary's final link, own
	/// config first, then each dependency's in declaration order, first
	/// occurrence kept.
	pub fn linked_libraries(&mut self, graph: &BuildGraph, target: &Target) -> Vec<LibFile> {
		self.ensure_lib_info(graph, target);
		self.infos[&target.label].libs.clone()
	}

	/// All library search directories for the final link.
	pub fn linked_library_dirs(&mut self, graph: &BuildGraph, target: &Target) -> Vec<String> {
		self.ensure_lib_info(graph, target);
		self.infos[&target.label].lib_dirs.clone()
	}

	/// All frameworks for the final link.
	pub fn linked_frameworks(&mut self, graph: &BuildGraph, target: &Target) -> Vec<String> {
		self.ensure_framework_info(graph, target);
		self.infos[&target.label].frameworks.clone()
	}

	/// The ordered closure of libraries a linking target absorbs: source
	/// sets, static libraries and Rust libraries visible through the
	/// dependency tree. Shared libraries appear but hide their internals.
	pub fn inherited_libraries(&mut self, graph: &BuildGraph, target: &Target) -> Vec<Label> {
		self.ensure_inherited_info(graph, target);
		self.infos[&target.label].inherited_libraries.clone()
	}

	/// The Swift modules this target imports, transitively through its
	/// Swift-building dependencies.
	pub fn swift_module_deps(&mut self, graph: &BuildGraph, target: &Target) -> Vec<Label> {
		self.ensure_swift_info(graph, target);
		self.infos[&target.label].swift_modules.clone()
	}

	fn info_mut(&mut self, label: &Label) -> &mut TargetInfo {
		self.infos.entry(label.clone()).or_insert_with(TargetInfo::default)
	}

	fn ensure_lib_info(&mut self, graph: &BuildGraph, target: &Target) {
		if self.info_mut(&target.label).has_lib_info {
			return;
		}
		let mut libs: IndexSet<LibFile> = IndexSet::new();
		let mut lib_dirs: IndexSet<String> = IndexSet::new();
		libs.extend(target.config.libs.iter().cloned());
		lib_dirs.extend(target.config.lib_dirs.iter().cloned());
		for dep_label in target.linked_deps() {
			if let Some(dep) = graph.target(dep_label) {
				self.ensure_lib_info(graph, dep);
				let info = &self.infos[dep_label];
				libs.extend(info.libs.iter().cloned());
				lib_dirs.extend(info.lib_dirs.iter().cloned());
			}
		}
		let info = self.info_mut(&target.label);
		info.libs = libs.into_iter().collect();
		info.lib_dirs = lib_dirs.into_iter().collect();
		info.has_lib_info = true;
	}

	fn ensure_framework_info(&mut self, graph: &BuildGraph, target: &Target) {
		if self.info_mut(&target.label).has_framework_info {
			return;
		}
		let mut frameworks: IndexSet<String> = IndexSet::new();
		frameworks.extend(target.config.frameworks.iter().cloned());
		for dep_label in target.linked_deps() {
			if let Some(dep) = graph.target(dep_label) {
				self.ensure_framework_info(graph, dep);
				frameworks.extend(self.infos[dep_label].frameworks.iter().cloned());
			}
		}
		let info = self.info_mut(&target.label);
		info.frameworks = frameworks.into_iter().collect();
		info.has_framework_info = true;
	}

	fn ensure_inherited_info(&mut self, graph: &BuildGraph, target: &Target) {
		if self.info_mut(&target.label).has_inherited_info {
			return;
		}
		let mut inherited: IndexSet<Label> = IndexSet::new();
		for dep_label in target.linked_deps() {
			let dep = match graph.target(dep_label) {
				Some(dep) => dep,
				None => continue,
			};
			match dep.output_type {
				OutputType::SourceSet | OutputType::RustLibrary => {
					inherited.insert(dep_label.clone());
					self.ensure_inherited_info(graph, dep);
					let dep_inherited = self.infos[dep_label].inherited_libraries.clone();
					inherited.extend(dep_inherited);
				}
				OutputType::StaticLibrary => {
					inherited.insert(dep_label.clone());
					self.ensure_inherited_info(graph, dep);
					// Source sets below an archive were compiled into it;
					// only real libraries propagate past it.
					let dep_inherited: Vec<Label> = self.infos[dep_label]
						.inherited_libraries
						.iter()
						.filter(|l| {
							graph
								.target(l)
								.map_or(false, |t| t.output_type != OutputType::SourceSet)
						})
						.cloned()
						.collect();
					inherited.extend(dep_inherited);
				}
				OutputType::SharedLibrary | OutputType::RustProcMacro => {
					inherited.insert(dep_label.clone());
				}
				OutputType::Group => {
					self.ensure_inherited_info(graph, dep);
					let dep_inherited = self.infos[dep_label].inherited_libraries.clone();
					inherited.extend(dep_inherited);
				}
				_ => {}
			}
		}
		let info = self.info_mut(&target.label);
		info.inherited_libraries = inherited.into_iter().collect();
		info.has_inherited_info = true;
	}

	fn ensure_swift_info(&mut self, graph: &BuildGraph, target: &Target) {
		if self.info_mut(&target.label).has_swift_info {
			return;
		}
		let mut modules: IndexSet<Label> = IndexSet::new();
		for dep_label in target.linked_deps() {
			let dep = match graph.target(dep_label) {
				Some(dep) => dep,
				None => continue,
			};
			if dep.builds_swift_module() {
				modules.insert(dep_label.clone());
			}
			self.ensure_swift_info(graph, dep);
			let dep_modules = self.infos[dep_label].swift_modules.clone();
			modules.extend(dep_modules);
		}
		let info = self.info_mut(&target.label);
		info.swift_modules = modules.into_iter().collect();
		info.has_swift_info = true;
	}
}
