//! The writer for C-family binary targets: compiles, precompiled headers,
//! Clang module edges, Swift modules and the final link or stamp.

use super::target_writer::TargetWriter;
use crate::error::{Error, Result};
use crate::escape::{escape_to, EscapeMode};
use crate::output_file::OutputFile;
use crate::path_output::PathOutput;
use crate::source_file::{SourceFile, SourceFileType};
use crate::substitution::{writer as substitution_writer, SubstitutionType};
use crate::target::{LibFile, OutputType, Target};
use crate::tool::{CTool, PchType, Tool};
use indexmap::IndexSet;
use raw_string::RawString;

/// A Clang module visible to this target's compiles.
struct ModuleDep<'a> {
	#[allow(dead_code)]
	modulemap: &'a SourceFile,
	/// The internal module name; the defining target's label.
	#[allow(dead_code)]
	module_name: String,
	/// The compiled module.
	pcm: OutputFile,
	/// Whether this is the module of the current target.
	is_self: bool,
}

pub struct NinjaBinaryTargetWriter<'a> {
	base: TargetWriter<'a>,
	tool: &'a Tool,
}

/// The gcc `-x` language for a precompiled header compile.
fn pch_lang_for_tool(tool_name: &str) -> &'static str {
	match tool_name {
		Tool::CC => "c-header",
		Tool::CXX => "c++-header",
		Tool::OBJC => "objective-c-header",
		Tool::OBJCXX => "objective-c++-header",
		_ => unreachable!("Not a valid PCH tool type: {}", tool_name),
	}
}

fn pch_lang_suffix(tool_name: &str) -> &'static str {
	match tool_name {
		Tool::CC => "c",
		Tool::CXX => "cc",
		Tool::OBJC => "m",
		Tool::OBJCXX => "mm",
		_ => unreachable!("Not a valid PCH tool type: {}", tool_name),
	}
}

/// The extension a PCH output carries; compile edges match PCH deps to their
/// tool by this suffix.
fn pch_output_extension(tool_name: &str, pch_type: PchType) -> String {
	match pch_type {
		PchType::Msvc => format!(".{}.obj", pch_lang_suffix(tool_name)),
		PchType::Gcc => format!(".{}.gch", pch_lang_suffix(tool_name)),
		PchType::None => unreachable!("Cannot write a PCH command with no PCH header type"),
	}
}

fn is_object_file(file: &OutputFile) -> bool {
	file.value().ends_with(".o") || file.value().ends_with(".obj")
}

impl<'a> NinjaBinaryTargetWriter<'a> {
	pub fn new(base: TargetWriter<'a>) -> Result<NinjaBinaryTargetWriter<'a>> {
		let tool = base.toolchain.tool_for_target_final_output(base.target)?;
		Ok(NinjaBinaryTargetWriter { base, tool })
	}

	pub fn run(mut self) -> Result<RawString> {
		let target = self.base.target;

		let module_deps = self.module_deps_information()?;
		self.write_compiler_vars(&module_deps);

		let num_stamp_uses = target.sources.len().max(1);
		let input_deps = self.base.write_inputs_stamp_and_get_dep(num_stamp_uses);

		// The order-only stamp keeps upstream actions from forcing
		// recompiles: the compiler's depfile already names every real input.
		let order_only_deps = self.base.write_input_deps_stamp_and_get_dep(num_stamp_uses);

		// GCC-style PCH outputs are compiler inputs only; MSVC-style ones
		// are object files and must reach the link line.
		let (pch_obj_files, pch_other_files) =
			self.write_pch_commands(&input_deps, &order_only_deps)?;

		let mut object_files;
		let mut other_files = Vec::new();
		if target.source_types_used().swift_source_used() {
			object_files = self.write_swift_sources(&input_deps, &order_only_deps)?;
		} else {
			let pch_files = if !pch_obj_files.is_empty() {
				&pch_obj_files
			} else {
				&pch_other_files
			};
			let (objects, others) =
				self.write_sources(pch_files, &input_deps, &order_only_deps, &module_deps);
			object_files = objects;
			other_files = others;
		}

		object_files.extend(pch_obj_files.iter().cloned());
		if !self.check_for_duplicate_object_files(&object_files) {
			return Ok(self.base.finish());
		}

		if target.output_type == OutputType::SourceSet {
			self.write_source_set_stamp(&object_files);
		} else {
			self.write_linker_stuff(&object_files, &other_files, &input_deps)?;
		}
		Ok(self.base.finish())
	}

	fn module_deps_information(&self) -> Result<Vec<ModuleDep<'a>>> {
		let mut ret = Vec::new();
		let mut add = |t: &'a Target, is_self: bool| -> Result<()> {
			let modulemap = t
				.sources
				.iter()
				.find(|s| s.is_module_map_type())
				.expect("module scan only visits targets with a module map");
			let toolchain = self
				.base
				.graph
				.toolchain(&t.toolchain)
				.unwrap_or(self.base.toolchain);
			let (_, outputs) = t.output_files_for_source(toolchain, modulemap).ok_or_else(|| {
				Error::in_target(
					&t.label,
					"Toolchain has no cxx_module tool for a module map source",
				)
			})?;
			// Must be exactly one .pcm from a .modulemap.
			assert_eq!(outputs.len(), 1, "module map must produce exactly one output");
			ret.push(ModuleDep {
				modulemap,
				module_name: t.label.to_string(),
				pcm: outputs.into_iter().next().unwrap(),
				is_self,
			});
			Ok(())
		};

		let target = self.base.target;
		if target.source_types_used().get(SourceFileType::ModuleMap) {
			add(target, true)?;
		}
		for dep in self.base.dep_targets(&self.base.resolved.linked_deps(target)) {
			// A .modulemap source means the dependency is modularized.
			if dep.source_types_used().get(SourceFileType::ModuleMap) {
				add(dep, false)?;
			}
		}
		Ok(ret)
	}

	fn write_compiler_vars(&mut self, module_deps: &[ModuleDep]) {
		let target = self.base.target;
		let used = target.source_types_used();
		let config = &target.config;

		self.write_prefixed_list(SubstitutionType::Defines, "-D", &config.defines);
		self.write_prefixed_list(SubstitutionType::IncludeDirs, "-I", &config.include_dirs);
		self.write_flag_var(SubstitutionType::CFlags, &config.cflags, true);
		self.write_flag_var(
			SubstitutionType::CFlagsC,
			&config.cflags_c,
			used.get(SourceFileType::C),
		);
		self.write_flag_var(
			SubstitutionType::CFlagsCc,
			&config.cflags_cc,
			used.get(SourceFileType::Cpp) || used.get(SourceFileType::ModuleMap),
		);
		self.write_flag_var(
			SubstitutionType::CFlagsObjC,
			&config.cflags_objc,
			used.get(SourceFileType::ObjC),
		);
		self.write_flag_var(
			SubstitutionType::CFlagsObjCc,
			&config.cflags_objcc,
			used.get(SourceFileType::ObjCpp),
		);
		self.write_flag_var(
			SubstitutionType::AsmFlags,
			&config.asmflags,
			used.get(SourceFileType::Asm),
		);
		self.write_flag_var(
			SubstitutionType::SwiftFlags,
			&config.swiftflags,
			used.swift_source_used(),
		);
		if used.swift_source_used() {
			if let Some(swift) = &target.swift {
				if self.base.toolchain.substitution_bits().used(SubstitutionType::ModuleName) {
					self.base.out.push_str("module_name = ");
					escape_to(&mut self.base.out, &swift.module_name, EscapeMode::NinjaCommand);
					self.base.out.push_str("\n");
				}
			}
		}

		if !module_deps.is_empty()
			&& (used.get(SourceFileType::Cpp) || used.get(SourceFileType::ModuleMap))
		{
			self.write_module_deps_substitution(SubstitutionType::ModuleDeps, module_deps, true);
			self.write_module_deps_substitution(
				SubstitutionType::ModuleDepsNoSelf,
				module_deps,
				false,
			);
		}

		self.base.write_shared_vars();
	}

	fn write_module_deps_substitution(
		&mut self,
		ty: SubstitutionType,
		module_deps: &[ModuleDep],
		include_self: bool,
	) {
		if !self.base.toolchain.substitution_bits().used(ty) {
			return;
		}
		self.base.out.push_str(ty.ninja_name());
		self.base.out.push_str(" = -Xclang ");
		escape_to(&mut self.base.out, "-fmodules-embed-all-files", EscapeMode::NinjaCommand);
		for module_dep in module_deps {
			if !module_dep.is_self || include_self {
				self.base.out.push_str(" ");
				escape_to(&mut self.base.out, "-fmodule-file=", EscapeMode::NinjaCommand);
				self.base
					.path_output
					.write_output_file(&mut self.base.out, &module_dep.pcm);
			}
		}
		self.base.out.push_str("\n");
	}

	fn write_flag_var(&mut self, ty: SubstitutionType, flags: &[String], type_used: bool) {
		if !self.base.toolchain.substitution_bits().used(ty) || !type_used {
			return;
		}
		self.base.out.push_str(ty.ninja_name());
		self.base.out.push_str(" =");
		for flag in flags {
			self.base.out.push_str(" ");
			escape_to(&mut self.base.out, flag, EscapeMode::NinjaCommand);
		}
		self.base.out.push_str("\n");
	}

	fn write_prefixed_list(&mut self, ty: SubstitutionType, prefix: &str, values: &[String]) {
		if !self.base.toolchain.substitution_bits().used(ty) {
			return;
		}
		self.base.out.push_str(ty.ninja_name());
		self.base.out.push_str(" =");
		for value in values {
			self.base.out.push_str(" ");
			escape_to(&mut self.base.out, &format!("{}{}", prefix, value), EscapeMode::NinjaCommand);
		}
		self.base.out.push_str("\n");
	}

	fn write_pch_commands(
		&mut self,
		input_deps: &[OutputFile],
		order_only_deps: &[OutputFile],
	) -> Result<(Vec<OutputFile>, Vec<OutputFile>)> {
		let mut object_files = Vec::new();
		let mut other_files = Vec::new();
		let target = self.base.target;
		if !target.config.has_precompiled_headers() {
			return Ok((object_files, other_files));
		}
		let used = target.source_types_used();

		// Objective-C tools only support the GCC style.
		let candidates: [(&'static str, SubstitutionType, bool, bool); 4] = [
			(Tool::CC, SubstitutionType::CFlagsC, used.get(SourceFileType::C), false),
			(Tool::CXX, SubstitutionType::CFlagsCc, used.get(SourceFileType::Cpp), false),
			(Tool::OBJC, SubstitutionType::CFlagsObjC, used.get(SourceFileType::ObjC), true),
			(Tool::OBJCXX, SubstitutionType::CFlagsObjCc, used.get(SourceFileType::ObjCpp), true),
		];
		for (tool_name, flag_ty, type_used, gcc_only) in candidates.iter() {
			if !type_used {
				continue;
			}
			let pch_type = match self.base.toolchain.tool(tool_name).and_then(Tool::as_c) {
				Some(c) => c.precompiled_header_type,
				None => continue,
			};
			if pch_type == PchType::None || (*gcc_only && pch_type != PchType::Gcc) {
				continue;
			}
			self.write_pch_command(
				*flag_ty,
				tool_name,
				pch_type,
				input_deps,
				order_only_deps,
				&mut object_files,
				&mut other_files,
			);
		}
		Ok((object_files, other_files))
	}

	fn pch_output_file(&self, tool_name: &str, pch_type: PchType) -> OutputFile {
		let target = self.base.target;
		OutputFile::new(format!(
			"{}/{}.precompile{}",
			target.label.target_out_dir(),
			target.output_name(),
			pch_output_extension(tool_name, pch_type)
		))
	}

	fn write_pch_command(
		&mut self,
		flag_ty: SubstitutionType,
		tool_name: &str,
		pch_type: PchType,
		input_deps: &[OutputFile],
		order_only_deps: &[OutputFile],
		object_files: &mut Vec<OutputFile>,
		other_files: &mut Vec<OutputFile>,
	) {
		let target = self.base.target;
		let output = self.pch_output_file(tool_name, pch_type);
		match pch_type {
			PchType::Msvc => object_files.push(output.clone()),
			PchType::Gcc => other_files.push(output.clone()),
			PchType::None => unreachable!("Cannot write a PCH command with no PCH header type"),
		}

		let precompiled_source = target
			.config
			.precompiled_source
			.clone()
			.expect("has_precompiled_headers checked");
		self.base.write_compiler_build_line(
			&[precompiled_source],
			input_deps,
			order_only_deps,
			tool_name,
			&[output],
		);

		// The PCH edge needs its own language flags value.
		self.base.out.push_str("  ");
		self.base.out.push_str(flag_ty.ninja_name());
		self.base.out.push_str(" =");
		match pch_type {
			PchType::Msvc => {
				// Extend the regular flags with the /Yc creation switch.
				self.base.out.push_str(" ${");
				self.base.out.push_str(flag_ty.ninja_name());
				self.base.out.push_str("}");
				self.base.out.push_str(" /Yc");
				self.base.out.push_str(&*target.config.precompiled_header);
			}
			PchType::Gcc => {
				// Replace the flags so the -x header language wins over any
				// -include of the regular compile flags.
				let flags = match flag_ty {
					SubstitutionType::CFlagsC => &target.config.cflags_c,
					SubstitutionType::CFlagsCc => &target.config.cflags_cc,
					SubstitutionType::CFlagsObjC => &target.config.cflags_objc,
					SubstitutionType::CFlagsObjCc => &target.config.cflags_objcc,
					_ => unreachable!(),
				};
				for flag in flags {
					self.base.out.push_str(" ");
					escape_to(&mut self.base.out, flag, EscapeMode::NinjaCommand);
				}
				self.base.out.push_str(" -x ");
				self.base.out.push_str(pch_lang_for_tool(tool_name));
			}
			PchType::None => unreachable!(),
		}
		self.base.out.push_str("\n\n");
	}

	fn write_sources(
		&mut self,
		pch_deps: &[OutputFile],
		input_deps: &[OutputFile],
		order_only_deps: &[OutputFile],
		module_deps: &[ModuleDep],
	) -> (Vec<OutputFile>, Vec<SourceFile>) {
		let target = self.base.target;
		let toolchain = self.base.toolchain;
		let mut object_files = Vec::with_capacity(target.sources.len());
		let mut other_files = Vec::new();

		for source in &target.sources {
			debug_assert!(source.file_type() != SourceFileType::Swift);
			let (tool_name, tool_outputs) = match target.output_files_for_source(toolchain, source)
			{
				Some(pair) => pair,
				None => {
					if source.is_def_type() {
						other_files.push(source.clone());
					}
					continue;
				}
			};

			let mut deps: Vec<OutputFile> = input_deps.to_vec();

			// Only include PCH deps matching this tool's output extension;
			// a C edge must not depend on the C++ PCH output.
			if let Some(c) = toolchain.tool(tool_name).and_then(Tool::as_c) {
				if c.precompiled_header_type != PchType::None {
					let suffix = pch_output_extension(tool_name, c.precompiled_header_type);
					for dep in pch_deps {
						if dep.value().ends_with(&suffix) {
							deps.push(dep.clone());
						}
					}
				}
			}

			// Peer modules are inputs of every compile; a module's own
			// compile must not depend on its own output.
			for module_dep in module_deps {
				if tool_outputs.first() != Some(&module_dep.pcm) {
					deps.push(module_dep.pcm.clone());
				}
			}

			self.base.write_compiler_build_line(
				&[source.clone()],
				&deps,
				order_only_deps,
				tool_name,
				&tool_outputs,
			);

			// A compiler can make several outputs; only the first is linked.
			if !source.is_module_map_type() {
				if let Some(first) = tool_outputs.into_iter().next() {
					object_files.push(first);
				}
			}
		}
		self.base.out.push_str("\n");
		(object_files, other_files)
	}

	/// Swift sources compile as one unit: a single edge producing the
	/// `.swiftmodule`, with every additional output grouped behind it by a
	/// stamp so downstream edges can depend on one file.
	fn write_swift_sources(
		&mut self,
		input_deps: &[OutputFile],
		order_only_deps: &[OutputFile],
	) -> Result<Vec<OutputFile>> {
		let target = self.base.target;
		let graph = self.base.graph;
		let mut object_files = Vec::new();

		let tool = self
			.base
			.toolchain
			.tool_for_source_type(SourceFileType::Swift)
			.ok_or_else(|| {
				Error::in_target(&target.label, "Toolchain has no swift tool for Swift sources")
			})?;
		let swift = target.swift.as_ref().ok_or_else(|| {
			Error::in_target(&target.label, "Swift sources without a swift module configuration")
		})?;
		let module_output = swift.module_output_file.clone();

		let mut additional_outputs: Vec<OutputFile> =
			substitution_writer::apply_list_to_linker(target, tool, &tool.outputs)
				.into_iter()
				.filter(|f| f != &module_output)
				.collect();
		for output in &additional_outputs {
			if is_object_file(output) {
				object_files.push(output.clone());
			}
		}

		if !tool.partial_outputs.is_empty() {
			for source in &target.sources {
				if !source.is_swift_type() {
					continue;
				}
				let partial =
					substitution_writer::apply_list_to_source(target, source, &tool.partial_outputs);
				for output in partial {
					if is_object_file(&output) {
						object_files.push(output.clone());
					}
					additional_outputs.push(output);
				}
			}
		}

		let mut swift_order_only: IndexSet<OutputFile> =
			order_only_deps.iter().cloned().collect();
		for label in self.base.resolved.swift_module_deps(graph, target) {
			if let Some(dep) = graph.target(&label) {
				if let Some(file) = &dep.dependency_output_file {
					swift_order_only.insert(file.clone());
				}
			}
		}
		let swift_order_only: Vec<OutputFile> = swift_order_only.into_iter().collect();

		let sources = target.sources.clone();
		self.base.write_compiler_build_line(
			&sources,
			input_deps,
			&swift_order_only,
			Tool::SWIFT,
			&[module_output.clone()],
		);

		if !additional_outputs.is_empty() {
			self.base.out.push_str("\n");
			self.base.write_compiler_build_line(
				&[module_output.as_source_file()],
				input_deps,
				&swift_order_only,
				Tool::STAMP,
				&additional_outputs,
			);
		}
		self.base.out.push_str("\n");
		Ok(object_files)
	}

	fn check_for_duplicate_object_files(&self, files: &[OutputFile]) -> bool {
		let mut seen: IndexSet<&str> = IndexSet::new();
		for file in files {
			if !seen.insert(file.value()) {
				let target = self.base.target;
				let err = Error::in_target(
					&target.label,
					format!(
						"Duplicate object file: the target generates two object files with the same name:\n  {}",
						file.value()
					),
				)
				.with_help(
					"It could be you accidentally have a file listed twice in the\n\
					 sources. Or, depending on how your toolchain maps sources to\n\
					 object files, two source files with the same name in different\n\
					 directories could map to the same object file.\n\
					 \n\
					 In the latter case, either rename one of the files or move one of\n\
					 the sources to a separate source_set to avoid them both being in\n\
					 the same target.",
				);
				self.base.scheduler.fail_with_error(err);
				return false;
			}
		}
		true
	}

	fn write_source_set_stamp(&mut self, object_files: &[OutputFile]) {
		let classified = self.base.classified_deps();
		let order_only: Vec<OutputFile> = classified
			.non_linkable_deps
			.iter()
			.filter_map(|dep| dep.dependency_output_file.clone())
			.collect();
		self.base.write_stamp_for_target(object_files, &order_only);
	}

	fn write_linker_stuff(
		&mut self,
		object_files: &[OutputFile],
		other_files: &[SourceFile],
		input_deps: &[OutputFile],
	) -> Result<()> {
		let target = self.base.target;
		let graph = self.base.graph;
		let tool = self.tool;
		let default_ctool = CTool::default();
		let ctool = tool.as_c().unwrap_or(&default_ctool);

		let output_files =
			substitution_writer::apply_list_to_linker(target, tool, &tool.outputs);
		self.base.out.push_str("build");
		self.base
			.path_output
			.write_output_files(&mut self.base.out, &output_files);
		self.base.out.push_str(": ");
		self.base.out.push_str(&*self.base.rule_prefix);
		self.base.out.push_str(tool.name());

		let classified = self.base.classified_deps();

		// Object files.
		self.base
			.path_output
			.write_output_files(&mut self.base.out, object_files);
		self.base
			.path_output
			.write_output_files(&mut self.base.out, &classified.extra_object_files);

		// Dependencies.
		let mut implicit_deps: Vec<OutputFile> = Vec::new();
		let mut solibs: Vec<OutputFile> = Vec::new();
		for dep in &classified.linkable_deps {
			if dep.output_type == OutputType::RustLibrary
				|| dep.output_type == OutputType::RustProcMacro
			{
				continue;
			}
			let link_output = dep.link_output_file.clone().ok_or_else(|| {
				Error::in_target(
					&target.label,
					format!("No link output file for linkable dependency {}", dep.label),
				)
			})?;
			let dep_output = dep.dependency_output_file.clone().unwrap_or_else(|| link_output.clone());
			self.base.out.push_str(" ");
			self.base
				.path_output
				.write_output_file(&mut self.base.out, &link_output);
			if dep_output != link_output {
				// A shared library with a separate interface file: relink
				// only when the interface changes.
				implicit_deps.push(dep_output);
				solibs.push(link_output);
			}
		}

		// Only one def file is allowed.
		let optional_def_file = other_files.iter().find(|f| f.is_def_type());
		if let Some(def) = optional_def_file {
			implicit_deps.push(OutputFile::from_source_file(def));
		}

		// Libraries specified by source path.
		for lib in self.base.resolved.linked_libraries(graph, target) {
			if let LibFile::Path(path) = lib {
				implicit_deps.push(OutputFile::from_source_file(&path));
			}
		}

		// Framework bundles participate through their stamp so dependents
		// relink when the framework is regenerated.
		for dep in &classified.framework_deps {
			if let Some(file) = &dep.dependency_output_file {
				implicit_deps.push(file.clone());
			}
		}

		// The input deps are normally carried transitively by the source
		// compiles; with no object files the link edge carries them itself.
		if object_files.is_empty() && classified.extra_object_files.is_empty() {
			implicit_deps.extend(input_deps.iter().cloned());
		}

		// A final target depends on the entire tree of transitive rlibs.
		let mut transitive_rustlibs: Vec<OutputFile> = Vec::new();
		if target.is_final() {
			for label in self.base.resolved.inherited_libraries(graph, target) {
				let dep = match graph.target(&label) {
					Some(dep) => dep,
					None => continue,
				};
				if dep.output_type == OutputType::RustLibrary {
					if let Some(file) = &dep.dependency_output_file {
						transitive_rustlibs.push(file.clone());
						implicit_deps.push(file.clone());
					}
				}
			}
		}

		// Swift modules from dependencies, and our own for dependents.
		let mut swiftmodules: Vec<OutputFile> = Vec::new();
		if target.is_final() {
			for dep in &classified.swiftmodule_deps {
				if let Some(swift) = &dep.swift {
					swiftmodules.push(swift.module_output_file.clone());
					implicit_deps.push(swift.module_output_file.clone());
				}
			}
			if target.builds_swift_module() {
				if let Some(swift) = &target.swift {
					swiftmodules.push(swift.module_output_file.clone());
					implicit_deps.push(swift.module_output_file.clone());
				}
			}
		}

		if !implicit_deps.is_empty() {
			self.base.out.push_str(" |");
			self.base
				.path_output
				.write_output_files(&mut self.base.out, &implicit_deps);
		}

		// Data and other non-linkable deps only need to exist at runtime.
		if !classified.non_linkable_deps.is_empty() {
			self.base.out.push_str(" ||");
			for dep in &classified.non_linkable_deps {
				if let Some(file) = &dep.dependency_output_file {
					self.base.out.push_str(" ");
					self.base.path_output.write_output_file(&mut self.base.out, file);
				}
			}
		}
		self.base.out.push_str("\n");

		// Variables in the inner scope of the link edge.
		match target.output_type {
			OutputType::Executable | OutputType::SharedLibrary | OutputType::LoadableModule => {
				self.write_linker_flags(ctool, optional_def_file);
				self.write_libs(ctool);
				self.write_frameworks(ctool);
				self.write_swiftmodules(ctool, &swiftmodules);
			}
			OutputType::StaticLibrary => {
				self.base.out.push_str("  arflags =");
				let arflags = target.config.arflags.clone();
				for flag in &arflags {
					self.base.out.push_str(" ");
					escape_to(&mut self.base.out, flag, EscapeMode::NinjaCommand);
				}
				self.base.out.push_str("\n");
			}
			_ => {}
		}
		self.write_output_substitutions();
		self.write_libs_list("solibs", &solibs);
		self.write_libs_list("rlibs", &transitive_rustlibs);
		if let Some(pool) = &tool.pool {
			self.base.out.push_str("  pool = ");
			self.base.out.push_str(&**pool);
			self.base.out.push_str("\n");
		}
		Ok(())
	}

	fn write_linker_flags(&mut self, ctool: &CTool, def_file: Option<&SourceFile>) {
		let target = self.base.target;
		let graph = self.base.graph;
		self.base.out.push_str("  ldflags =");
		let ldflags = target.config.ldflags.clone();
		for flag in &ldflags {
			self.base.out.push_str(" ");
			escape_to(&mut self.base.out, flag, EscapeMode::NinjaCommand);
		}
		let lib_dir_switch = ctool.lib_dir_switch.clone();
		for dir in self.base.resolved.linked_library_dirs(graph, target) {
			self.base.out.push_str(" ");
			escape_to(
				&mut self.base.out,
				&format!("{}{}", lib_dir_switch, dir),
				EscapeMode::NinjaCommand,
			);
		}
		if let Some(def) = def_file {
			self.base.out.push_str(" /DEF:");
			self.base.path_output.write_source_file(&mut self.base.out, def);
		}
		self.base.out.push_str("\n");
	}

	fn write_libs(&mut self, ctool: &CTool) {
		let target = self.base.target;
		let graph = self.base.graph;
		self.base.out.push_str("  libs =");
		let lib_switch = ctool.lib_switch.clone();
		let command_output =
			PathOutput::new(self.base.path_output.current_dir(), EscapeMode::NinjaCommand);
		for lib in self.base.resolved.linked_libraries(graph, target) {
			match lib {
				LibFile::Name(name) => {
					self.base.out.push_str(" ");
					escape_to(
						&mut self.base.out,
						&format!("{}{}", lib_switch, name),
						EscapeMode::NinjaCommand,
					);
				}
				LibFile::Path(path) => {
					self.base.out.push_str(" ");
					command_output.write_source_file(&mut self.base.out, &path);
				}
			}
		}
		self.base.out.push_str("\n");
	}

	fn write_frameworks(&mut self, ctool: &CTool) {
		let target = self.base.target;
		let graph = self.base.graph;
		self.base.out.push_str("  frameworks =");
		let framework_switch = ctool.framework_switch.clone();
		for framework in self.base.resolved.linked_frameworks(graph, target) {
			self.base.out.push_str(" ");
			escape_to(
				&mut self.base.out,
				&format!("{}{}", framework_switch, framework),
				EscapeMode::NinjaCommand,
			);
		}
		self.base.out.push_str("\n");
	}

	fn write_swiftmodules(&mut self, ctool: &CTool, swiftmodules: &[OutputFile]) {
		self.base.out.push_str("  swiftmodules =");
		let command_output =
			PathOutput::new(self.base.path_output.current_dir(), EscapeMode::NinjaCommand);
		for module in swiftmodules {
			self.base.out.push_str(" ");
			self.base.out.push_str(&*ctool.swiftmodule_switch);
			command_output.write_output_file(&mut self.base.out, module);
		}
		self.base.out.push_str("\n");
	}

	fn write_output_substitutions(&mut self) {
		let target = self.base.target;
		let tool = self.tool;
		self.base.out.push_str("  output_extension = ");
		let extension =
			substitution_writer::get_linker_substitution(target, tool, SubstitutionType::OutputExtension);
		self.base.out.push_str(&*extension);
		self.base.out.push_str("\n  output_dir = ");
		let dir =
			substitution_writer::get_linker_substitution(target, tool, SubstitutionType::OutputDir);
		self.base.out.push_str(&*dir);
		self.base.out.push_str("\n");
	}

	fn write_libs_list(&mut self, label: &str, libs: &[OutputFile]) {
		if libs.is_empty() {
			return;
		}
		self.base.out.push_str("  ");
		self.base.out.push_str(label);
		self.base.out.push_str(" =");
		let command_output =
			PathOutput::new(self.base.path_output.current_dir(), EscapeMode::NinjaCommand);
		for lib in libs {
			self.base.out.push_str(" ");
			command_output.write_output_file(&mut self.base.out, lib);
		}
		self.base.out.push_str("\n");
	}
}
