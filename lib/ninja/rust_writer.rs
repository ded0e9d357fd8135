//! The writer for targets compiled by rustc: one edge per crate.

use super::target_writer::TargetWriter;
use crate::error::{Error, Result};
use crate::escape::{escape_to, EscapeMode};
use crate::output_file::OutputFile;
use crate::path_output::PathOutput;
use crate::substitution::{writer as substitution_writer, SubstitutionType};
use crate::target::{OutputType, Target};
use crate::tool::Tool;
use indexmap::IndexSet;
use raw_string::RawString;

pub struct NinjaRustBinaryTargetWriter<'a> {
	base: TargetWriter<'a>,
	tool: &'a Tool,
}

fn dir_part(path: &str) -> &str {
	match path.rfind('/') {
		Some(i) => &path[..i],
		None => ".",
	}
}

impl<'a> NinjaRustBinaryTargetWriter<'a> {
	pub fn new(base: TargetWriter<'a>) -> Result<NinjaRustBinaryTargetWriter<'a>> {
		let tool = base.toolchain.tool_for_target_final_output(base.target)?;
		Ok(NinjaRustBinaryTargetWriter { base, tool })
	}

	pub fn run(mut self) -> Result<RawString> {
		let target = self.base.target;
		let graph = self.base.graph;
		let rust = target.rust.as_ref().ok_or_else(|| {
			Error::in_target(&target.label, "Rust target without crate configuration")
		})?;
		let bits = self.base.toolchain.substitution_bits();

		if bits.used(SubstitutionType::CrateName) {
			self.base.out.push_str("crate_name = ");
			escape_to(&mut self.base.out, &rust.crate_name, EscapeMode::NinjaCommand);
			self.base.out.push_str("\n");
		}
		let rustflags = target.config.rustflags.clone();
		self.write_flag_var(SubstitutionType::RustFlags, &rustflags);
		let rustenv = target.config.rustenv.clone();
		self.write_flag_var(SubstitutionType::RustEnv, &rustenv);
		self.base.write_shared_vars();

		// The whole crate is one edge; a single stamp use never pays off.
		let input_deps = self.base.write_inputs_stamp_and_get_dep(1);
		let mut order_only = self.base.write_input_deps_stamp_and_get_dep(1);

		// rustc reads every file of the crate, not just the root.
		let mut implicit_deps: Vec<OutputFile> = target
			.sources
			.iter()
			.filter(|source| **source != rust.crate_root)
			.map(OutputFile::from_source_file)
			.collect();
		implicit_deps.extend(input_deps.iter().cloned());

		// Direct Rust dependencies are named with --extern and rebuild the
		// crate when they change; the rest of the rlib tree is reachable
		// through them and only needs to exist.
		let direct: IndexSet<&crate::label::Label> = target.linked_deps().collect();
		let mut extern_entries: Vec<(String, OutputFile)> = Vec::new();
		let mut dep_dirs: IndexSet<String> = IndexSet::new();
		for label in self.base.resolved.inherited_libraries(graph, target) {
			let dep = match graph.target(&label) {
				Some(dep) => dep,
				None => continue,
			};
			let dep_rust = match &dep.rust {
				Some(dep_rust) => dep_rust,
				None => continue,
			};
			let file = match &dep.dependency_output_file {
				Some(file) => file.clone(),
				None => continue,
			};
			dep_dirs.insert(dir_part(file.value()).to_string());
			if direct.contains(&label) {
				extern_entries.push((dep_rust.crate_name.clone(), file.clone()));
				implicit_deps.push(file);
			} else if !order_only.contains(&file) {
				order_only.push(file);
			}
		}

		let outputs = substitution_writer::apply_list_to_linker(target, self.tool, &self.tool.outputs);
		let crate_root = rust.crate_root.clone();
		self.base.write_compiler_build_line(
			&[crate_root],
			&implicit_deps,
			&order_only,
			self.tool.name(),
			&outputs,
		);

		if bits.used(SubstitutionType::RustDeps) {
			self.base.out.push_str("  rustdeps =");
			let command_output =
				PathOutput::new(self.base.path_output.current_dir(), EscapeMode::NinjaCommand);
			for dir in &dep_dirs {
				self.base.out.push_str(" ");
				escape_to(
					&mut self.base.out,
					&format!("-Ldependency={}", dir),
					EscapeMode::NinjaCommand,
				);
			}
			for (crate_name, file) in &extern_entries {
				self.base.out.push_str(" --extern ");
				self.base.out.push_str(&**crate_name);
				self.base.out.push_str("=");
				command_output.write_output_file(&mut self.base.out, file);
			}
			self.base.out.push_str("\n");
		}
		self.base.out.push_str("\n");
		Ok(self.base.finish())
	}

	fn write_flag_var(&mut self, ty: SubstitutionType, flags: &[String]) {
		if !self.base.toolchain.substitution_bits().used(ty) {
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
}

/// Whether the target's final output is produced by a Rust tool.
pub fn is_rust_target(target: &Target) -> bool {
	match target.output_type {
		OutputType::RustLibrary | OutputType::RustProcMacro => true,
		OutputType::Executable
		| OutputType::SharedLibrary
		| OutputType::LoadableModule
		| OutputType::StaticLibrary => target.uses_rust(),
		_ => false,
	}
}
