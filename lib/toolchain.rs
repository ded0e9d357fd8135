//! Toolchains: named collections of tools.

use crate::error::{Error, Result};
use crate::label::Label;
use crate::source_file::SourceFileType;
use crate::substitution::SubstitutionBits;
use crate::target::{OutputType, Target};
use crate::tool::{self, Tool};
use indexmap::IndexMap;

/// A pool limiting how many jobs of its rules Ninja runs concurrently.
#[derive(Clone, Debug)]
pub struct Pool {
	pub name: String,
	pub depth: u32,
}

/// A sealed mapping from tool name to tool, plus the substitution-bits
/// summary of everything its tools reference.
///
/// Tools are validated as they are installed; after that the toolchain only
/// hands out shared references, so nothing can mutate a tool once a writer
/// can see it.
#[derive(Clone, Debug)]
pub struct Toolchain {
	pub label: Label,
	tools: IndexMap<&'static str, Tool>,
	pools: IndexMap<String, Pool>,
	bits: SubstitutionBits,
}

impl Toolchain {
	pub fn new(label: Label) -> Toolchain {
		Toolchain {
			label,
			tools: IndexMap::new(),
			pools: IndexMap::new(),
			bits: SubstitutionBits::new(),
		}
	}

	/// Validate and install a tool. Substitutions the tool references are
	/// merged into the toolchain's bits.
	pub fn add_tool(&mut self, tool: Tool) -> Result<()> {
		tool.validate()?;
		self.bits.merge_pattern(&tool.command);
		self.bits.merge_list(&tool.outputs);
		self.bits.merge_list(&tool.runtime_outputs);
		self.bits.merge_list(&tool.partial_outputs);
		for pattern in [&tool.description, &tool.depfile, &tool.rspfile, &tool.rspfile_content]
			.iter()
			.filter_map(|p| p.as_ref())
		{
			self.bits.merge_pattern(pattern);
		}
		self.tools.insert(tool.name(), tool);
		Ok(())
	}

	pub fn add_pool(&mut self, pool: Pool) {
		self.pools.insert(pool.name.clone(), pool);
	}

	pub fn tool(&self, name: &str) -> Option<&Tool> {
		self.tools.get(name)
	}

	pub fn tools(&self) -> impl Iterator<Item = &Tool> {
		self.tools.values()
	}

	pub fn pools(&self) -> impl Iterator<Item = &Pool> {
		self.pools.values()
	}

	/// Which placeholders appear anywhere in this toolchain's tools.
	pub fn substitution_bits(&self) -> &SubstitutionBits {
		&self.bits
	}

	pub fn tool_for_source_type(&self, ty: SourceFileType) -> Option<&Tool> {
		tool::tool_name_for_source_type(ty).and_then(|name| self.tool(name))
	}

	/// The tool producing a target's final output.
	pub fn tool_for_target_final_output(&self, target: &Target) -> Result<&Tool> {
		let name = tool_name_for_target_final_output(target);
		self.tool(name).ok_or_else(|| {
			Error::in_target(
				&target.label,
				format!("Toolchain {} has no tool \"{}\"", self.label, name),
			)
		})
	}
}

/// The name of the tool producing a target's final output.
pub fn tool_name_for_target_final_output(target: &Target) -> &'static str {
	if let Some(rust) = &target.rust {
		return tool::rust_tool_name_for_crate_type(rust.crate_type);
	}
	match target.output_type {
		OutputType::Executable => Tool::LINK,
		OutputType::SharedLibrary => Tool::SOLINK,
		OutputType::LoadableModule => Tool::SOLINK_MODULE,
		OutputType::StaticLibrary => Tool::ALINK,
		OutputType::RustLibrary => Tool::RUST_RLIB,
		OutputType::RustProcMacro => Tool::RUST_PROC_MACRO,
		OutputType::Copy => Tool::COPY,
		OutputType::Group
		| OutputType::SourceSet
		| OutputType::Action
		| OutputType::ActionForEach
		| OutputType::Bundle => Tool::STAMP,
	}
}
