//! Tool definitions carried by a toolchain.
//!
//! A [`Tool`] is one entry of a toolchain: the command template, output
//! templates and flags for one kind of build step. Tools come in three
//! variants, distinguished by [`ToolKind`]: C-family tools carry the
//! precompiled-header policy and linker switches, Rust tools carry the crate
//! configuration, everything else is a general tool.
//!
//! A tool is mutable while it is being set up. Installing it into a
//! [`Toolchain`][crate::toolchain::Toolchain] validates its templates and
//! freezes it; nothing hands out mutable access afterwards.

use crate::error::{Error, Result};
use crate::source_file::SourceFileType;
use crate::substitution::{
	self, SubstitutionList, SubstitutionPattern, SubstitutionType,
};

/// How a C-family tool produces precompiled headers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PchType {
	None,
	Msvc,
	Gcc,
}

/// The way Ninja discovers extra dependencies of a compile.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DepStyle {
	/// Through a Makefile-formatted file named by `depfile`.
	Gcc,
	/// Through `/showIncludes` messages on standard output.
	Msvc,
}

/// The crate kind a Rust tool builds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CrateType {
	Bin,
	Rlib,
	Dylib,
	CDylib,
	StaticLib,
	ProcMacro,
}

/// Extra configuration on C-family compiler and linker tools.
#[derive(Clone, Debug)]
pub struct CTool {
	pub precompiled_header_type: PchType,
	pub depsformat: DepStyle,
	/// Switch prefixes for values written into linker variables.
	pub lib_switch: String,
	pub lib_dir_switch: String,
	pub framework_switch: String,
	pub swiftmodule_switch: String,
	/// For linkers whose link-against file differs from the file dependents
	/// rebuild on (shared libraries with a table-of-contents file).
	pub link_output: Option<SubstitutionPattern>,
	pub depend_output: Option<SubstitutionPattern>,
}

impl Default for CTool {
	fn default() -> CTool {
		CTool {
			precompiled_header_type: PchType::None,
			depsformat: DepStyle::Gcc,
			lib_switch: "-l".to_string(),
			lib_dir_switch: "-L".to_string(),
			framework_switch: "-framework ".to_string(),
			swiftmodule_switch: "-add_ast_path ".to_string(),
			link_output: None,
			depend_output: None,
		}
	}
}

/// Extra configuration on Rust tools.
#[derive(Clone, Debug)]
pub struct RustTool {
	pub crate_type: CrateType,
}

/// The variant-specific part of a tool.
#[derive(Clone, Debug)]
pub enum ToolKind {
	C(CTool),
	General,
	Rust(RustTool),
}

/// One tool of a toolchain.
#[derive(Clone, Debug)]
pub struct Tool {
	name: &'static str,
	kind: ToolKind,
	pub command: SubstitutionPattern,
	pub description: Option<SubstitutionPattern>,
	pub depfile: Option<SubstitutionPattern>,
	pub outputs: SubstitutionList,
	pub runtime_outputs: SubstitutionList,
	/// Per-source outputs of the Swift tool.
	pub partial_outputs: SubstitutionList,
	pub output_prefix: String,
	/// Includes the leading `.` when non-empty.
	pub default_output_extension: String,
	pub default_output_dir: Option<SubstitutionPattern>,
	pub restat: bool,
	pub rspfile: Option<SubstitutionPattern>,
	pub rspfile_content: Option<SubstitutionPattern>,
	pub pool: Option<String>,
}

impl Tool {
	pub const CC: &'static str = "cc";
	pub const CXX: &'static str = "cxx";
	pub const OBJC: &'static str = "objc";
	pub const OBJCXX: &'static str = "objcxx";
	pub const ASM: &'static str = "asm";
	pub const CXX_MODULE: &'static str = "cxx_module";
	pub const SWIFT: &'static str = "swift";
	pub const ALINK: &'static str = "alink";
	pub const SOLINK: &'static str = "solink";
	pub const SOLINK_MODULE: &'static str = "solink_module";
	pub const LINK: &'static str = "link";
	pub const STAMP: &'static str = "stamp";
	pub const COPY: &'static str = "copy";
	pub const RUST_BIN: &'static str = "rust_bin";
	pub const RUST_RLIB: &'static str = "rust_rlib";
	pub const RUST_DYLIB: &'static str = "rust_dylib";
	pub const RUST_CDYLIB: &'static str = "rust_cdylib";
	pub const RUST_STATICLIB: &'static str = "rust_staticlib";
	pub const RUST_PROC_MACRO: &'static str = "rust_proc_macro";

	pub fn new(name: &'static str, kind: ToolKind) -> Tool {
		Tool {
			name,
			kind,
			command: SubstitutionPattern::default(),
			description: None,
			depfile: None,
			outputs: SubstitutionList::default(),
			runtime_outputs: SubstitutionList::default(),
			partial_outputs: SubstitutionList::default(),
			output_prefix: String::new(),
			default_output_extension: String::new(),
			default_output_dir: None,
			restat: false,
			rspfile: None,
			rspfile_content: None,
			pool: None,
		}
	}

	pub fn c(name: &'static str, c: CTool) -> Tool {
		Tool::new(name, ToolKind::C(c))
	}

	pub fn general(name: &'static str) -> Tool {
		Tool::new(name, ToolKind::General)
	}

	pub fn rust(name: &'static str, rust: RustTool) -> Tool {
		Tool::new(name, ToolKind::Rust(rust))
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn kind(&self) -> &ToolKind {
		&self.kind
	}

	pub fn as_c(&self) -> Option<&CTool> {
		match &self.kind {
			ToolKind::C(c) => Some(c),
			_ => None,
		}
	}

	pub fn as_rust(&self) -> Option<&RustTool> {
		match &self.kind {
			ToolKind::Rust(r) => Some(r),
			_ => None,
		}
	}

	/// Check every template against the placeholder set this tool may use.
	/// Called when the tool is installed into a toolchain.
	pub fn validate(&self) -> Result<()> {
		let valid: fn(SubstitutionType) -> bool = match self.name {
			Tool::CC | Tool::CXX | Tool::OBJC | Tool::OBJCXX | Tool::ASM
			| Tool::CXX_MODULE | Tool::SWIFT => substitution::is_valid_compiler_substitution,
			Tool::ALINK | Tool::SOLINK | Tool::SOLINK_MODULE | Tool::LINK => {
				substitution::is_valid_linker_substitution
			}
			Tool::STAMP | Tool::COPY => substitution::is_valid_copy_substitution,
			Tool::RUST_BIN | Tool::RUST_RLIB | Tool::RUST_DYLIB | Tool::RUST_CDYLIB
			| Tool::RUST_STATICLIB | Tool::RUST_PROC_MACRO => {
				substitution::is_valid_rust_substitution
			}
			other => {
				return Err(Error::new(format!("Unknown tool name \"{}\"", other)));
			}
		};

		let check = |types: &mut dyn Iterator<Item = SubstitutionType>| -> Result<()> {
			for ty in types {
				if !valid(ty) {
					return Err(Error::new(format!(
						"Tool \"{}\" may not reference {{{{{}}}}}",
						self.name,
						ty.name()
					)));
				}
			}
			Ok(())
		};

		check(&mut self.command.required_types())?;
		check(&mut self.outputs.required_types())?;
		check(&mut self.runtime_outputs.required_types())?;
		check(&mut self.partial_outputs.required_types())?;
		for pattern in [
			&self.description,
			&self.depfile,
			&self.default_output_dir,
			&self.rspfile,
			&self.rspfile_content,
		]
		.iter()
		.filter_map(|p| p.as_ref())
		{
			check(&mut pattern.required_types())?;
		}

		if self.command.is_empty() && self.name != Tool::STAMP && self.name != Tool::COPY {
			return Err(Error::new(format!("Tool \"{}\" has no command", self.name)));
		}
		let needs_outputs = match self.name {
			Tool::STAMP | Tool::COPY => false,
			_ => true,
		};
		if needs_outputs && self.outputs.is_empty() {
			return Err(Error::new(format!("Tool \"{}\" has no outputs", self.name)));
		}
		Ok(())
	}
}

/// The compiler tool responsible for a source of the given type, if any.
/// Rust sources are compiled at crate granularity and map to no per-source
/// tool; object, definition and header files go straight to the linker.
pub fn tool_name_for_source_type(ty: SourceFileType) -> Option<&'static str> {
	match ty {
		SourceFileType::C => Some(Tool::CC),
		SourceFileType::Cpp => Some(Tool::CXX),
		SourceFileType::ObjC => Some(Tool::OBJC),
		SourceFileType::ObjCpp => Some(Tool::OBJCXX),
		SourceFileType::Asm => Some(Tool::ASM),
		SourceFileType::ModuleMap => Some(Tool::CXX_MODULE),
		SourceFileType::Swift => Some(Tool::SWIFT),
		SourceFileType::Header
		| SourceFileType::Def
		| SourceFileType::Object
		| SourceFileType::Rust
		| SourceFileType::Go
		| SourceFileType::Unknown => None,
	}
}

/// The Rust tool matching a crate type.
pub fn rust_tool_name_for_crate_type(crate_type: CrateType) -> &'static str {
	match crate_type {
		CrateType::Bin => Tool::RUST_BIN,
		CrateType::Rlib => Tool::RUST_RLIB,
		CrateType::Dylib => Tool::RUST_DYLIB,
		CrateType::CDylib => Tool::RUST_CDYLIB,
		CrateType::StaticLib => Tool::RUST_STATICLIB,
		CrateType::ProcMacro => Tool::RUST_PROC_MACRO,
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn validate_accepts_matching_substitutions() {
		let mut tool = Tool::c(Tool::CC, CTool::default());
		tool.command = SubstitutionPattern::parse("cc {{cflags_c}} -c {{source}} -o {{output}}")
			.unwrap();
		tool.outputs = SubstitutionList::parse(&["obj/{{source_name_part}}.o"]).unwrap();
		assert!(tool.validate().is_ok());
	}

	#[test]
	fn validate_rejects_foreign_substitutions() {
		let mut tool = Tool::c(Tool::CC, CTool::default());
		tool.command = SubstitutionPattern::parse("cc {{ldflags}} {{source}}").unwrap();
		tool.outputs = SubstitutionList::parse(&["obj/{{source_name_part}}.o"]).unwrap();
		assert!(tool.validate().is_err());
	}

	#[test]
	fn validate_requires_outputs() {
		let mut tool = Tool::general(Tool::LINK);
		tool.command = SubstitutionPattern::parse("ld -o {{output}}").unwrap();
		assert!(tool.validate().is_err());
	}

	#[test]
	fn source_type_tool_selection() {
		assert_eq!(tool_name_for_source_type(SourceFileType::C), Some(Tool::CC));
		assert_eq!(tool_name_for_source_type(SourceFileType::Cpp), Some(Tool::CXX));
		assert_eq!(
			tool_name_for_source_type(SourceFileType::ModuleMap),
			Some(Tool::CXX_MODULE)
		);
		assert_eq!(tool_name_for_source_type(SourceFileType::Def), None);
		assert_eq!(tool_name_for_source_type(SourceFileType::Object), None);
		assert_eq!(tool_name_for_source_type(SourceFileType::Rust), None);
	}
}
