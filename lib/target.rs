//! The resolved target record consumed by the writers.
//!
//! Targets are produced by the front-end and are read-only during emission.
//! Dependencies are held as labels and resolved through the graph's lookup
//! tables, never as owning references.

use crate::label::Label;
use crate::output_file::OutputFile;
use crate::source_file::{SourceFile, SourceFileTypeSet};
use crate::substitution::{writer as substitution_writer, SubstitutionList, SubstitutionPattern};
use crate::tool::{self, CrateType};
use crate::toolchain::Toolchain;

/// What a target produces.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OutputType {
	Group,
	Executable,
	SharedLibrary,
	LoadableModule,
	StaticLibrary,
	SourceSet,
	Copy,
	Action,
	ActionForEach,
	Bundle,
	RustLibrary,
	RustProcMacro,
}

/// A library reference from `libs`: either a file given by source path or a
/// name handed to the linker's `-l` switch.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LibFile {
	Path(SourceFile),
	Name(String),
}

/// The per-target config values the writers read. The front-end has already
/// flattened config inheritance into these lists.
#[derive(Clone, Debug, Default)]
pub struct ConfigValues {
	pub cflags: Vec<String>,
	pub cflags_c: Vec<String>,
	pub cflags_cc: Vec<String>,
	pub cflags_objc: Vec<String>,
	pub cflags_objcc: Vec<String>,
	pub asmflags: Vec<String>,
	pub swiftflags: Vec<String>,
	pub defines: Vec<String>,
	pub include_dirs: Vec<String>,
	pub ldflags: Vec<String>,
	pub arflags: Vec<String>,
	pub libs: Vec<LibFile>,
	pub lib_dirs: Vec<String>,
	pub frameworks: Vec<String>,
	pub rustflags: Vec<String>,
	pub rustenv: Vec<String>,
	pub precompiled_header: String,
	pub precompiled_source: Option<SourceFile>,
}

impl ConfigValues {
	pub fn has_precompiled_headers(&self) -> bool {
		!self.precompiled_header.is_empty() && self.precompiled_source.is_some()
	}
}

/// Swift-specific target data.
#[derive(Clone, Debug)]
pub struct SwiftValues {
	pub module_name: String,
	/// The `.swiftmodule` produced by this target's single compile edge.
	pub module_output_file: OutputFile,
}

/// Rust-specific target data.
#[derive(Clone, Debug)]
pub struct RustValues {
	pub crate_name: String,
	pub crate_type: CrateType,
	pub crate_root: SourceFile,
}

/// Bundle-specific target data.
#[derive(Clone, Debug, Default)]
pub struct BundleValues {
	pub is_framework: bool,
}

/// Action-specific target data, shared by `action`, `action_foreach` and
/// `copy` targets. The script runs directly; resolving an interpreter is the
/// front-end's business.
#[derive(Clone, Debug, Default)]
pub struct ActionValues {
	pub script: Option<SourceFile>,
	pub args: SubstitutionList,
	pub outputs: SubstitutionList,
	pub depfile: Option<SubstitutionPattern>,
	pub description: Option<String>,
}

/// One resolved target.
#[derive(Clone, Debug)]
pub struct Target {
	pub label: Label,
	pub output_type: OutputType,
	pub toolchain: Label,
	/// Overrides the label name as the base of output file names.
	pub output_name: String,
	/// Overrides the tool's default output extension; includes the dot.
	pub output_extension: Option<String>,
	/// Overrides the tool's default output directory.
	pub output_dir: Option<String>,
	pub sources: Vec<SourceFile>,
	/// Extra files compiles depend on, e.g. scripts read by every step.
	pub inputs: Vec<SourceFile>,
	pub public_deps: Vec<Label>,
	pub private_deps: Vec<Label>,
	pub data_deps: Vec<Label>,
	pub config: ConfigValues,
	/// The file dependents link against, set during output resolution.
	pub link_output_file: Option<OutputFile>,
	/// The file dependents rebuild on; differs from the link output for
	/// shared libraries with a table-of-contents file.
	pub dependency_output_file: Option<OutputFile>,
	pub swift: Option<SwiftValues>,
	pub rust: Option<RustValues>,
	pub bundle: Option<BundleValues>,
	pub action: Option<ActionValues>,
}

impl Target {
	pub fn new(label: Label, output_type: OutputType, toolchain: Label) -> Target {
		Target {
			label,
			output_type,
			toolchain,
			output_name: String::new(),
			output_extension: None,
			output_dir: None,
			sources: Vec::new(),
			inputs: Vec::new(),
			public_deps: Vec::new(),
			private_deps: Vec::new(),
			data_deps: Vec::new(),
			config: ConfigValues::default(),
			link_output_file: None,
			dependency_output_file: None,
			swift: None,
			rust: None,
			bundle: None,
			action: None,
		}
	}

	/// The base name of output files: `output_name` if set, else the label
	/// name. Tool output prefixes are applied on top of this at expansion.
	pub fn output_name(&self) -> &str {
		if self.output_name.is_empty() {
			self.label.name()
		} else {
			&self.output_name
		}
	}

	pub fn source_types_used(&self) -> SourceFileTypeSet {
		SourceFileTypeSet::from_sources(&self.sources)
	}

	/// Whether dependents link against this target's output.
	pub fn is_linkable(&self) -> bool {
		match self.output_type {
			OutputType::StaticLibrary
			| OutputType::SharedLibrary
			| OutputType::RustLibrary
			| OutputType::RustProcMacro => true,
			_ => false,
		}
	}

	/// Whether this target is a final product whose link pulls in the whole
	/// tree of inherited libraries.
	pub fn is_final(&self) -> bool {
		match self.output_type {
			OutputType::Executable | OutputType::SharedLibrary | OutputType::LoadableModule => {
				true
			}
			_ => false,
		}
	}

	pub fn builds_swift_module(&self) -> bool {
		self.swift.is_some() && self.source_types_used().swift_source_used()
	}

	/// Whether the target compiles with the Rust tools.
	pub fn uses_rust(&self) -> bool {
		match self.output_type {
			OutputType::RustLibrary | OutputType::RustProcMacro => true,
			_ => self.rust.is_some() && self.source_types_used().rust_source_used(),
		}
	}

	/// Public and private dependencies, the ones emission treats as linked.
	pub fn linked_deps(&self) -> impl Iterator<Item = &Label> {
		self.public_deps.iter().chain(self.private_deps.iter())
	}

	/// Targets that must have run before this target's steps: actions,
	/// copies and bundles among the linked deps.
	pub fn is_hard_dep(&self) -> bool {
		match self.output_type {
			OutputType::Action | OutputType::ActionForEach | OutputType::Copy
			| OutputType::Bundle => true,
			_ => false,
		}
	}

	/// The compile tool and output files for one source of this target, or
	/// `None` for sources no tool consumes (headers, objects, `.def` files,
	/// Rust sources outside the crate-root edge).
	pub fn output_files_for_source(
		&self,
		toolchain: &Toolchain,
		source: &SourceFile,
	) -> Option<(&'static str, Vec<OutputFile>)> {
		let name = tool::tool_name_for_source_type(source.file_type())?;
		let tool = toolchain.tool(name)?;
		let outputs = substitution_writer::apply_list_to_source(self, source, &tool.outputs);
		Some((name, outputs))
	}
}
