//! The placeholder vocabulary used by tool templates.
//!
//! Tool commands, output lists and rspfile templates are written with
//! `{{name}}` placeholders. A [`SubstitutionPattern`] is the parsed form of
//! one template string; a [`SubstitutionList`] is an ordered list of them.
//! Expansion into concrete strings happens in [`writer`]; which placeholders
//! a toolchain references anywhere is summarized in [`SubstitutionBits`].

mod pattern;
pub mod writer;

pub use self::pattern::{SubstitutionChunk, SubstitutionList, SubstitutionPattern};

use indexmap::IndexSet;

/// A named placeholder. The `name` is what appears between `{{` and `}}` in
/// templates; the `ninja_name` is the Ninja variable the placeholder maps to
/// when a rule is written (`{{source}}` becomes `${in}`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubstitutionType {
	Output,
	/// The explicit inputs of a link or action edge, `$in` in Ninja.
	Inputs,
	Source,
	SourceNamePart,
	SourceFilePart,
	SourceDir,
	SourceRootRelativeDir,
	SourceGenDir,
	SourceOutDir,
	Label,
	LabelName,
	RootOutDir,
	TargetGenDir,
	TargetOutDir,
	TargetOutputName,
	OutputDir,
	OutputExtension,
	CFlags,
	CFlagsC,
	CFlagsCc,
	CFlagsObjC,
	CFlagsObjCc,
	AsmFlags,
	SwiftFlags,
	Defines,
	IncludeDirs,
	ModuleDeps,
	ModuleDepsNoSelf,
	ModuleName,
	LdFlags,
	Libs,
	Frameworks,
	SwiftModules,
	ArFlags,
	Solibs,
	Rlibs,
	RustFlags,
	RustEnv,
	RustDeps,
	CrateName,
}

pub use self::SubstitutionType::*;

impl SubstitutionType {
	pub const ALL: &'static [SubstitutionType] = &[
		Output,
		Inputs,
		Source,
		SourceNamePart,
		SourceFilePart,
		SourceDir,
		SourceRootRelativeDir,
		SourceGenDir,
		SourceOutDir,
		Label,
		LabelName,
		RootOutDir,
		TargetGenDir,
		TargetOutDir,
		TargetOutputName,
		OutputDir,
		OutputExtension,
		CFlags,
		CFlagsC,
		CFlagsCc,
		CFlagsObjC,
		CFlagsObjCc,
		AsmFlags,
		SwiftFlags,
		Defines,
		IncludeDirs,
		ModuleDeps,
		ModuleDepsNoSelf,
		ModuleName,
		LdFlags,
		Libs,
		Frameworks,
		SwiftModules,
		ArFlags,
		Solibs,
		Rlibs,
		RustFlags,
		RustEnv,
		RustDeps,
		CrateName,
	];

	pub fn name(self) -> &'static str {
		match self {
			Output => "output",
			Inputs => "inputs",
			Source => "source",
			SourceNamePart => "source_name_part",
			SourceFilePart => "source_file_part",
			SourceDir => "source_dir",
			SourceRootRelativeDir => "source_root_relative_dir",
			SourceGenDir => "source_gen_dir",
			SourceOutDir => "source_out_dir",
			Label => "label",
			LabelName => "label_name",
			RootOutDir => "root_out_dir",
			TargetGenDir => "target_gen_dir",
			TargetOutDir => "target_out_dir",
			TargetOutputName => "target_output_name",
			OutputDir => "output_dir",
			OutputExtension => "output_extension",
			CFlags => "cflags",
			CFlagsC => "cflags_c",
			CFlagsCc => "cflags_cc",
			CFlagsObjC => "cflags_objc",
			CFlagsObjCc => "cflags_objcc",
			AsmFlags => "asmflags",
			SwiftFlags => "swiftflags",
			Defines => "defines",
			IncludeDirs => "include_dirs",
			ModuleDeps => "module_deps",
			ModuleDepsNoSelf => "module_deps_no_self",
			ModuleName => "module_name",
			LdFlags => "ldflags",
			Libs => "libs",
			Frameworks => "frameworks",
			SwiftModules => "swiftmodules",
			ArFlags => "arflags",
			Solibs => "solibs",
			Rlibs => "rlibs",
			RustFlags => "rustflags",
			RustEnv => "rustenv",
			RustDeps => "rustdeps",
			CrateName => "crate_name",
		}
	}

	/// The Ninja variable this placeholder maps to in rule definitions.
	pub fn ninja_name(self) -> &'static str {
		match self {
			Source | Inputs => "in",
			Output => "out",
			other => other.name(),
		}
	}

	pub fn from_name(name: &str) -> Option<SubstitutionType> {
		Self::ALL.iter().cloned().find(|ty| ty.name() == name)
	}
}

/// Which placeholders a tool or toolchain references anywhere in its
/// templates. Writers consult this to skip variables no rule would read.
#[derive(Clone, Debug, Default)]
pub struct SubstitutionBits {
	used: IndexSet<SubstitutionType>,
}

impl SubstitutionBits {
	pub fn new() -> SubstitutionBits {
		SubstitutionBits { used: IndexSet::new() }
	}

	pub fn used(&self, ty: SubstitutionType) -> bool {
		self.used.contains(&ty)
	}

	pub fn merge_pattern(&mut self, pattern: &SubstitutionPattern) {
		for ty in pattern.required_types() {
			self.used.insert(ty);
		}
	}

	pub fn merge_list(&mut self, list: &SubstitutionList) {
		for pattern in list.patterns() {
			self.merge_pattern(pattern);
		}
	}

	pub fn merge_bits(&mut self, other: &SubstitutionBits) {
		for ty in &other.used {
			self.used.insert(*ty);
		}
	}
}

/// Placeholders that make sense in any tool's templates.
pub fn is_valid_tool_substitution(ty: SubstitutionType) -> bool {
	match ty {
		Output | Label | LabelName | RootOutDir | TargetGenDir | TargetOutDir
		| TargetOutputName => true,
		_ => false,
	}
}

fn is_valid_source_substitution(ty: SubstitutionType) -> bool {
	match ty {
		Source | SourceNamePart | SourceFilePart | SourceDir | SourceRootRelativeDir
		| SourceGenDir | SourceOutDir => true,
		_ => false,
	}
}

/// Placeholders allowed in C-family compiler tools.
pub fn is_valid_compiler_substitution(ty: SubstitutionType) -> bool {
	is_valid_tool_substitution(ty)
		|| is_valid_source_substitution(ty)
		|| match ty {
			CFlags | CFlagsC | CFlagsCc | CFlagsObjC | CFlagsObjCc | AsmFlags | SwiftFlags
			| Defines | IncludeDirs | ModuleDeps | ModuleDepsNoSelf | ModuleName => true,
			_ => false,
		}
}

/// Placeholders allowed in C-family linker tools.
pub fn is_valid_linker_substitution(ty: SubstitutionType) -> bool {
	is_valid_tool_substitution(ty)
		|| match ty {
			Inputs | OutputDir | OutputExtension | LdFlags | Libs | Frameworks
			| SwiftModules | ArFlags | Solibs | Rlibs => true,
			_ => false,
		}
}

/// Placeholders allowed in Rust tools, which act as compiler and linker in
/// one step.
pub fn is_valid_rust_substitution(ty: SubstitutionType) -> bool {
	is_valid_tool_substitution(ty)
		|| is_valid_source_substitution(ty)
		|| match ty {
			OutputDir | OutputExtension | LdFlags | RustFlags | RustEnv | RustDeps
			| CrateName | Rlibs => true,
			_ => false,
		}
}

/// Placeholders allowed in `copy` and `stamp` tools.
pub fn is_valid_copy_substitution(ty: SubstitutionType) -> bool {
	is_valid_tool_substitution(ty) || is_valid_source_substitution(ty)
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn names_round_trip() {
		for &ty in SubstitutionType::ALL {
			assert_eq!(SubstitutionType::from_name(ty.name()), Some(ty));
		}
		assert_eq!(SubstitutionType::from_name("no_such_thing"), None);
	}

	#[test]
	fn ninja_names() {
		assert_eq!(Source.ninja_name(), "in");
		assert_eq!(Output.ninja_name(), "out");
		assert_eq!(CFlagsCc.ninja_name(), "cflags_cc");
	}

	#[test]
	fn validity_sets() {
		assert!(is_valid_compiler_substitution(Source));
		assert!(is_valid_compiler_substitution(ModuleDeps));
		assert!(!is_valid_compiler_substitution(LdFlags));
		assert!(is_valid_linker_substitution(Solibs));
		assert!(!is_valid_linker_substitution(CFlagsC));
		assert!(is_valid_rust_substitution(RustDeps));
		assert!(!is_valid_copy_substitution(Libs));
	}
}
