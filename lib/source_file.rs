//! Source files and the types derived from their extensions.

/// A source file as named by the build description.
///
/// Values are source-absolute: `//dir/file.cc`. Generated files live in the
/// build directory and use the `//obj/` and `//gen/` prefixes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceFile(String);

/// The role a source file plays, derived from its extension.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SourceFileType {
	C,
	Cpp,
	Header,
	Asm,
	ObjC,
	ObjCpp,
	ModuleMap,
	Def,
	Object,
	Rust,
	Go,
	Swift,
	Unknown,
}

impl SourceFile {
	pub fn new(value: impl Into<String>) -> SourceFile {
		let value = value.into();
		debug_assert!(
			value.starts_with("//") || value.starts_with('/'),
			"source files are source-absolute: {:?}",
			value
		);
		SourceFile(value)
	}

	pub fn value(&self) -> &str {
		&self.0
	}

	/// The path relative to the build directory. The build directory is the
	/// source root, so this is the value without the `//` prefix.
	pub fn build_relative(&self) -> &str {
		self.0.trim_start_matches('/')
	}

	/// The file name including the extension.
	pub fn file_part(&self) -> &str {
		match self.0.rfind('/') {
			Some(i) => &self.0[i + 1..],
			None => &self.0,
		}
	}

	/// The file name without the extension.
	pub fn name_part(&self) -> &str {
		let file = self.file_part();
		match file.rfind('.') {
			Some(i) => &file[..i],
			None => file,
		}
	}

	/// The extension, without the dot. Case-sensitive (`.S` is assembly).
	pub fn extension(&self) -> &str {
		let file = self.file_part();
		match file.rfind('.') {
			Some(i) => &file[i + 1..],
			None => "",
		}
	}

	/// The source-root-relative directory, without a trailing slash.
	pub fn source_dir(&self) -> &str {
		let rel = self.build_relative();
		match rel.rfind('/') {
			Some(i) => &rel[..i],
			None => "",
		}
	}

	pub fn file_type(&self) -> SourceFileType {
		match self.extension() {
			"c" => SourceFileType::C,
			"cc" | "cpp" | "cxx" => SourceFileType::Cpp,
			"h" | "hpp" | "hxx" | "hh" => SourceFileType::Header,
			"m" => SourceFileType::ObjC,
			"mm" => SourceFileType::ObjCpp,
			"S" | "s" | "asm" => SourceFileType::Asm,
			"o" | "obj" => SourceFileType::Object,
			"def" => SourceFileType::Def,
			"rs" => SourceFileType::Rust,
			"go" => SourceFileType::Go,
			"swift" => SourceFileType::Swift,
			"modulemap" => SourceFileType::ModuleMap,
			_ => SourceFileType::Unknown,
		}
	}

	pub fn is_module_map_type(&self) -> bool {
		self.file_type() == SourceFileType::ModuleMap
	}

	pub fn is_def_type(&self) -> bool {
		self.file_type() == SourceFileType::Def
	}

	pub fn is_object_type(&self) -> bool {
		self.file_type() == SourceFileType::Object
	}

	pub fn is_swift_type(&self) -> bool {
		self.file_type() == SourceFileType::Swift
	}

	/// Whether the file lives in the build directory, i.e. is generated.
	pub fn is_in_build_dir(&self) -> bool {
		self.0.starts_with("//obj/") || self.0.starts_with("//gen/")
	}
}

const NUM_SOURCE_FILE_TYPES: usize = SourceFileType::Unknown as usize + 1;

/// Tracks which source types appear in a target's sources.
#[derive(Clone, Debug)]
pub struct SourceFileTypeSet {
	flags: [bool; NUM_SOURCE_FILE_TYPES],
	empty: bool,
}

impl SourceFileTypeSet {
	pub fn new() -> SourceFileTypeSet {
		SourceFileTypeSet {
			flags: [false; NUM_SOURCE_FILE_TYPES],
			empty: true,
		}
	}

	pub fn from_sources<'a>(sources: impl IntoIterator<Item = &'a SourceFile>) -> SourceFileTypeSet {
		let mut set = SourceFileTypeSet::new();
		for source in sources {
			set.set(source.file_type());
		}
		set
	}

	pub fn set(&mut self, ty: SourceFileType) {
		self.flags[ty as usize] = true;
		self.empty = false;
	}

	pub fn get(&self, ty: SourceFileType) -> bool {
		self.flags[ty as usize]
	}

	/// Whether the target compiles as C-family code. An empty set counts as
	/// C so that targets without sources still get a C-family link step.
	pub fn c_source_used(&self) -> bool {
		self.empty
			|| self.get(SourceFileType::C)
			|| self.get(SourceFileType::Cpp)
			|| self.get(SourceFileType::Header)
			|| self.get(SourceFileType::ObjC)
			|| self.get(SourceFileType::ObjCpp)
			|| self.get(SourceFileType::Asm)
			|| self.get(SourceFileType::Object)
			|| self.get(SourceFileType::Def)
			|| self.get(SourceFileType::ModuleMap)
	}

	pub fn rust_source_used(&self) -> bool {
		self.get(SourceFileType::Rust)
	}

	pub fn go_source_used(&self) -> bool {
		self.get(SourceFileType::Go)
	}

	pub fn swift_source_used(&self) -> bool {
		self.get(SourceFileType::Swift)
	}

	/// Whether sources from incompatible language families are mixed in one
	/// target: at least two of {C-family, Rust, Go} are present. The empty
	/// set never counts as mixed.
	pub fn mixed_source_used(&self) -> bool {
		let c = !self.empty && self.c_source_used();
		let langs = [c, self.rust_source_used(), self.go_source_used()];
		langs.iter().filter(|&&used| used).count() >= 2
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn file_types() {
		let file = SourceFile::new("//a/b/hello.cc");
		assert_eq!(file.file_type(), SourceFileType::Cpp);
		assert_eq!(file.file_part(), "hello.cc");
		assert_eq!(file.name_part(), "hello");
		assert_eq!(file.source_dir(), "a/b");
		assert_eq!(file.build_relative(), "a/b/hello.cc");

		assert_eq!(SourceFile::new("//x.S").file_type(), SourceFileType::Asm);
		assert_eq!(SourceFile::new("//x.rs").file_type(), SourceFileType::Rust);
		assert_eq!(SourceFile::new("//x.swift").file_type(), SourceFileType::Swift);
		assert_eq!(
			SourceFile::new("//m/module.modulemap").file_type(),
			SourceFileType::ModuleMap
		);
		assert_eq!(SourceFile::new("//x.def").file_type(), SourceFileType::Def);
		assert_eq!(SourceFile::new("//x.weird").file_type(), SourceFileType::Unknown);
	}

	#[test]
	fn build_dir_detection() {
		assert!(SourceFile::new("//gen/a/x.cc").is_in_build_dir());
		assert!(SourceFile::new("//obj/a/x.o").is_in_build_dir());
		assert!(!SourceFile::new("//a/x.cc").is_in_build_dir());
	}

	#[test]
	fn mixed_sources() {
		let c_only = SourceFileTypeSet::from_sources(&[SourceFile::new("//a.c")]);
		assert!(!c_only.mixed_source_used());

		let c_and_rust =
			SourceFileTypeSet::from_sources(&[SourceFile::new("//a.c"), SourceFile::new("//b.rs")]);
		assert!(c_and_rust.mixed_source_used());

		// Rust plus Go counts as mixed even with no C sources involved.
		let rust_and_go =
			SourceFileTypeSet::from_sources(&[SourceFile::new("//a.rs"), SourceFile::new("//b.go")]);
		assert!(rust_and_go.mixed_source_used());

		let empty = SourceFileTypeSet::new();
		assert!(empty.c_source_used());
		assert!(!empty.mixed_source_used());
	}
}
