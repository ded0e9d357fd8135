//! Build-directory-relative output files.

use crate::source_file::SourceFile;
use std::fmt;

/// A file produced by the build, as a path relative to the build directory.
///
/// Two output files are equal iff their path strings are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutputFile(String);

impl OutputFile {
	pub fn new(value: impl Into<String>) -> OutputFile {
		let value = value.into();
		debug_assert!(!value.starts_with('/'), "output files are build-relative: {:?}", value);
		OutputFile(value)
	}

	pub fn value(&self) -> &str {
		&self.0
	}

	/// Reinterpret this output as a source file, for edges that consume a
	/// previously built file.
	pub fn as_source_file(&self) -> SourceFile {
		SourceFile::new(format!("//{}", self.0))
	}

	/// The output file naming a source, for tools that take sources where
	/// outputs are expected (`.def` files, libraries given by path).
	pub fn from_source_file(source: &SourceFile) -> OutputFile {
		OutputFile(source.build_relative().to_string())
	}
}

impl fmt::Display for OutputFile {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(&self.0)
	}
}
