//! Writing file paths into Ninja output.
//!
//! All escaping of paths happens here, at the moment the path is written,
//! with the escape mode of the surrounding context. Paths always use forward
//! slashes, whatever the host convention.

use crate::escape::{escape_to, EscapeMode};
use crate::output_file::OutputFile;
use crate::path_util;
use crate::source_file::SourceFile;
use raw_string::RawString;

/// Writes paths relative to the directory of the Ninja file being emitted.
pub struct PathOutput {
	current_dir: String,
	mode: EscapeMode,
}

impl PathOutput {
	/// `current_dir` is the build-relative directory of the Ninja file being
	/// written; the empty string for files at the build root.
	pub fn new(current_dir: impl Into<String>, mode: EscapeMode) -> PathOutput {
		PathOutput {
			current_dir: current_dir.into(),
			mode,
		}
	}

	pub fn current_dir(&self) -> &str {
		&self.current_dir
	}

	pub fn write_output_file(&self, out: &mut RawString, file: &OutputFile) {
		self.write_path(out, file.value());
	}

	pub fn write_source_file(&self, out: &mut RawString, file: &SourceFile) {
		self.write_path(out, file.build_relative());
	}

	/// Write each file prefixed with a space, the form used in `build` lines.
	pub fn write_output_files(&self, out: &mut RawString, files: &[OutputFile]) {
		for file in files {
			out.push_str(" ");
			self.write_output_file(out, file);
		}
	}

	pub fn write_source_files(&self, out: &mut RawString, files: &[SourceFile]) {
		for file in files {
			out.push_str(" ");
			self.write_source_file(out, file);
		}
	}

	fn write_path(&self, out: &mut RawString, build_relative: &str) {
		let rebased = path_util::rebase(build_relative, &self.current_dir);
		escape_to(out, &rebased, self.mode);
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn writes_escaped_paths() {
		let po = PathOutput::new("", EscapeMode::Ninja);
		let mut out = RawString::new();
		po.write_output_file(&mut out, &OutputFile::new("obj/a/x.o"));
		assert_eq!(out, "obj/a/x.o");

		let mut out = RawString::new();
		po.write_source_file(&mut out, &SourceFile::new("//dir with space/x.c"));
		assert_eq!(out, "dir$ with$ space/x.c");
	}

	#[test]
	fn rebases_into_current_dir() {
		let po = PathOutput::new("obj/a", EscapeMode::Ninja);
		let mut out = RawString::new();
		po.write_output_file(&mut out, &OutputFile::new("obj/a/x.o"));
		assert_eq!(out, "x.o");
	}

	#[test]
	fn writes_file_lists() {
		let po = PathOutput::new("", EscapeMode::Ninja);
		let mut out = RawString::new();
		po.write_output_files(
			&mut out,
			&[OutputFile::new("a.o"), OutputFile::new("b.o")],
		);
		assert_eq!(out, " a.o b.o");
	}
}
