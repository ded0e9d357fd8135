//! Writes the root `build.ninja`: version, the `subninja` lines pulling in
//! every toolchain file, and a phony `all` target.

use crate::escape::{escape_to, EscapeMode};
use crate::graph::BuildGraph;
use crate::label::Label;
use crate::output_file::OutputFile;
use raw_string::RawString;

pub fn write_root_file(graph: &BuildGraph, toolchain_files: &[(Label, String)]) -> RawString {
	let mut out = RawString::new();
	out.push_str("ninja_required_version = 1.7.2\n\n");

	let mut paths: Vec<&str> = toolchain_files.iter().map(|(_, path)| path.as_str()).collect();
	paths.sort();
	for path in paths {
		out.push_str("subninja ");
		escape_to(&mut out, path, EscapeMode::Ninja);
		out.push_str("\n");
	}
	out.push_str("\n");

	let mut outputs: Vec<&OutputFile> = graph
		.targets()
		.filter_map(|target| target.dependency_output_file.as_ref())
		.collect();
	outputs.sort();
	outputs.dedup();
	out.push_str("build all: phony");
	for output in outputs {
		out.push_str(" ");
		escape_to(&mut out, output.value(), EscapeMode::Ninja);
	}
	out.push_str("\n\ndefault all\n");
	out
}
