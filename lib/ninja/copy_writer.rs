//! The writer for `copy` targets: one copy edge per source, grouped by the
//! target stamp.

use super::target_writer::TargetWriter;
use crate::error::{Error, Result};
use crate::output_file::OutputFile;
use crate::substitution::writer as substitution_writer;
use crate::tool::Tool;
use raw_string::RawString;

pub struct NinjaCopyTargetWriter<'a> {
	base: TargetWriter<'a>,
}

impl<'a> NinjaCopyTargetWriter<'a> {
	pub fn new(base: TargetWriter<'a>) -> NinjaCopyTargetWriter<'a> {
		NinjaCopyTargetWriter { base }
	}

	pub fn run(mut self) -> Result<RawString> {
		let target = self.base.target;
		let action = target.action.as_ref().ok_or_else(|| {
			Error::in_target(&target.label, "Copy target without an outputs pattern")
		})?;
		if action.outputs.patterns().len() != 1 {
			return Err(Error::in_target(
				&target.label,
				"Copy targets must have exactly one output pattern",
			));
		}

		let num_stamp_uses = target.sources.len().max(1);
		let order_only_deps = self.base.write_input_deps_stamp_and_get_dep(num_stamp_uses);

		let mut output_files: Vec<OutputFile> = Vec::new();
		let sources = target.sources.clone();
		for source in &sources {
			let outputs = substitution_writer::apply_list_to_source(target, source, &action.outputs);
			let output = outputs.into_iter().next().expect("one output pattern");
			self.base.write_compiler_build_line(
				&[source.clone()],
				&[],
				&order_only_deps,
				Tool::COPY,
				&[output.clone()],
			);
			self.base
				.scheduler
				.add_generated_file(&target.label, output.clone());
			output_files.push(output);
		}

		self.base.out.push_str("\n");
		self.base.write_stamp_for_target(&output_files, &[]);
		Ok(self.base.finish())
	}
}
