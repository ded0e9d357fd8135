//! The writer for `group` and bundle targets: a stamp over the deps.

use super::target_writer::TargetWriter;
use crate::error::Result;
use crate::output_file::OutputFile;
use raw_string::RawString;

pub struct NinjaGroupTargetWriter<'a> {
	base: TargetWriter<'a>,
}

impl<'a> NinjaGroupTargetWriter<'a> {
	pub fn new(base: TargetWriter<'a>) -> NinjaGroupTargetWriter<'a> {
		NinjaGroupTargetWriter { base }
	}

	pub fn run(mut self) -> Result<RawString> {
		let target = self.base.target;
		let files: Vec<OutputFile> = self
			.base
			.dep_targets(&self.base.resolved.linked_deps(target))
			.iter()
			.filter_map(|dep| dep.dependency_output_file.clone())
			.collect();
		let order_only: Vec<OutputFile> = self
			.base
			.dep_targets(&self.base.resolved.data_deps(target))
			.iter()
			.filter_map(|dep| dep.dependency_output_file.clone())
			.collect();
		self.base.write_stamp_for_target(&files, &order_only);
		Ok(self.base.finish())
	}
}
