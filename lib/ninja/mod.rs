//! Emission of the Ninja file tree from a resolved graph.
//!
//! > resolved [`BuildGraph`] → [`run_and_write_files()`] → `build.ninja`,
//! > per-toolchain `toolchain.ninja`, per-target `obj/<dir>/<name>.ninja`
//!
//! One writer task per target runs on the scheduler's worker pool; each
//! streams its fragment into a buffer and hands the bytes to a [`FileWriter`]
//! with atomic-replace semantics. The toolchain and root files are written on
//! the calling thread once the pool has drained, so every `include`d file
//! exists by the time it is referenced.

pub mod action_writer;
pub mod binary_writer;
pub mod build_writer;
pub mod copy_writer;
pub mod group_writer;
pub mod rust_writer;
pub mod target_writer;
pub mod toolchain_writer;

use self::action_writer::NinjaActionTargetWriter;
use self::binary_writer::NinjaBinaryTargetWriter;
use self::copy_writer::NinjaCopyTargetWriter;
use self::group_writer::NinjaGroupTargetWriter;
use self::rust_writer::NinjaRustBinaryTargetWriter;
use self::target_writer::TargetWriter;
use crate::error::{Error, Result};
use crate::graph::BuildGraph;
use crate::label::Label;
use crate::output_file::OutputFile;
use crate::scheduler::Scheduler;
use crate::source_file::SourceFileType;
use crate::target::{OutputType, Target};
use log::debug;
use raw_string::{RawStr, RawString};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Writes one emitted file. Implementations must replace the target path
/// atomically so a concurrent Ninja never sees a half-written file.
pub trait FileWriter: Send + Sync {
	fn write_file(&self, path: &str, data: &RawStr) -> io::Result<()>;
}

/// Writes below a root directory, via a temporary file and a rename.
pub struct DiskFileWriter {
	root: PathBuf,
}

impl DiskFileWriter {
	pub fn new(root: impl Into<PathBuf>) -> DiskFileWriter {
		DiskFileWriter { root: root.into() }
	}
}

impl FileWriter for DiskFileWriter {
	fn write_file(&self, path: &str, data: &RawStr) -> io::Result<()> {
		let full = self.root.join(path);
		if let Some(parent) = full.parent() {
			fs::create_dir_all(parent)?;
		}
		let tmp = full.with_extension("tmp");
		fs::write(&tmp, data.as_bytes())?;
		fs::rename(&tmp, &full)
	}
}

/// Collects writes in memory; the sink used by tests.
#[derive(Default)]
pub struct MemoryFileWriter {
	pub files: Mutex<BTreeMap<String, RawString>>,
}

impl FileWriter for MemoryFileWriter {
	fn write_file(&self, path: &str, data: &RawStr) -> io::Result<()> {
		self.files
			.lock()
			.unwrap()
			.insert(path.to_string(), data.to_owned());
		Ok(())
	}
}

/// One successfully written per-target file, plus the action rule the
/// toolchain file must define ahead of its `include`.
#[derive(Clone)]
pub struct EmittedTarget {
	pub label: Label,
	pub toolchain: Label,
	pub path: String,
	pub rule: Option<RawString>,
}

/// The build-relative path of a target's Ninja fragment.
pub fn ninja_file_for_target(target: &Target) -> String {
	format!(
		"{}/{}.ninja",
		target.label.target_out_dir(),
		target.label.name()
	)
}

/// The build-relative path of a toolchain's Ninja file.
pub fn toolchain_ninja_file(graph: &BuildGraph, toolchain: &Label) -> String {
	if toolchain == graph.default_toolchain_label() {
		"toolchain.ninja".to_string()
	} else {
		format!("{}/toolchain.ninja", toolchain.name())
	}
}

/// Rules of non-default toolchains are namespaced by prefixing their name.
pub fn rule_prefix_for_toolchain(graph: &BuildGraph, toolchain: &Label) -> String {
	if toolchain == graph.default_toolchain_label() {
		String::new()
	} else {
		format!("{}_", toolchain.name())
	}
}

/// Produce one target's Ninja fragment, dispatching to the writer matching
/// its output type. Returns the fragment and, for action targets, the rule
/// definition destined for the toolchain file.
pub fn write_target_ninja(
	graph: &BuildGraph,
	target: &Target,
	scheduler: &Scheduler,
) -> Result<(RawString, Option<RawString>)> {
	let used = target.source_types_used();
	if used.mixed_source_used() {
		return Err(Error::in_target(
			&target.label,
			"Mixed sources: at most one of C-family, Rust and Go sources may appear in one target",
		));
	}
	if used.swift_source_used()
		&& (used.get(SourceFileType::C)
			|| used.get(SourceFileType::Cpp)
			|| used.get(SourceFileType::ObjC)
			|| used.get(SourceFileType::ObjCpp)
			|| used.get(SourceFileType::Asm))
	{
		return Err(Error::in_target(
			&target.label,
			"Swift sources may not mix with C-family sources in one target",
		));
	}

	let base = TargetWriter::new(graph, target, scheduler)?;
	base.record_unknown_generated_inputs();
	match target.output_type {
		OutputType::Action | OutputType::ActionForEach => {
			let (fragment, rule) = NinjaActionTargetWriter::new(base).run()?;
			Ok((fragment, Some(rule)))
		}
		OutputType::Copy => Ok((NinjaCopyTargetWriter::new(base).run()?, None)),
		OutputType::Group | OutputType::Bundle => {
			Ok((NinjaGroupTargetWriter::new(base).run()?, None))
		}
		_ if rust_writer::is_rust_target(target) => {
			Ok((NinjaRustBinaryTargetWriter::new(base)?.run()?, None))
		}
		_ => Ok((NinjaBinaryTargetWriter::new(base)?.run()?, None)),
	}
}

/// Emit the whole tree: schedule one writer task per target, wait for the
/// pool to drain, validate unknown generated inputs, then write the
/// toolchain files and the root file.
pub fn run_and_write_files(
	graph: &Arc<BuildGraph>,
	scheduler: &Arc<Scheduler>,
	file_writer: &Arc<dyn FileWriter>,
) -> Result<()> {
	let emitted: Arc<Mutex<Vec<EmittedTarget>>> = Arc::new(Mutex::new(Vec::new()));

	for target in graph.targets() {
		let label = target.label.clone();
		let graph = Arc::clone(graph);
		let scheduler_for_task = Arc::clone(scheduler);
		let file_writer = Arc::clone(file_writer);
		let emitted = Arc::clone(&emitted);
		scheduler.increment_work_count();
		scheduler.schedule_work(move || {
			let target = graph.target(&label).expect("scheduled target exists");
			match write_target_ninja(&graph, target, &scheduler_for_task) {
				Ok((fragment, rule)) => {
					let path = ninja_file_for_target(target);
					match file_writer.write_file(&path, &fragment) {
						Ok(()) => {
							if scheduler_for_task.verbose_logging() {
								scheduler_for_task.log("WRITE", &path);
							}
							debug!(target: "ninjagen::ninja", "wrote {}", path);
							emitted.lock().unwrap().push(EmittedTarget {
								label: label.clone(),
								toolchain: target.toolchain.clone(),
								path,
								rule,
							});
						}
						Err(err) => scheduler_for_task.fail_with_error(err.into()),
					}
				}
				Err(err) => scheduler_for_task.fail_with_error(err),
			}
			scheduler_for_task.decrement_work_count();
		});
	}

	scheduler.wait_for_pool_tasks();

	if let Err(err) = check_unknown_generated_inputs(scheduler) {
		scheduler.fail_with_error(err);
	}
	if scheduler.is_failed() {
		return Err(scheduler
			.first_error()
			.unwrap_or_else(|| Error::new("Ninja emission failed")));
	}

	let mut emitted: Vec<EmittedTarget> = emitted.lock().unwrap().clone();
	emitted.sort_by(|a, b| a.label.cmp(&b.label));

	let mut toolchain_files: Vec<(Label, String)> = Vec::new();
	for toolchain in graph.toolchains() {
		let targets: Vec<&EmittedTarget> = emitted
			.iter()
			.filter(|t| t.toolchain == toolchain.label)
			.collect();
		let path = toolchain_ninja_file(graph, &toolchain.label);
		let content = toolchain_writer::write_toolchain_file(graph, toolchain, &targets);
		file_writer.write_file(&path, &content)?;
		if scheduler.verbose_logging() {
			scheduler.log("WRITE", &path);
		}
		toolchain_files.push((toolchain.label.clone(), path));
	}

	let root = build_writer::write_root_file(graph, &toolchain_files);
	file_writer.write_file("build.ninja", &root)?;
	if scheduler.verbose_logging() {
		scheduler.log("WRITE", "build.ninja");
	}
	Ok(())
}

/// After the pool drains: every recorded build-dir input that was not
/// produced by `write_file` but is generated by some target means a missing
/// dependency, and we can name both sides.
pub fn check_unknown_generated_inputs(scheduler: &Scheduler) -> Result<()> {
	let written = scheduler.written_files();
	for (file, consumer) in scheduler.unknown_generated_inputs() {
		if written.contains(&file) {
			continue;
		}
		let as_output = OutputFile::from_source_file(&file);
		if let Some(generator) = scheduler.is_file_generated_by_target(&as_output) {
			return Err(Error::in_target(
				&consumer,
				format!(
					"Input {} is generated by {}, which is not a dependency of this target",
					file.value(),
					generator
				),
			)
			.with_help(
				"Either add the generating target to the deps, or make the input a\n\
				 source of the generating target instead.",
			));
		}
	}
	Ok(())
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::source_file::SourceFile;
	use pretty_assertions::assert_eq;
	use crate::substitution::{SubstitutionList, SubstitutionPattern};
	use crate::target::{ActionValues, RustValues, SwiftValues};
	use crate::tool::{CTool, CrateType, PchType, RustTool, Tool};
	use crate::toolchain::{Pool, Toolchain};

	fn label(s: &str) -> Label {
		Label::parse(s).unwrap()
	}

	fn pattern(s: &str) -> SubstitutionPattern {
		SubstitutionPattern::parse(s).unwrap()
	}

	fn list(templates: &[&str]) -> SubstitutionList {
		SubstitutionList::parse(templates).unwrap()
	}

	fn source(s: &str) -> SourceFile {
		SourceFile::new(format!("//{}", s))
	}

	fn test_toolchain_with_cxx_pch(pch: PchType) -> Toolchain {
		let mut tc = Toolchain::new(label("//tc:default"));

		let mut cc = Tool::c(Tool::CC, CTool::default());
		cc.command = pattern("clang -c {{source}} -o {{output}}");
		cc.outputs = list(&["obj/{{source_root_relative_dir}}/{{label_name}}.{{source_name_part}}.o"]);
		tc.add_tool(cc).unwrap();

		let mut cxx = Tool::c(
			Tool::CXX,
			CTool {
				precompiled_header_type: pch,
				..CTool::default()
			},
		);
		cxx.command = pattern("clang++ {{cflags_cc}} {{module_deps}} -c {{source}} -o {{output}}");
		cxx.outputs = list(&["obj/{{source_root_relative_dir}}/{{label_name}}.{{source_name_part}}.o"]);
		tc.add_tool(cxx).unwrap();

		let mut cxx_module = Tool::c(Tool::CXX_MODULE, CTool::default());
		cxx_module.command = pattern(
			"clang++ {{cflags_cc}} {{module_deps_no_self}} -x c++-module -c {{source}} -o {{output}}",
		);
		cxx_module.outputs = list(&["obj/{{source_root_relative_dir}}/{{source_name_part}}.pcm"]);
		tc.add_tool(cxx_module).unwrap();

		let mut link = Tool::c(Tool::LINK, CTool::default());
		link.command = pattern(
			"clang {{ldflags}} {{inputs}} -o {{output}} {{libs}} {{frameworks}} {{swiftmodules}} {{solibs}} {{rlibs}}",
		);
		link.outputs = list(&["{{output_dir}}/{{target_output_name}}{{output_extension}}"]);
		link.default_output_dir = Some(pattern("{{root_out_dir}}"));
		tc.add_tool(link).unwrap();

		let mut solink = Tool::c(
			Tool::SOLINK,
			CTool {
				link_output: Some(pattern(
					"{{output_dir}}/{{target_output_name}}{{output_extension}}",
				)),
				depend_output: Some(pattern(
					"{{output_dir}}/{{target_output_name}}{{output_extension}}.TOC",
				)),
				..CTool::default()
			},
		);
		solink.command = pattern("clang -shared {{ldflags}} {{inputs}} -o {{output}} {{libs}}");
		solink.outputs = list(&[
			"{{output_dir}}/{{target_output_name}}{{output_extension}}",
			"{{output_dir}}/{{target_output_name}}{{output_extension}}.TOC",
		]);
		solink.output_prefix = "lib".to_string();
		solink.default_output_extension = ".so".to_string();
		solink.default_output_dir = Some(pattern("{{root_out_dir}}"));
		tc.add_tool(solink).unwrap();

		let mut alink = Tool::c(Tool::ALINK, CTool::default());
		alink.command = pattern("ar rcs {{output}} {{inputs}} {{arflags}}");
		alink.outputs = list(&["{{output_dir}}/{{target_output_name}}{{output_extension}}"]);
		alink.output_prefix = "lib".to_string();
		alink.default_output_extension = ".a".to_string();
		alink.default_output_dir = Some(pattern("{{target_out_dir}}"));
		tc.add_tool(alink).unwrap();

		let mut stamp = Tool::general(Tool::STAMP);
		stamp.command = pattern("touch {{output}}");
		tc.add_tool(stamp).unwrap();

		let mut copy = Tool::general(Tool::COPY);
		copy.command = pattern("cp {{source}} {{output}}");
		tc.add_tool(copy).unwrap();

		let mut swift = Tool::general(Tool::SWIFT);
		swift.command = pattern("swiftc -module-name {{module_name}} {{swiftflags}} {{source}}");
		swift.outputs = list(&[
			"{{target_out_dir}}/{{module_name}}.swiftmodule",
			"{{target_out_dir}}/{{module_name}}.h",
		]);
		swift.partial_outputs = list(&["{{target_out_dir}}/{{source_name_part}}.o"]);
		tc.add_tool(swift).unwrap();

		let mut rust_rlib = Tool::rust(Tool::RUST_RLIB, RustTool { crate_type: CrateType::Rlib });
		rust_rlib.command =
			pattern("rustc --crate-name {{crate_name}} {{source}} {{rustflags}} {{rustdeps}} -o {{output}}");
		rust_rlib.outputs = list(&["{{output_dir}}/lib{{crate_name}}{{output_extension}}"]);
		rust_rlib.default_output_extension = ".rlib".to_string();
		rust_rlib.default_output_dir = Some(pattern("{{target_out_dir}}"));
		tc.add_tool(rust_rlib).unwrap();

		let mut rust_staticlib =
			Tool::rust(Tool::RUST_STATICLIB, RustTool { crate_type: CrateType::StaticLib });
		rust_staticlib.command =
			pattern("rustc --crate-name {{crate_name}} {{source}} {{rustflags}} {{rustdeps}} -o {{output}}");
		rust_staticlib.outputs = list(&["{{output_dir}}/lib{{crate_name}}{{output_extension}}"]);
		rust_staticlib.default_output_extension = ".a".to_string();
		rust_staticlib.default_output_dir = Some(pattern("{{target_out_dir}}"));
		tc.add_tool(rust_staticlib).unwrap();

		tc
	}

	fn test_toolchain() -> Toolchain {
		test_toolchain_with_cxx_pch(PchType::None)
	}

	fn graph_with_toolchain(tc: Toolchain) -> BuildGraph {
		let mut graph = BuildGraph::new(label("//tc:default"));
		graph.add_toolchain(tc);
		graph
	}

	fn new_target(name: &str, ty: OutputType, sources: &[&str]) -> Target {
		let mut target = Target::new(label(name), ty, label("//tc:default"));
		target.sources = sources.iter().map(|s| source(s)).collect();
		target
	}

	fn emit(graph: &BuildGraph, name: &str) -> (String, Arc<Scheduler>) {
		let scheduler = Scheduler::with_num_threads(1);
		scheduler.suppress_output_for_testing(true);
		let target = graph.target(&label(name)).unwrap();
		let (fragment, _) = write_target_ninja(graph, target, &scheduler).unwrap();
		let text = String::from_utf8(fragment.into_bytes()).unwrap();
		(text, scheduler)
	}

	#[test]
	fn s1_trivial_executable() {
		let mut graph = graph_with_toolchain(test_toolchain());
		graph.add_target(new_target("//a:hello", OutputType::Executable, &["a/hello.c"]));
		graph.resolve_outputs().unwrap();

		let (text, scheduler) = emit(&graph, "//a:hello");
		assert!(text.contains("build obj/a/hello.hello.o: cc a/hello.c\n"), "{}", text);
		assert!(text.contains("build hello: link obj/a/hello.hello.o\n"), "{}", text);
		assert!(!scheduler.is_failed());
	}

	#[test]
	fn s2_msvc_pch_object_is_compiled_and_linked() {
		let mut graph = graph_with_toolchain(test_toolchain_with_cxx_pch(PchType::Msvc));
		let mut target = new_target("//a:tgt", OutputType::Executable, &["a/main.cc"]);
		target.config.precompiled_header = "a/pch.h".to_string();
		target.config.precompiled_source = Some(source("a/pch.cc"));
		graph.add_target(target);
		graph.resolve_outputs().unwrap();

		let (text, _) = emit(&graph, "//a:tgt");
		assert!(
			text.contains("build obj/a/tgt.precompile.cc.obj: cxx a/pch.cc\n"),
			"{}",
			text
		);
		assert!(text.contains("  cflags_cc = ${cflags_cc} /Yca/pch.h\n"), "{}", text);
		// The PCH object is an implicit dep of matching compiles and an
		// explicit input of the link.
		assert!(
			text.contains("build obj/a/tgt.main.o: cxx a/main.cc | obj/a/tgt.precompile.cc.obj\n"),
			"{}",
			text
		);
		assert!(
			text.contains("build tgt: link obj/a/tgt.main.o obj/a/tgt.precompile.cc.obj\n"),
			"{}",
			text
		);
	}

	#[test]
	fn gcc_pch_output_is_not_linked() {
		let mut graph = graph_with_toolchain(test_toolchain_with_cxx_pch(PchType::Gcc));
		let mut target = new_target("//a:tgt", OutputType::Executable, &["a/main.cc"]);
		target.config.precompiled_header = "a/pch.h".to_string();
		target.config.precompiled_source = Some(source("a/pch.cc"));
		target.config.cflags_cc = vec!["-std=c++17".to_string()];
		graph.add_target(target);
		graph.resolve_outputs().unwrap();

		let (text, _) = emit(&graph, "//a:tgt");
		assert!(
			text.contains("build obj/a/tgt.precompile.cc.gch: cxx a/pch.cc\n"),
			"{}",
			text
		);
		assert!(text.contains("  cflags_cc = -std=c++17 -x c++-header\n"), "{}", text);
		assert!(
			text.contains("build obj/a/tgt.main.o: cxx a/main.cc | obj/a/tgt.precompile.cc.gch\n"),
			"{}",
			text
		);
		assert!(text.contains("build tgt: link obj/a/tgt.main.o\n"), "{}", text);
	}

	#[test]
	fn s3_duplicate_object_files_fail() {
		let mut tc = Toolchain::new(label("//tc:default"));
		let mut cc = Tool::c(Tool::CC, CTool::default());
		cc.command = pattern("clang -c {{source}} -o {{output}}");
		cc.outputs = list(&["obj/{{source_name_part}}.o"]);
		tc.add_tool(cc).unwrap();
		let mut link = Tool::c(Tool::LINK, CTool::default());
		link.command = pattern("clang {{inputs}} -o {{output}}");
		link.outputs = list(&["{{output_dir}}/{{target_output_name}}{{output_extension}}"]);
		link.default_output_dir = Some(pattern("{{root_out_dir}}"));
		tc.add_tool(link).unwrap();
		let mut stamp = Tool::general(Tool::STAMP);
		stamp.command = pattern("touch {{output}}");
		tc.add_tool(stamp).unwrap();

		let mut graph = graph_with_toolchain(tc);
		graph.add_target(new_target("//a:dup", OutputType::Executable, &["a/x.c", "b/x.c"]));
		graph.resolve_outputs().unwrap();

		let (text, scheduler) = emit(&graph, "//a:dup");
		assert!(scheduler.is_failed());
		let err = scheduler.first_error().unwrap();
		assert!(err.message.contains("obj/x.o"), "{}", err);
		assert_eq!(err.origin, Some(label("//a:dup")));
		assert!(!text.contains(": link"), "no link edge expected:\n{}", text);
	}

	#[test]
	fn s4_shared_library_link_vs_dependency_output() {
		let mut graph = graph_with_toolchain(test_toolchain());
		let foo = new_target("//s:foo", OutputType::SharedLibrary, &["s/foo.cc"]);
		let mut bar = new_target("//a:bar", OutputType::Executable, &["a/bar.cc"]);
		bar.private_deps = vec![label("//s:foo")];
		graph.add_target(foo);
		graph.add_target(bar);
		graph.resolve_outputs().unwrap();

		let foo = graph.target(&label("//s:foo")).unwrap();
		assert_eq!(foo.link_output_file, Some(OutputFile::new("libfoo.so")));
		assert_eq!(foo.dependency_output_file, Some(OutputFile::new("libfoo.so.TOC")));

		let (text, _) = emit(&graph, "//a:bar");
		assert!(
			text.contains("build bar: link obj/a/bar.bar.o libfoo.so | libfoo.so.TOC\n"),
			"{}",
			text
		);
		assert!(text.contains("  solibs = libfoo.so\n"), "{}", text);
	}

	#[test]
	fn s5_module_deps_self_vs_non_self() {
		let mut graph = graph_with_toolchain(test_toolchain());
		let mut a = new_target("//a:a", OutputType::Executable, &["a/a.modulemap", "a/a.cc"]);
		a.private_deps = vec![label("//b:b")];
		let b = new_target("//b:b", OutputType::SourceSet, &["b/b.modulemap"]);
		graph.add_target(a);
		graph.add_target(b);
		graph.resolve_outputs().unwrap();

		let (text, _) = emit(&graph, "//a:a");
		assert!(
			text.contains(
				"module_deps = -Xclang -fmodules-embed-all-files -fmodule-file=obj/a/a.pcm -fmodule-file=obj/b/b.pcm\n"
			),
			"{}",
			text
		);
		assert!(
			text.contains(
				"module_deps_no_self = -Xclang -fmodules-embed-all-files -fmodule-file=obj/b/b.pcm\n"
			),
			"{}",
			text
		);
		// The module's own compile must not depend on its own pcm.
		assert!(
			text.contains("build obj/a/a.pcm: cxx_module a/a.modulemap | obj/b/b.pcm"),
			"{}",
			text
		);
		assert!(
			text.contains("build obj/a/a.a.o: cxx a/a.cc | obj/a/a.pcm obj/b/b.pcm"),
			"{}",
			text
		);
	}

	#[test]
	fn s6_transitive_rlibs_reach_the_final_link() {
		let mut graph = graph_with_toolchain(test_toolchain());
		for (name, crate_name) in &[("//r:r1", "r1"), ("//r:r2", "r2")] {
			let mut rlib = new_target(name, OutputType::RustLibrary, &[]);
			rlib.sources = vec![source(&format!("r/{}.rs", crate_name))];
			rlib.rust = Some(RustValues {
				crate_name: crate_name.to_string(),
				crate_type: CrateType::Rlib,
				crate_root: source(&format!("r/{}.rs", crate_name)),
			});
			graph.add_target(rlib);
		}
		let mut sl = new_target("//r:sl", OutputType::StaticLibrary, &["r/sl.rs"]);
		sl.rust = Some(RustValues {
			crate_name: "sl".to_string(),
			crate_type: CrateType::StaticLib,
			crate_root: source("r/sl.rs"),
		});
		sl.public_deps = vec![label("//r:r1"), label("//r:r2")];
		graph.add_target(sl);
		let mut app = new_target("//a:app", OutputType::Executable, &["a/app.cc"]);
		app.private_deps = vec![label("//r:sl")];
		graph.add_target(app);
		graph.resolve_outputs().unwrap();

		let (text, _) = emit(&graph, "//a:app");
		assert!(
			text.contains("build app: link obj/a/app.app.o obj/r/libsl.a | obj/r/libr1.rlib obj/r/libr2.rlib\n"),
			"{}",
			text
		);
		assert!(text.contains("  rlibs = obj/r/libr1.rlib obj/r/libr2.rlib\n"), "{}", text);
	}

	#[test]
	fn rust_writer_externs_direct_deps() {
		let mut graph = graph_with_toolchain(test_toolchain());
		let mut inner = new_target("//r:inner", OutputType::RustLibrary, &["r/inner.rs"]);
		inner.rust = Some(RustValues {
			crate_name: "inner".to_string(),
			crate_type: CrateType::Rlib,
			crate_root: source("r/inner.rs"),
		});
		graph.add_target(inner);
		let mut outer = new_target("//r:outer", OutputType::RustLibrary, &["r/outer.rs", "r/util.rs"]);
		outer.rust = Some(RustValues {
			crate_name: "outer".to_string(),
			crate_type: CrateType::Rlib,
			crate_root: source("r/outer.rs"),
		});
		outer.public_deps = vec![label("//r:inner")];
		graph.add_target(outer);
		graph.resolve_outputs().unwrap();

		let (text, _) = emit(&graph, "//r:outer");
		assert!(text.contains("crate_name = outer\n"), "{}", text);
		assert!(
			text.contains("build obj/r/libouter.rlib: rust_rlib r/outer.rs | r/util.rs obj/r/libinner.rlib\n"),
			"{}",
			text
		);
		assert!(
			text.contains("  rustdeps = -Ldependency=obj/r --extern inner=obj/r/libinner.rlib\n"),
			"{}",
			text
		);
	}

	#[test]
	fn swift_sources_compile_as_one_unit() {
		let mut graph = graph_with_toolchain(test_toolchain());
		let mut module = new_target("//s:mod", OutputType::SourceSet, &["s/one.swift", "s/two.swift"]);
		module.swift = Some(SwiftValues {
			module_name: "One".to_string(),
			module_output_file: OutputFile::new("obj/s/One.swiftmodule"),
		});
		graph.add_target(module);
		graph.resolve_outputs().unwrap();

		let (text, _) = emit(&graph, "//s:mod");
		assert!(text.contains("module_name = One\n"), "{}", text);
		assert!(
			text.contains("build obj/s/One.swiftmodule: swift s/one.swift s/two.swift\n"),
			"{}",
			text
		);
		// Additional outputs are grouped behind the swiftmodule.
		assert!(
			text.contains("build obj/s/One.h obj/s/one.o obj/s/two.o: stamp obj/s/One.swiftmodule\n"),
			"{}",
			text
		);
		// Partial outputs with object extensions count as the object files.
		assert!(
			text.contains("build obj/s/mod.stamp: stamp obj/s/one.o obj/s/two.o\n"),
			"{}",
			text
		);
	}

	#[test]
	fn source_set_emits_stamp_not_link() {
		let mut graph = graph_with_toolchain(test_toolchain());
		graph.add_target(new_target("//a:set", OutputType::SourceSet, &["a/one.c", "a/two.c"]));
		graph.resolve_outputs().unwrap();

		let (text, _) = emit(&graph, "//a:set");
		assert!(
			text.contains("build obj/a/set.stamp: stamp obj/a/set.one.o obj/a/set.two.o\n"),
			"{}",
			text
		);
		assert!(!text.contains(": link"), "{}", text);
	}

	#[test]
	fn input_deps_are_stamped_when_reused() {
		let mut graph = graph_with_toolchain(test_toolchain());
		for name in &["//g:gen1", "//g:gen2"] {
			let mut action = new_target(name, OutputType::Action, &[]);
			action.action = Some(ActionValues {
				script: Some(source("tools/gen.py")),
				args: SubstitutionList::default(),
				outputs: list(&["{{target_gen_dir}}/{{target_output_name}}.h"]),
				depfile: None,
				description: None,
			});
			graph.add_target(action);
		}
		let mut app = new_target("//a:app", OutputType::Executable, &["a/one.c", "a/two.c"]);
		app.private_deps = vec![label("//g:gen1"), label("//g:gen2")];
		graph.add_target(app);
		graph.resolve_outputs().unwrap();

		let (text, _) = emit(&graph, "//a:app");
		assert!(
			text.contains("build obj/a/app.inputdeps.stamp: stamp obj/g/gen1.stamp obj/g/gen2.stamp\n"),
			"{}",
			text
		);
		assert!(
			text.contains("build obj/a/app.one.o: cc a/one.c || obj/a/app.inputdeps.stamp\n"),
			"{}",
			text
		);
	}

	#[test]
	fn action_foreach_writes_rule_edges_and_stamp() {
		let mut graph = graph_with_toolchain(test_toolchain());
		let mut gen = new_target("//a:gen", OutputType::ActionForEach, &["a/one.txt", "a/two.txt"]);
		gen.action = Some(ActionValues {
			script: Some(source("tools/gen.py")),
			args: list(&["-i", "{{source}}", "-o", "{{source_out_dir}}/{{source_name_part}}.h"]),
			outputs: list(&["{{source_out_dir}}/{{source_name_part}}.h"]),
			depfile: None,
			description: Some("GEN ${in}".to_string()),
		});
		graph.add_target(gen);
		graph.resolve_outputs().unwrap();

		let scheduler = Scheduler::with_num_threads(1);
		scheduler.suppress_output_for_testing(true);
		let target = graph.target(&label("//a:gen")).unwrap();
		let (fragment, rule) = write_target_ninja(&graph, target, &scheduler).unwrap();
		let text = String::from_utf8(fragment.into_bytes()).unwrap();
		let rule = String::from_utf8(rule.unwrap().into_bytes()).unwrap();

		assert!(rule.starts_with("rule a_gen__rule\n"), "{}", rule);
		assert!(
			rule.contains("  command = tools/gen.py -i ${in} -o ${source_out_dir}/${source_name_part}.h\n"),
			"{}",
			rule
		);
		assert!(
			text.contains("build obj/a/one.h: a_gen__rule a/one.txt | tools/gen.py\n"),
			"{}",
			text
		);
		assert!(text.contains("  source_out_dir = obj/a\n"), "{}", text);
		assert!(text.contains("  source_name_part = one\n"), "{}", text);
		assert!(
			text.contains("build obj/a/gen.stamp: stamp obj/a/one.h obj/a/two.h\n"),
			"{}",
			text
		);
		assert_eq!(
			scheduler.is_file_generated_by_target(&OutputFile::new("obj/a/one.h")),
			Some(label("//a:gen"))
		);
	}

	#[test]
	fn copy_target_copies_each_source() {
		let mut graph = graph_with_toolchain(test_toolchain());
		let mut copy = new_target("//a:res", OutputType::Copy, &["a/data.txt"]);
		copy.action = Some(ActionValues {
			outputs: list(&["{{target_out_dir}}/{{source_file_part}}"]),
			..ActionValues::default()
		});
		graph.add_target(copy);
		graph.resolve_outputs().unwrap();

		let (text, _) = emit(&graph, "//a:res");
		assert!(text.contains("build obj/a/data.txt: copy a/data.txt\n"), "{}", text);
		assert!(text.contains("build obj/a/res.stamp: stamp obj/a/data.txt\n"), "{}", text);
	}

	#[test]
	fn mixed_language_targets_are_rejected() {
		let mut graph = graph_with_toolchain(test_toolchain());
		graph.add_target(new_target("//a:bad", OutputType::Executable, &["a/x.c", "a/y.rs"]));
		graph.resolve_outputs().unwrap();

		let scheduler = Scheduler::with_num_threads(1);
		scheduler.suppress_output_for_testing(true);
		let target = graph.target(&label("//a:bad")).unwrap();
		assert!(write_target_ninja(&graph, target, &scheduler).is_err());
	}

	#[test]
	fn toolchain_file_defines_rules_pools_and_includes() {
		let mut tc = test_toolchain();
		tc.add_pool(Pool { name: "link_pool".to_string(), depth: 4 });
		let graph = graph_with_toolchain(tc);
		let toolchain = graph.toolchain(&label("//tc:default")).unwrap();
		let emitted = vec![
			EmittedTarget {
				label: label("//a:hello"),
				toolchain: label("//tc:default"),
				path: "obj/a/hello.ninja".to_string(),
				rule: None,
			},
			EmittedTarget {
				label: label("//a:gen"),
				toolchain: label("//tc:default"),
				path: "obj/a/gen.ninja".to_string(),
				rule: Some(RawString::from("rule a_gen__rule\n  command = tools/gen.py\n".to_string())),
			},
		];
		let refs: Vec<&EmittedTarget> = emitted.iter().collect();
		let text = String::from_utf8(
			toolchain_writer::write_toolchain_file(&graph, toolchain, &refs).into_bytes(),
		)
		.unwrap();

		assert!(text.contains("pool link_pool\n  depth = 4\n"), "{}", text);
		assert!(text.contains("rule cc\n  command = clang -c ${in} -o ${out}\n"), "{}", text);
		assert!(text.contains("rule a_gen__rule\n"), "{}", text);
		assert!(text.contains("include obj/a/hello.ninja\n"), "{}", text);
		assert!(text.contains("include obj/a/gen.ninja\n"), "{}", text);
		// Rules come before any include.
		assert!(text.find("rule cc").unwrap() < text.find("include").unwrap());
	}

	#[test]
	fn full_pipeline_is_deterministic() {
		let mut graph = graph_with_toolchain(test_toolchain());
		graph.add_target(new_target("//a:hello", OutputType::Executable, &["a/hello.c"]));
		let mut util = new_target("//b:util", OutputType::StaticLibrary, &["b/util.c"]);
		util.output_name = "butil".to_string();
		graph.add_target(util);
		graph.resolve_outputs().unwrap();
		let graph = Arc::new(graph);

		let run = || {
			let scheduler = Scheduler::with_num_threads(4);
			scheduler.suppress_output_for_testing(true);
			let writer = Arc::new(MemoryFileWriter::default());
			let as_file_writer: Arc<dyn FileWriter> = writer.clone();
			run_and_write_files(&graph, &scheduler, &as_file_writer).unwrap();
			scheduler.shutdown();
			let files = writer.files.lock().unwrap();
			files
				.iter()
				.map(|(k, v)| (k.clone(), String::from_utf8(v.as_bytes().to_vec()).unwrap()))
				.collect::<BTreeMap<String, String>>()
		};

		let first = run();
		let second = run();
		assert_eq!(first, second);

		let paths: Vec<&String> = first.keys().collect();
		assert_eq!(
			paths,
			vec!["build.ninja", "obj/a/hello.ninja", "obj/b/util.ninja", "toolchain.ninja"]
		);
		let toolchain = &first["toolchain.ninja"];
		assert!(toolchain.contains("include obj/a/hello.ninja\n"), "{}", toolchain);
		assert!(toolchain.contains("include obj/b/util.ninja\n"), "{}", toolchain);
		let root = &first["build.ninja"];
		assert!(root.contains("ninja_required_version = 1.7.2\n"), "{}", root);
		assert!(root.contains("subninja toolchain.ninja\n"), "{}", root);
		assert!(root.contains("build all: phony hello obj/b/libbutil.a\n"), "{}", root);
	}

	#[test]
	fn unknown_generated_input_names_both_targets() {
		let mut graph = graph_with_toolchain(test_toolchain());
		let mut gen = new_target("//g:gen", OutputType::Action, &[]);
		gen.action = Some(ActionValues {
			script: Some(source("tools/gen.py")),
			args: SubstitutionList::default(),
			outputs: list(&["{{target_gen_dir}}/generated.c"]),
			depfile: None,
			description: None,
		});
		graph.add_target(gen);
		// Consumes the generated file without depending on the action.
		graph.add_target(new_target("//a:app", OutputType::Executable, &["gen/g/generated.c"]));
		graph.resolve_outputs().unwrap();
		let graph = Arc::new(graph);

		let scheduler = Scheduler::with_num_threads(2);
		scheduler.suppress_output_for_testing(true);
		let writer: Arc<dyn FileWriter> = Arc::new(MemoryFileWriter::default());
		let err = run_and_write_files(&graph, &scheduler, &writer).unwrap_err();
		scheduler.shutdown();
		assert!(err.message.contains("//g:gen"), "{}", err);
		assert_eq!(err.origin, Some(label("//a:app")));
	}
}
