//! Writes one toolchain's Ninja file: pools, tool rules, the action rules
//! collected from its targets, then the `include` lines pulling in each
//! per-target fragment.

use super::EmittedTarget;
use crate::escape::{escape_to, EscapeMode};
use crate::graph::BuildGraph;
use crate::substitution::writer as substitution_writer;
use crate::tool::{DepStyle, Tool};
use crate::toolchain::{Pool, Toolchain};
use raw_string::RawString;

pub fn write_toolchain_file(
	graph: &BuildGraph,
	toolchain: &Toolchain,
	targets: &[&EmittedTarget],
) -> RawString {
	let mut out = RawString::new();
	let prefix = super::rule_prefix_for_toolchain(graph, &toolchain.label);

	let mut pools: Vec<&Pool> = toolchain.pools().collect();
	pools.sort_by_key(|pool| pool.name.as_str());
	for pool in pools {
		out.push_str("pool ");
		out.push_str(&*pool.name);
		out.push_str("\n  depth = ");
		out.push_str(pool.depth.to_string().as_str());
		out.push_str("\n\n");
	}

	let mut tools: Vec<&Tool> = toolchain.tools().collect();
	tools.sort_by_key(|tool| tool.name());
	for tool in tools {
		write_tool_rule(&prefix, tool, &mut out);
	}

	for target in targets {
		if let Some(rule) = &target.rule {
			out.push_str(rule);
			out.push_str("\n");
		}
	}

	for target in targets {
		out.push_str("include ");
		escape_to(&mut out, &target.path, EscapeMode::Ninja);
		out.push_str("\n");
	}
	out
}

fn write_tool_rule(prefix: &str, tool: &Tool, out: &mut RawString) {
	if tool.command.is_empty() {
		return;
	}
	out.push_str("rule ");
	out.push_str(prefix);
	out.push_str(tool.name());
	out.push_str("\n  command = ");
	substitution_writer::write_with_ninja_variables(&tool.command, out);
	out.push_str("\n");
	if let Some(description) = &tool.description {
		out.push_str("  description = ");
		substitution_writer::write_with_ninja_variables(description, out);
		out.push_str("\n");
	}
	if let Some(depfile) = &tool.depfile {
		out.push_str("  depfile = ");
		substitution_writer::write_with_ninja_variables(depfile, out);
		out.push_str("\n");
		if let Some(c) = tool.as_c() {
			out.push_str("  deps = ");
			out.push_str(match c.depsformat {
				DepStyle::Gcc => "gcc",
				DepStyle::Msvc => "msvc",
			});
			out.push_str("\n");
		}
	}
	if let Some(rspfile) = &tool.rspfile {
		out.push_str("  rspfile = ");
		substitution_writer::write_with_ninja_variables(rspfile, out);
		out.push_str("\n");
		if let Some(content) = &tool.rspfile_content {
			out.push_str("  rspfile_content = ");
			substitution_writer::write_with_ninja_variables(content, out);
			out.push_str("\n");
		}
	}
	if tool.restat {
		out.push_str("  restat = 1\n");
	}
	if let Some(pool) = &tool.pool {
		out.push_str("  pool = ");
		out.push_str(&**pool);
		out.push_str("\n");
	}
	out.push_str("\n");
}
