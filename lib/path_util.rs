//! Small helpers for build-relative path strings.

/// Normalize a build-relative path: collapse duplicate separators, drop `.`
/// components and resolve `..` against earlier components. Leading `..`
/// components are kept.
pub fn normalize(path: &str) -> String {
	let mut parts: Vec<&str> = Vec::new();
	for part in path.split('/') {
		match part {
			"" | "." => {}
			".." => {
				if parts.last().map_or(true, |p| *p == "..") {
					parts.push("..");
				} else {
					parts.pop();
				}
			}
			_ => parts.push(part),
		}
	}
	if parts.is_empty() {
		".".to_string()
	} else {
		parts.join("/")
	}
}

/// Rewrite `path` so it is relative to `dir`. Both are build-relative; `dir`
/// has no trailing slash and may be empty for the build root.
pub fn rebase(path: &str, dir: &str) -> String {
	if dir.is_empty() {
		return normalize(path);
	}
	let path = normalize(path);
	let mut path_parts: Vec<&str> = path.split('/').collect();
	let mut ups = 0;
	for (i, dir_part) in dir.split('/').enumerate() {
		if ups == 0 && path_parts.first() == Some(&dir_part) {
			path_parts.remove(0);
		} else {
			ups = dir.split('/').count() - i;
			break;
		}
	}
	let mut result = Vec::with_capacity(ups + path_parts.len());
	for _ in 0..ups {
		result.push("..");
	}
	result.extend(path_parts);
	if result.is_empty() {
		".".to_string()
	} else {
		result.join("/")
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_normalize() {
		assert_eq!(normalize("hello"), "hello");
		assert_eq!(normalize("./hello"), "hello");
		assert_eq!(normalize("foo//bar"), "foo/bar");
		assert_eq!(normalize("foo/./bar/."), "foo/bar");
		assert_eq!(normalize("foo/../bar"), "bar");
		assert_eq!(normalize("../foo"), "../foo");
		assert_eq!(normalize("foo/.."), ".");
		assert_eq!(normalize("."), ".");
	}

	#[test]
	fn test_rebase() {
		assert_eq!(rebase("obj/a/x.o", ""), "obj/a/x.o");
		assert_eq!(rebase("obj/a/x.o", "obj"), "a/x.o");
		assert_eq!(rebase("obj/a/x.o", "obj/a"), "x.o");
		assert_eq!(rebase("gen/x.cc", "obj/a"), "../../gen/x.cc");
		assert_eq!(rebase("obj/a", "obj/a"), ".");
	}
}
