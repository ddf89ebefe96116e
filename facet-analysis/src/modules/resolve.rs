//! Module-path normalization and relative-import resolution.
//!
//! String-level only: the candidate set is the analyzed file map, never
//! the file system.

use facet_core::types::collections::FxHashSet;

/// Extensions probed when a relative import omits one, in priority order.
pub const RESOLVE_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".js", ".jsx", ".mts", ".cts", ".mjs", ".cjs"];

/// Collapse `.` and `..` segments of a slash path. Idempotent.
pub fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(segments.last(), Some(&s) if s != "..") {
                    segments.pop();
                } else if !absolute {
                    segments.push("..");
                }
            }
            s => segments.push(s),
        }
    }
    let joined = segments.join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

/// The directory part of a slash path ("" when there is none).
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// File name without its final extension.
pub fn stem(path: &str) -> &str {
    let base = path.rsplit('/').next().unwrap_or(path);
    match base.rfind('.') {
        Some(idx) if idx > 0 => &base[..idx],
        _ => base,
    }
}

/// Resolve a relative import against the known file set.
///
/// Tries the joined path verbatim, then with each extension appended,
/// then as a directory index. First match wins. `None` means the
/// normalized path names nothing we analyzed.
pub fn resolve_relative(from_file: &str, source: &str, known: &FxHashSet<String>) -> Option<String> {
    let joined = normalize(&format!("{}/{}", dirname(from_file), source));
    if known.contains(&joined) {
        return Some(joined);
    }
    for ext in RESOLVE_EXTENSIONS {
        let candidate = format!("{joined}{ext}");
        if known.contains(&candidate) {
            return Some(candidate);
        }
    }
    for ext in RESOLVE_EXTENSIONS {
        let candidate = format!("{joined}/index{ext}");
        if known.contains(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// The normalized join of an importing file's directory and a relative
/// source, used as a node id when resolution fails.
pub fn unresolved_target(from_file: &str, source: &str) -> String {
    normalize(&format!("{}/{}", dirname(from_file), source))
}
