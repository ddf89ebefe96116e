//! Import-source classification.

use super::types::SourceType;

/// Node.js builtin module names (bare, without the `node:` prefix).
pub const NODE_BUILTINS: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "worker_threads",
    "zlib",
];

/// Classify an import source string. Order matters: relative and
/// absolute prefixes win over everything, builtins over aliases,
/// aliases over packages.
pub fn classify(source: &str, alias_patterns: &[String]) -> SourceType {
    if source.starts_with("./") || source.starts_with("../") {
        return SourceType::Relative;
    }
    if source.starts_with('/') {
        return SourceType::Absolute;
    }
    if is_builtin(source) {
        return SourceType::Builtin;
    }
    if alias_patterns.iter().any(|p| source.starts_with(p.as_str())) {
        return SourceType::Alias;
    }
    SourceType::Package
}

pub fn is_builtin(source: &str) -> bool {
    if let Some(rest) = source.strip_prefix("node:") {
        return !rest.is_empty();
    }
    // Subpath imports like `fs/promises` are still the builtin.
    let head = source.split('/').next().unwrap_or(source);
    NODE_BUILTINS.contains(&head)
}

/// The package a bare specifier belongs to: first segment, or the first
/// two for scoped packages.
pub fn package_name(source: &str) -> &str {
    let mut parts = source.splitn(3, '/');
    let first = parts.next().unwrap_or(source);
    if first.starts_with('@') {
        if let Some(second) = parts.next() {
            let len = first.len() + 1 + second.len();
            return &source[..len];
        }
    }
    first
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_order() {
        let aliases = vec!["@/".to_string(), "~/".to_string()];
        assert_eq!(classify("./a", &aliases), SourceType::Relative);
        assert_eq!(classify("../a/b", &aliases), SourceType::Relative);
        assert_eq!(classify("/opt/x", &aliases), SourceType::Absolute);
        assert_eq!(classify("node:fs", &aliases), SourceType::Builtin);
        assert_eq!(classify("fs", &aliases), SourceType::Builtin);
        assert_eq!(classify("fs/promises", &aliases), SourceType::Builtin);
        assert_eq!(classify("@/components/Button", &aliases), SourceType::Alias);
        assert_eq!(classify("~/lib/util", &aliases), SourceType::Alias);
        assert_eq!(classify("react", &aliases), SourceType::Package);
        assert_eq!(classify("@scope/pkg/sub", &aliases), SourceType::Package);
    }

    #[test]
    fn scoped_package_name() {
        assert_eq!(package_name("react"), "react");
        assert_eq!(package_name("react-dom/client"), "react-dom");
        assert_eq!(package_name("@scope/pkg"), "@scope/pkg");
        assert_eq!(package_name("@scope/pkg/deep/path"), "@scope/pkg");
    }
}
