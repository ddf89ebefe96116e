//! Cross-file unused-import/export and orphan-file analysis.

use std::collections::VecDeque;

use facet_core::types::ast::{AstNode, SourceLocation};
use facet_core::types::collections::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use super::resolve::{self, resolve_relative, stem};
use super::types::{ExportKind, ImportKind, ModuleInfo, SourceType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedImportFinding {
    pub file: String,
    pub local: String,
    pub imported: String,
    pub source: String,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedExportFinding {
    pub file: String,
    pub name: String,
    pub is_function: bool,
    pub location: SourceLocation,
}

/// Combined result of the cross-file reference analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnusedAnalysis {
    pub unused_imports: Vec<UnusedImportFinding>,
    pub unused_exports: Vec<UnusedExportFinding>,
    pub unused_exported_functions: Vec<UnusedExportFinding>,
    pub orphan_files: Vec<String>,
}

/// Exported names reserved by framework conventions (Next.js app
/// router and data-fetching). Never reported as unused.
const RESERVED_EXPORT_NAMES: &[&str] = &[
    "generateMetadata",
    "generateStaticParams",
    "generateViewport",
    "metadata",
    "viewport",
    "revalidate",
    "dynamic",
    "dynamicParams",
    "fetchCache",
    "runtime",
    "preferredRegion",
    "config",
    "middleware",
    "getServerSideProps",
    "getStaticProps",
    "getStaticPaths",
];

/// HTTP verb exports, reserved in `route` and `middleware` files.
const HTTP_VERB_EXPORTS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];

/// File stems whose every export is claimed by the framework.
const RESERVED_FILE_STEMS: &[&str] = &[
    "page", "layout", "template", "loading", "error", "not-found", "middleware", "route",
];

/// Run the full cross-file analysis over every analyzed module.
pub fn analyze(
    modules: &FxHashMap<String, ModuleInfo>,
    asts: &FxHashMap<String, AstNode>,
) -> UnusedAnalysis {
    let mut files: Vec<&String> = modules.keys().collect();
    files.sort();

    let mut unused_imports = Vec::new();
    for file in &files {
        let module = &modules[*file];
        if let Some(ast) = asts.get(*file) {
            unused_imports.extend(find_unused_imports(module, ast));
        }
    }

    let imported_names = build_reverse_index(modules);
    let mut unused_exports = Vec::new();
    for file in &files {
        let module = &modules[*file];
        unused_exports.extend(find_unused_exports(module, &imported_names));
    }
    let unused_exported_functions: Vec<UnusedExportFinding> = unused_exports
        .iter()
        .filter(|f| f.is_function)
        .cloned()
        .collect();

    UnusedAnalysis {
        unused_imports,
        unused_exports,
        unused_exported_functions,
        orphan_files: find_orphans(modules),
    }
}

/// Imported locals with no reference in the rest of the file.
///
/// One walk over the AST, skipping import-declaration subtrees: any
/// identifier, export-specifier local, or JSX tag counts as a use.
pub fn find_unused_imports(module: &ModuleInfo, ast: &AstNode) -> Vec<UnusedImportFinding> {
    let mut used: FxHashSet<String> = FxHashSet::default();
    ast.walk(&mut |node| {
        if node.kind.is_import_declaration() {
            return false;
        }
        match node.kind.as_str() {
            "ExportSpecifier" | "ExportTypeSpecifier" | "JSXOpeningElement" | "JSXClosingElement" => {
                if let Some(name) = node.name.as_deref() {
                    used.insert(name.to_string());
                }
            }
            _ if node.kind.is_identifier() => {
                if let Some(name) = node.name.as_deref() {
                    used.insert(name.to_string());
                }
            }
            _ => {}
        }
        true
    });

    let mut findings = Vec::new();
    for import in &module.imports {
        if import.is_type_only || import.is_dynamic || import.kind == ImportKind::SideEffect {
            continue;
        }
        for spec in &import.specifiers {
            if spec.is_type || used.contains(spec.local.as_str()) {
                continue;
            }
            findings.push(UnusedImportFinding {
                file: module.file.clone(),
                local: spec.local.clone(),
                imported: spec.imported.clone(),
                source: import.source.clone(),
                location: import.location.clone(),
            });
        }
    }
    findings
}

/// `target file -> names imported from it`. The `*` key marks a file as
/// fully used (namespace, side-effect, dynamic, or require imports).
fn build_reverse_index(modules: &FxHashMap<String, ModuleInfo>) -> FxHashMap<String, FxHashSet<String>> {
    let known: FxHashSet<String> = modules.keys().cloned().collect();
    let mut index: FxHashMap<String, FxHashSet<String>> = FxHashMap::default();

    for (file, module) in modules {
        for import in &module.imports {
            let Some(target) = resolve_import_target(file, &import.source, import.source_type, &known)
            else {
                continue;
            };
            let names = index.entry(target).or_default();
            match import.kind {
                ImportKind::Namespace
                | ImportKind::SideEffect
                | ImportKind::Dynamic
                | ImportKind::Require => {
                    names.insert("*".to_string());
                }
                ImportKind::Default => {
                    names.insert("default".to_string());
                }
                ImportKind::Named | ImportKind::TypeOnly => {
                    for spec in &import.specifiers {
                        names.insert(spec.imported.clone());
                    }
                }
            }
        }
    }
    index
}

fn resolve_import_target(
    from_file: &str,
    source: &str,
    source_type: SourceType,
    known: &FxHashSet<String>,
) -> Option<String> {
    match source_type {
        SourceType::Relative => resolve_relative(from_file, source, known),
        SourceType::Absolute => {
            let normalized = resolve::normalize(source);
            known.contains(&normalized).then_some(normalized)
        }
        // Aliases, packages and builtins cannot be mapped onto the
        // analyzed file set.
        _ => None,
    }
}

fn find_unused_exports(
    module: &ModuleInfo,
    imported_names: &FxHashMap<String, FxHashSet<String>>,
) -> Vec<UnusedExportFinding> {
    let names = imported_names.get(&module.file);
    let fully_used = names.map(|n| n.contains("*")).unwrap_or(false);

    let mut findings = Vec::new();
    if fully_used {
        return findings;
    }
    for export in &module.exports {
        if export.is_reexport()
            || export.is_type_only
            || export.kind == ExportKind::All
            || is_framework_reserved(&module.file, &export.name)
        {
            continue;
        }
        let used = names.map(|n| n.contains(&export.name)).unwrap_or(false);
        if !used {
            findings.push(UnusedExportFinding {
                file: module.file.clone(),
                name: export.name.clone(),
                is_function: export.is_function,
                location: export.location.clone(),
            });
        }
    }
    findings
}

fn is_framework_reserved(file: &str, name: &str) -> bool {
    if RESERVED_EXPORT_NAMES.contains(&name) {
        return true;
    }
    let file_stem = stem(file);
    if RESERVED_FILE_STEMS.contains(&file_stem) {
        // App-router files: the default export and HTTP verbs belong to
        // the framework.
        return name == "default" || HTTP_VERB_EXPORTS.contains(&name);
    }
    false
}

/// Files unreachable over import edges from any entry point.
///
/// Entry points: files named `index`/`main`/`app`/`server`, plus files
/// nothing imports. Test and config files are neither entries nor
/// orphans.
pub fn find_orphans(modules: &FxHashMap<String, ModuleInfo>) -> Vec<String> {
    let known: FxHashSet<String> = modules.keys().cloned().collect();

    // Resolved forward edges and incoming-degree counts.
    let mut edges: FxHashMap<&str, Vec<String>> = FxHashMap::default();
    let mut has_incoming: FxHashSet<String> = FxHashSet::default();
    for (file, module) in modules {
        let mut targets = Vec::new();
        for import in &module.imports {
            if let Some(target) =
                resolve_import_target(file, &import.source, import.source_type, &known)
            {
                if target != *file {
                    has_incoming.insert(target.clone());
                    targets.push(target);
                }
            }
        }
        targets.sort();
        targets.dedup();
        edges.insert(file.as_str(), targets);
    }

    let mut entries: Vec<&String> = modules
        .keys()
        .filter(|f| !is_test_file(f) && !is_config_file(f))
        .filter(|f| {
            matches!(stem(f), "index" | "main" | "app" | "server") || !has_incoming.contains(*f)
        })
        .collect();
    entries.sort();

    let mut visited: FxHashSet<String> = FxHashSet::default();
    let mut queue: VecDeque<String> = VecDeque::new();
    for entry in entries {
        if visited.insert(entry.clone()) {
            queue.push_back(entry.clone());
        }
    }
    while let Some(file) = queue.pop_front() {
        if let Some(targets) = edges.get(file.as_str()) {
            for target in targets {
                if visited.insert(target.clone()) {
                    queue.push_back(target.clone());
                }
            }
        }
    }

    let mut orphans: Vec<String> = modules
        .keys()
        .filter(|f| !visited.contains(*f) && !is_test_file(f) && !is_config_file(f))
        .cloned()
        .collect();
    orphans.sort();
    orphans
}

fn is_test_file(path: &str) -> bool {
    let base = path.rsplit('/').next().unwrap_or(path);
    base.contains(".test.") || base.contains(".spec.") || path.contains("__tests__/") || path.contains("__mocks__/")
}

fn is_config_file(path: &str) -> bool {
    let base = path.rsplit('/').next().unwrap_or(path);
    base.contains(".config.") || base.starts_with('.')
}
