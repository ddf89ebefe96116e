//! Import/export extraction from a file AST.

use facet_core::config::ModuleConfig;
use facet_core::types::ast::AstNode;
use facet_core::types::collections::FxHashSet;
use smallvec::SmallVec;

use super::source_type::classify;
use super::types::{
    ExportInfo, ExportKind, ImportInfo, ImportKind, ImportSpecifier, ModuleInfo, SourceType,
};

/// Extracts [`ModuleInfo`] from one file's AST.
#[derive(Debug, Default)]
pub struct ModuleAnalyzer {
    config: ModuleConfig,
}

impl ModuleAnalyzer {
    pub fn new(config: ModuleConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Analyze one file. `source_text` is only consulted for the
    /// `import type ` line-prefix check; everything else is AST shape.
    pub fn analyze(&self, file: &str, ast: &AstNode, source_text: Option<&str>) -> ModuleInfo {
        let mut imports: Vec<ImportInfo> = Vec::new();
        let mut exports: Vec<ExportInfo> = Vec::new();

        ast.walk(&mut |node| {
            match node.kind.as_str() {
                "ImportDeclaration" => {
                    if let Some(import) = self.parse_import(node, source_text) {
                        imports.push(import);
                    }
                    return false;
                }
                "CallExpression" => {
                    if let Some(import) = self.parse_call_import(node) {
                        imports.push(import);
                    }
                }
                "ExportNamedDeclaration" | "ExportDefaultDeclaration" | "ExportAllDeclaration" => {
                    exports.extend(self.parse_export(node));
                }
                _ => {}
            }
            true
        });

        imports.retain(|i| self.keep_import(i));

        let mut dependencies: Vec<String> = imports
            .iter()
            .map(|i| i.source.clone())
            .collect::<FxHashSet<_>>()
            .into_iter()
            .collect();
        dependencies.sort();

        ModuleInfo {
            file: file.to_string(),
            imports,
            exports,
            dependencies,
        }
    }

    fn keep_import(&self, import: &ImportInfo) -> bool {
        if !self.config.include_builtins && import.source_type == SourceType::Builtin {
            return false;
        }
        if !self.config.include_type_imports && import.is_type_only {
            return false;
        }
        true
    }

    fn classify_source(&self, source: &str) -> SourceType {
        classify(source, &self.config.alias_patterns)
    }

    fn parse_import(&self, node: &AstNode, source_text: Option<&str>) -> Option<ImportInfo> {
        let source = node.value.clone()?;
        let is_type_only =
            node.name.as_deref() == Some("type") || line_is_type_import(node, source_text);

        let mut specifiers: SmallVec<[ImportSpecifier; 2]> = SmallVec::new();
        let (mut has_default, mut has_named, mut has_namespace) = (false, false, false);
        for spec in &node.specifiers {
            let Some(local) = spec.name.clone() else {
                continue;
            };
            match spec.kind.as_str() {
                "ImportDefaultSpecifier" => {
                    has_default = true;
                    specifiers.push(ImportSpecifier {
                        local,
                        imported: "default".to_string(),
                        is_type: false,
                    });
                }
                "ImportNamespaceSpecifier" => {
                    has_namespace = true;
                    specifiers.push(ImportSpecifier {
                        local,
                        imported: "*".to_string(),
                        is_type: false,
                    });
                }
                "ImportSpecifier" | "ImportTypeSpecifier" => {
                    has_named = true;
                    let imported = spec.value.clone().unwrap_or_else(|| local.clone());
                    specifiers.push(ImportSpecifier {
                        local,
                        imported,
                        is_type: is_type_only || spec.kind == "ImportTypeSpecifier",
                    });
                }
                _ => {}
            }
        }

        let kind = if is_type_only {
            ImportKind::TypeOnly
        } else if has_namespace {
            ImportKind::Namespace
        } else if has_named {
            ImportKind::Named
        } else if has_default {
            ImportKind::Default
        } else {
            ImportKind::SideEffect
        };

        Some(ImportInfo {
            source_type: self.classify_source(&source),
            source,
            kind,
            specifiers,
            location: node.location.clone(),
            is_dynamic: false,
            is_type_only,
        })
    }

    /// `import('x')` and `require('x')` call shapes. Detection depends
    /// on the parser producing a call node with a string-literal first
    /// argument; anything else is skipped silently.
    fn parse_call_import(&self, node: &AstNode) -> Option<ImportInfo> {
        let callee = node.callee.as_deref()?;
        let kind = if callee.kind == "Import" || callee.name.as_deref() == Some("import") {
            ImportKind::Dynamic
        } else if callee.name.as_deref() == Some("require") {
            ImportKind::Require
        } else {
            return None;
        };
        let arg = node.arguments.first()?;
        if !arg.kind.is_literal() {
            return None;
        }
        let source = arg.value.clone()?;
        Some(ImportInfo {
            source_type: self.classify_source(&source),
            source,
            is_dynamic: kind == ImportKind::Dynamic,
            kind,
            specifiers: SmallVec::new(),
            location: node.location.clone(),
            is_type_only: false,
        })
    }

    fn parse_export(&self, node: &AstNode) -> Vec<ExportInfo> {
        let mut exports = Vec::new();
        let location = node.location.clone();
        match node.kind.as_str() {
            "ExportDefaultDeclaration" => {
                let declared = node.declarations.first().or_else(|| node.children.first());
                exports.push(ExportInfo {
                    name: "default".to_string(),
                    kind: ExportKind::Default,
                    source: None,
                    is_type_only: false,
                    is_function: declared.map(|d| d.kind.is_function()).unwrap_or(false),
                    location,
                });
            }
            "ExportAllDeclaration" => {
                exports.push(ExportInfo {
                    name: "*".to_string(),
                    kind: ExportKind::All,
                    source: node.value.clone(),
                    is_type_only: node.name.as_deref() == Some("type"),
                    is_function: false,
                    location,
                });
            }
            _ => {
                let node_type_only = node.name.as_deref() == Some("type");
                let source = node.value.clone();
                for spec in &node.specifiers {
                    let Some(local) = spec.name.clone() else {
                        continue;
                    };
                    exports.push(ExportInfo {
                        name: spec.value.clone().unwrap_or(local),
                        kind: ExportKind::Named,
                        source: source.clone(),
                        is_type_only: node_type_only || spec.kind == "ExportTypeSpecifier",
                        is_function: false,
                        location: spec.location.clone(),
                    });
                }
                for decl in &node.declarations {
                    exports.extend(self.declared_exports(decl, node_type_only));
                }
            }
        }
        exports
    }

    fn declared_exports(&self, decl: &AstNode, type_only: bool) -> Vec<ExportInfo> {
        let mut out = Vec::new();
        if decl.kind == "VariableDeclaration" {
            for declarator in &decl.declarations {
                if let Some(name) = declarator.name.clone() {
                    out.push(ExportInfo {
                        name,
                        kind: ExportKind::Named,
                        source: None,
                        is_type_only: type_only,
                        is_function: declarator
                            .init
                            .as_deref()
                            .map(|i| i.kind.is_function())
                            .unwrap_or(false),
                        location: declarator.location.clone(),
                    });
                }
            }
        } else if let Some(name) = decl.name.clone() {
            out.push(ExportInfo {
                name,
                kind: ExportKind::Named,
                source: None,
                is_type_only: type_only
                    || matches!(decl.kind.as_str(), "TSInterfaceDeclaration" | "TSTypeAliasDeclaration"),
                is_function: decl.kind.is_function(),
                location: decl.location.clone(),
            });
        }
        out
    }
}

/// True when the raw source line under the import starts with
/// `import type `. Covers parsers that do not mark type-only imports
/// structurally.
fn line_is_type_import(node: &AstNode, source_text: Option<&str>) -> bool {
    let Some(text) = source_text else {
        return false;
    };
    let line_no = node.location.start_line;
    if line_no == 0 {
        return false;
    }
    text.lines()
        .nth(line_no as usize - 1)
        .map(|line| line.trim_start().starts_with("import type "))
        .unwrap_or(false)
}

/// Helper for source-type introspection without a full analyzer.
pub fn classify_with_defaults(source: &str) -> SourceType {
    classify(source, &ModuleConfig::default().alias_patterns)
}
