//! Import/export handlers.

use crate::domain::{AstNode, ExportType, ImportBinding, ImportType};

use super::collections::{ExportInfo, ImportInfo};
use super::context::AnalyzerState;

fn import_binding_for(specifier: &dyn AstNode) -> ImportBinding {
    if specifier.flag("type_only") {
        ImportBinding::Type
    } else if specifier.flag("typeof") {
        ImportBinding::Typeof
    } else {
        ImportBinding::Value
    }
}

/// `import ... from 'source'`. One IMPORT node per
/// binding; a side-effect import (`import 's'`, no specifiers) emits one
/// IMPORT with `local = "*"`.
pub fn visit_import_declaration(state: &mut AnalyzerState, node: &dyn AstNode) {
    let source = node
        .field("source")
        .map(|n| n.text().to_string())
        .unwrap_or_default();
    let file = state.file();
    let line = node.start_line();
    let column = node.start_column();

    if node.child_count() == 0 {
        state.collections.imports.push(ImportInfo {
            id: crate::domain::IdBuilder::import(&file, &source, "*"),
            file,
            source,
            local: "*".to_string(),
            imported: None,
            import_type: ImportType::Named,
            import_binding: ImportBinding::Value,
            is_dynamic: false,
            is_resolvable: None,
            line,
            column,
        });
        return;
    }

    for i in 0..node.child_count() {
        let Some(specifier) = node.child(i) else {
            continue;
        };
        let (import_type, local, imported) = match specifier.kind() {
            "ImportDefaultSpecifier" => {
                let local = specifier
                    .field("local")
                    .map(|n| n.text().to_string())
                    .unwrap_or_default();
                (ImportType::Default, local, None)
            }
            "ImportNamespaceSpecifier" => {
                let local = specifier
                    .field("local")
                    .map(|n| n.text().to_string())
                    .unwrap_or_default();
                (ImportType::Namespace, local, None)
            }
            "ImportSpecifier" => {
                let local = specifier
                    .field("local")
                    .map(|n| n.text().to_string())
                    .unwrap_or_default();
                let imported = specifier
                    .field("imported")
                    .map(|n| n.text().to_string())
                    .filter(|s| s != &local);
                (ImportType::Named, local, imported)
            }
            _ => continue,
        };

        let import_binding = import_binding_for(specifier.as_ref());
        state.collections.imports.push(ImportInfo {
            id: crate::domain::IdBuilder::import(&state.file(), &source, &local),
            file: state.file(),
            source: source.clone(),
            local,
            imported,
            import_type,
            import_binding,
            is_dynamic: false,
            is_resolvable: None,
            line: specifier.start_line(),
            column: specifier.start_column(),
        });
    }
}

/// `import(expr)`. `isResolvable`
/// is true iff `expr` is a string literal; `local` is the receiving
/// variable name, or `"*"` when the result isn't assigned.
pub fn visit_dynamic_import(state: &mut AnalyzerState, node: &dyn AstNode, receiving_var: Option<&str>) {
    if node.flag("awaited") {
        state.mark_top_level_await();
    }
    let arg = node.field("source");
    let (source, is_resolvable) = match &arg {
        Some(a) if a.kind() == "StringLiteral" => (a.text().to_string(), true),
        Some(a) => (a.text().to_string(), false),
        None => (String::new(), false),
    };
    let local = receiving_var.unwrap_or("*").to_string();
    state.collections.imports.push(ImportInfo {
        id: crate::domain::IdBuilder::import(&state.file(), &source, &local),
        file: state.file(),
        source,
        local,
        imported: None,
        import_type: ImportType::Namespace,
        import_binding: ImportBinding::Value,
        is_dynamic: true,
        is_resolvable: Some(is_resolvable),
        line: node.start_line(),
        column: node.start_column(),
    });
}

/// `export { foo, bar, baz };`. Per-specifier emission with per-specifier
/// `column` -- each name's own column, not the declaration's. Only
/// `ExportSpecifier` children are processed here;
/// `ExportNamespaceSpecifier` (`export * as ns from 'mod'`) is handled by
/// [`visit_export_all`].
pub fn visit_export_named(state: &mut AnalyzerState, node: &dyn AstNode) {
    let source = node.field("source").map(|n| n.text().to_string());
    let file = state.file();
    for i in 0..node.child_count() {
        let Some(specifier) = node.child(i) else {
            continue;
        };
        if specifier.kind() != "ExportSpecifier" {
            continue;
        }
        let local = specifier
            .field("local")
            .map(|n| n.text().to_string())
            .unwrap_or_default();
        let exported = specifier
            .field("exported")
            .map(|n| n.text().to_string())
            .unwrap_or_else(|| local.clone());

        state.collections.exports.push(ExportInfo {
            id: crate::domain::IdBuilder::export(&file, &exported, specifier.start_line()),
            file: file.clone(),
            name: exported,
            local: Some(local),
            is_default: false,
            export_type: ExportType::Named,
            source: source.clone(),
            line: specifier.start_line(),
            column: specifier.start_column(),
        });
    }
}

/// `export default ...;`
pub fn visit_export_default(state: &mut AnalyzerState, node: &dyn AstNode, local: Option<String>) {
    let file = state.file();
    state.collections.exports.push(ExportInfo {
        id: crate::domain::IdBuilder::export(&file, "default", node.start_line()),
        file,
        name: "default".to_string(),
        local,
        is_default: true,
        export_type: ExportType::Default,
        source: None,
        line: node.start_line(),
        column: node.start_column(),
    });
}

/// `export * from 'mod'` / `export * as ns from 'mod'`.
pub fn visit_export_all(state: &mut AnalyzerState, node: &dyn AstNode) {
    let source = node.field("source").map(|n| n.text().to_string());
    let exported_name = node
        .field("exported")
        .map(|n| n.text().to_string())
        .unwrap_or_else(|| "*".to_string());
    let file = state.file();
    state.collections.exports.push(ExportInfo {
        id: crate::domain::IdBuilder::export(&file, &exported_name, node.start_line()),
        file,
        name: exported_name,
        local: None,
        is_default: false,
        export_type: ExportType::All,
        source,
        line: node.start_line(),
        column: node.start_column(),
    });
}
