use swc_core::ecma::ast::{Decl, ExportSpecifier, ModuleDecl, ModuleExportName, ModuleItem, Pat};
use swc_core::ecma::visit::VisitMut;
use tracing::debug;

use crate::binding::pat_ids;

/// Removes the export of one name, leaving whatever it declared to the sweep.
///
/// Handles `export { name }` / `export { x as name } from '...'` specifiers,
/// `export function name() {}` and `export const name = ...`. Any other
/// shape exporting the name is left alone.
pub struct ExportStripper<'a> {
    export_name: &'a str,
    pub removed: usize,
}

impl<'a> ExportStripper<'a> {
    pub fn new(export_name: &'a str) -> Self {
        Self {
            export_name,
            removed: 0,
        }
    }

    fn is_target(&self, name: &str) -> bool {
        name == self.export_name
    }

    // returns false when the whole item has to go
    fn strip(&mut self, item: &mut ModuleItem) -> bool {
        let ModuleItem::ModuleDecl(module_decl) = item else {
            return true;
        };
        match module_decl {
            ModuleDecl::ExportNamed(named_export) => {
                let before = named_export.specifiers.len();
                named_export
                    .specifiers
                    .retain(|specifier| !self.is_target(exported_name(specifier)));
                let removed = before - named_export.specifiers.len();
                self.removed += removed;
                // `export {} from 'x'` written by hand stays
                !(removed > 0 && named_export.specifiers.is_empty())
            }
            ModuleDecl::ExportDecl(export_decl) => match &mut export_decl.decl {
                Decl::Fn(fn_decl) if self.is_target(&fn_decl.ident.sym) => {
                    self.removed += 1;
                    false
                }
                Decl::Var(var_decl) => {
                    let before = var_decl.decls.len();
                    var_decl.decls.retain(|declarator| match &declarator.name {
                        Pat::Ident(binding_ident) => !self.is_target(&binding_ident.id.sym),
                        pat => {
                            if pat_ids(pat).iter().any(|id| self.is_target(&id.0)) {
                                debug!(
                                    "skip `{}`: exported through a destructuring pattern",
                                    self.export_name
                                );
                            }
                            true
                        }
                    });
                    let removed = before - var_decl.decls.len();
                    self.removed += removed;
                    // the remaining declarators stay exported
                    !(removed > 0 && var_decl.decls.is_empty())
                }
                Decl::Class(class_decl) if self.is_target(&class_decl.ident.sym) => {
                    debug!("skip `{}`: exported as a class", self.export_name);
                    true
                }
                _ => true,
            },
            _ => true,
        }
    }
}

impl VisitMut for ExportStripper<'_> {
    fn visit_mut_module_items(&mut self, items: &mut Vec<ModuleItem>) {
        items.retain_mut(|item| self.strip(item));
    }
}

fn exported_name(specifier: &ExportSpecifier) -> &str {
    match specifier {
        ExportSpecifier::Named(named) => {
            module_export_name(named.exported.as_ref().unwrap_or(&named.orig))
        }
        ExportSpecifier::Namespace(namespace) => module_export_name(&namespace.name),
        ExportSpecifier::Default(default) => &default.exported.sym,
    }
}

fn module_export_name(name: &ModuleExportName) -> &str {
    match name {
        ModuleExportName::Ident(ident) => &ident.sym,
        ModuleExportName::Str(s) => &s.value,
    }
}
