use std::collections::HashMap;

use indexmap::IndexMap;
use swc_core::ecma::ast::{
    AssignOp, AssignTarget, BindingIdent, Decl, ExportDecl, ExportNamedSpecifier, Expr, ExprStmt,
    FnDecl, Id, Ident, ImportDefaultSpecifier, ImportNamedSpecifier, ImportStarAsSpecifier,
    NamedExport, Pat, SimpleAssignTarget, VarDeclarator,
};
use swc_core::ecma::visit::{Visit, VisitWith};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// `function foo() {}`, the only kind whose calls to itself don't count.
    Function,
    /// One leaf of a variable declarator, destructured or not.
    Variable,
    /// Default, named or namespace import.
    Import,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub id: Id,
    pub kind: BindingKind,
}

#[derive(Debug, Default, Clone, Copy)]
struct Usage {
    total: usize,
    outside_own_body: usize,
}

/// Declarations and their occurrences for one module, derived from scratch by
/// [`BindingIndex::crawl`]. The index is never patched after a removal; callers
/// crawl again instead.
#[derive(Debug, Default)]
pub struct BindingIndex {
    bindings: IndexMap<Id, BindingKind>,
    usages: HashMap<Id, Usage>,
}

impl BindingIndex {
    pub fn crawl<N: VisitWith<BindingCollector>>(node: &N) -> Self {
        let mut collector = BindingCollector::default();
        node.visit_with(&mut collector);
        Self {
            bindings: collector.bindings,
            usages: collector.usages,
        }
    }

    /// Returns `None` for idents with no function, variable or import
    /// declaration in the module, e.g. globals.
    pub fn resolve(&self, ident: &Ident) -> Option<Binding> {
        let id = ident.to_id();
        self.bindings
            .get(&id)
            .map(|kind| Binding { id, kind: *kind })
    }

    pub fn is_externally_referenced(&self, id: &Id) -> bool {
        let Some(usage) = self.usages.get(id) else {
            return false;
        };
        match self.bindings.get(id) {
            Some(BindingKind::Function) => usage.outside_own_body > 0,
            _ => usage.total > 0,
        }
    }

    pub fn occurrences(&self, id: &Id) -> usize {
        self.usages.get(id).map_or(0, |usage| usage.total)
    }

    /// Every binding in document order of its first declaration.
    pub fn bindings(&self) -> impl Iterator<Item = Binding> + '_ {
        self.bindings.iter().map(|(id, kind)| Binding {
            id: id.clone(),
            kind: *kind,
        })
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[derive(Default)]
pub struct BindingCollector {
    bindings: IndexMap<Id, BindingKind>,
    usages: HashMap<Id, Usage>,
    // function declarations we are currently inside of
    fn_stack: Vec<Id>,
    in_var_pat: bool,
}

impl BindingCollector {
    fn declare(&mut self, ident: &Ident, kind: BindingKind) {
        let entry = self.bindings.entry(ident.to_id()).or_insert(kind);
        // `var f; function f() {}` keeps the self-call exemption
        if kind == BindingKind::Function {
            *entry = kind;
        }
    }

    fn occur(&mut self, id: Id) {
        let inside_own_body = self.fn_stack.contains(&id);
        let usage = self.usages.entry(id).or_default();
        usage.total += 1;
        if !inside_own_body {
            usage.outside_own_body += 1;
        }
    }
}

impl Visit for BindingCollector {
    fn visit_fn_decl(&mut self, fn_decl: &FnDecl) {
        self.declare(&fn_decl.ident, BindingKind::Function);
        self.fn_stack.push(fn_decl.ident.to_id());
        fn_decl.function.visit_with(self);
        self.fn_stack.pop();
    }

    fn visit_var_declarator(&mut self, declarator: &VarDeclarator) {
        let in_var_pat = std::mem::replace(&mut self.in_var_pat, true);
        declarator.name.visit_with(self);
        self.in_var_pat = in_var_pat;
        declarator.init.visit_with(self);
    }

    fn visit_binding_ident(&mut self, binding_ident: &BindingIdent) {
        if self.in_var_pat {
            self.declare(&binding_ident.id, BindingKind::Variable);
            let in_var_pat = std::mem::replace(&mut self.in_var_pat, false);
            binding_ident.type_ann.visit_with(self);
            self.in_var_pat = in_var_pat;
        } else {
            binding_ident.visit_children_with(self);
        }
    }

    // `name = () => {}` only (re)defines `name`, the sweep removes it with the binding
    fn visit_expr_stmt(&mut self, expr_stmt: &ExprStmt) {
        match &*expr_stmt.expr {
            Expr::Assign(assign_expr) if fn_assignment_target(expr_stmt).is_some() => {
                assign_expr.right.visit_with(self);
            }
            _ => expr_stmt.visit_children_with(self),
        }
    }

    // defaults and computed keys inside a pattern are plain expressions
    fn visit_expr(&mut self, expr: &Expr) {
        let in_var_pat = std::mem::replace(&mut self.in_var_pat, false);
        expr.visit_children_with(self);
        self.in_var_pat = in_var_pat;
    }

    fn visit_import_named_specifier(&mut self, specifier: &ImportNamedSpecifier) {
        self.declare(&specifier.local, BindingKind::Import);
    }

    fn visit_import_default_specifier(&mut self, specifier: &ImportDefaultSpecifier) {
        self.declare(&specifier.local, BindingKind::Import);
    }

    fn visit_import_star_as_specifier(&mut self, specifier: &ImportStarAsSpecifier) {
        self.declare(&specifier.local, BindingKind::Import);
    }

    fn visit_export_decl(&mut self, export_decl: &ExportDecl) {
        export_decl.visit_children_with(self);
        // the export statement itself keeps its declarations alive
        match &export_decl.decl {
            Decl::Fn(fn_decl) => self.occur(fn_decl.ident.to_id()),
            Decl::Var(var_decl) => {
                for declarator in &var_decl.decls {
                    for id in pat_ids(&declarator.name) {
                        self.occur(id);
                    }
                }
            }
            _ => {}
        }
    }

    fn visit_named_export(&mut self, named_export: &NamedExport) {
        // `export { a } from 'm'` names nothing local
        if named_export.src.is_none() {
            named_export.visit_children_with(self);
        }
    }

    fn visit_export_named_specifier(&mut self, specifier: &ExportNamedSpecifier) {
        specifier.orig.visit_with(self);
    }

    fn visit_ident(&mut self, ident: &Ident) {
        self.occur(ident.to_id());
    }
}

/// The assigned name of a `name = function () {}` or `name = () => {}`
/// statement.
pub fn fn_assignment_target(expr_stmt: &ExprStmt) -> Option<&Ident> {
    let Expr::Assign(assign_expr) = &*expr_stmt.expr else {
        return None;
    };
    let AssignTarget::Simple(SimpleAssignTarget::Ident(binding_ident)) = &assign_expr.left else {
        return None;
    };
    let is_fn = matches!(&*assign_expr.right, Expr::Fn(_) | Expr::Arrow(_));
    (assign_expr.op == AssignOp::Assign && is_fn).then_some(&binding_ident.id)
}

/// Leaf binding ids of a declaration pattern.
pub fn pat_ids(pat: &Pat) -> Vec<Id> {
    let mut ids = vec![];
    collect_pat_ids(pat, &mut ids);
    ids
}

fn collect_pat_ids(pat: &Pat, ids: &mut Vec<Id>) {
    use swc_core::ecma::ast::ObjectPatProp;

    match pat {
        Pat::Ident(binding_ident) => ids.push(binding_ident.id.to_id()),
        Pat::Array(array_pat) => {
            for elem in array_pat.elems.iter().flatten() {
                collect_pat_ids(elem, ids);
            }
        }
        Pat::Rest(rest_pat) => collect_pat_ids(&rest_pat.arg, ids),
        Pat::Object(obj_pat) => {
            for prop in &obj_pat.props {
                match prop {
                    ObjectPatProp::KeyValue(kv_prop) => collect_pat_ids(&kv_prop.value, ids),
                    ObjectPatProp::Assign(assign_prop) => ids.push(assign_prop.key.id.to_id()),
                    ObjectPatProp::Rest(rest_pat) => collect_pat_ids(&rest_pat.arg, ids),
                }
            }
        }
        Pat::Assign(assign_pat) => collect_pat_ids(&assign_pat.left, ids),
        Pat::Invalid(_) | Pat::Expr(_) => {}
    }
}
