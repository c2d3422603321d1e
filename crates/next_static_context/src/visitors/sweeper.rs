use std::collections::HashSet;

use swc_core::common::Span;
use swc_core::ecma::ast::{Id, Ident, ModuleItem, Stmt};
use swc_core::ecma::visit::{VisitMut, VisitMutWith};
use tracing::debug;

use crate::binding::BindingIndex;
use crate::removable::{Removable, Removal};

/// A removed declaration: the binding and the ident that declared (or, for
/// `name = () => {}`, assigned) it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SweptSite {
    pub id: Id,
    pub span: Span,
}

/// One sweep pass: drops every candidate the index no longer sees referenced,
/// at any depth. Decisions use the index as it was when the pass started, so
/// a pass only removes what was already dead; the caller runs passes until
/// one removes nothing.
pub struct Sweeper<'a> {
    candidates: &'a HashSet<Id>,
    index: &'a BindingIndex,
    removed: Vec<SweptSite>,
}

impl<'a> Sweeper<'a> {
    pub fn new(candidates: &'a HashSet<Id>, index: &'a BindingIndex) -> Self {
        Self {
            candidates,
            index,
            removed: vec![],
        }
    }

    /// Removed sites in the order they were dropped. A binding declared
    /// more than once (`var a; var a;`) shows up once per declaration.
    pub fn into_removed(self) -> Vec<SweptSite> {
        self.removed
    }

    fn sweep<T: Removable>(&mut self, node: &mut T) -> Removal {
        let candidates = self.candidates;
        let index = self.index;
        let removed = &mut self.removed;
        node.remove_bindings(&mut |ident: &Ident| {
            let id = ident.to_id();
            let doomed = candidates.contains(&id) && !index.is_externally_referenced(&id);
            if doomed {
                debug!("sweep {}{:?}", id.0, id.1);
                removed.push(SweptSite {
                    id,
                    span: ident.span,
                });
            }
            doomed
        })
    }
}

impl VisitMut for Sweeper<'_> {
    fn visit_mut_module_items(&mut self, items: &mut Vec<ModuleItem>) {
        items.visit_mut_children_with(self);
        items.retain_mut(|item| !self.sweep(item).emptied);
    }

    fn visit_mut_stmts(&mut self, stmts: &mut Vec<Stmt>) {
        stmts.visit_mut_children_with(self);
        stmts.retain_mut(|stmt| !self.sweep(stmt).emptied);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::tests::TestUtils;
    use crate::visitors::reference_marker::mark_candidates;

    /// Marks candidates on `before`, then runs exactly one pass on `after`
    /// (the same module with some code already gone).
    fn one_pass(before: &str, remove_first: usize) -> (String, Vec<String>) {
        let mut tu = TestUtils::gen_js_ast(before);
        let candidates = mark_candidates(&BindingIndex::crawl(&tu.ast.ast));
        tu.ast.ast.body.drain(..remove_first);
        let index = BindingIndex::crawl(&tu.ast.ast);
        let mut sweeper = Sweeper::new(&candidates, &index);
        tu.ast.ast.visit_mut_with(&mut sweeper);
        let removed = sweeper
            .into_removed()
            .into_iter()
            .map(|site| site.id.0.to_string())
            .collect();
        (tu.js_ast_to_code(), removed)
    }

    #[test]
    fn test_single_pass_only_removes_what_is_dead_now() {
        let (code, removed) = one_pass(
            r#"
use(c);
const a = 1;
const b = a;
const c = b;
"#,
            1,
        );
        assert_eq!(removed, vec!["c"]);
        assert_eq!(code, TestUtils::normalize("const a = 1; const b = a;"));
    }

    #[test]
    fn test_uncandidated_bindings_survive() {
        let (code, removed) = one_pass(
            r#"
use(a);
const a = 1;
const never = 2;
"#,
            1,
        );
        assert_eq!(removed, vec!["a"]);
        assert_eq!(code, TestUtils::normalize("const never = 2;"));
    }

    #[test]
    fn test_function_assignment_goes_with_its_binding() {
        let (code, removed) = one_pass(
            r#"
use(cache);
let cache;
cache = () => 1;
"#,
            1,
        );
        assert_eq!(removed, vec!["cache", "cache"]);
        assert_eq!(code, TestUtils::normalize(""));
    }

    #[test]
    fn test_nested_block_declarations() {
        let (code, removed) = one_pass(
            r#"
drop();
function keep() {
    const inner = 1;
    if (inner) {
        function nested() {}
        nested();
    }
}
keep();
"#,
            1,
        );
        assert!(removed.is_empty());
        assert_eq!(
            code,
            TestUtils::normalize(
                r#"
function keep() {
    const inner = 1;
    if (inner) {
        function nested() {}
        nested();
    }
}
keep();
"#
            )
        );
    }

    #[test]
    fn test_nested_declaration_in_live_function() {
        let (code, removed) = one_pass(
            r#"
function keep(flag) {
    const helper = () => 1;
    if (flag) {
        return helper();
    }
}
keep();
"#,
            0,
        );
        assert!(removed.is_empty());
        assert_eq!(
            code,
            TestUtils::normalize(
                r#"
function keep(flag) {
    const helper = () => 1;
    if (flag) {
        return helper();
    }
}
keep();
"#
            )
        );
    }
}
