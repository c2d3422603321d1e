use swc_core::ecma::ast::{
    ArrayPat, Decl, FnDecl, Ident, ImportDecl, ImportSpecifier, ModuleDecl, ModuleItem, ObjectPat,
    ObjectPatProp, Pat, Stmt, VarDecl, VarDeclarator,
};

use crate::binding::fn_assignment_target;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Removal {
    pub removed: usize,
    /// Nothing is left to declare; the parent should drop the node.
    pub emptied: bool,
}

impl Removal {
    fn whole(doomed: bool) -> Self {
        Self {
            removed: doomed as usize,
            emptied: doomed,
        }
    }

    fn partial(removed: usize, now_empty: bool) -> Self {
        Self {
            removed,
            emptied: removed > 0 && now_empty,
        }
    }
}

/// A declaration site that can give up the bindings it introduces.
///
/// `doomed` is asked about each declaring ident the node is allowed to drop
/// and returns true to drop it. Nodes that lose their last binding report
/// `emptied`, and the parent removes them in turn, up to the enclosing
/// statement.
pub trait Removable {
    fn remove_bindings(&mut self, doomed: &mut dyn FnMut(&Ident) -> bool) -> Removal;
}

impl Removable for ModuleItem {
    fn remove_bindings(&mut self, doomed: &mut dyn FnMut(&Ident) -> bool) -> Removal {
        match self {
            ModuleItem::Stmt(stmt) => stmt.remove_bindings(doomed),
            ModuleItem::ModuleDecl(ModuleDecl::Import(import_decl)) => {
                import_decl.remove_bindings(doomed)
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export_decl)) => {
                export_decl.decl.remove_bindings(doomed)
            }
            ModuleItem::ModuleDecl(_) => Removal::default(),
        }
    }
}

impl Removable for Stmt {
    fn remove_bindings(&mut self, doomed: &mut dyn FnMut(&Ident) -> bool) -> Removal {
        match self {
            Stmt::Decl(decl) => decl.remove_bindings(doomed),
            Stmt::Expr(expr_stmt) => match fn_assignment_target(expr_stmt) {
                Some(ident) => Removal::whole(doomed(ident)),
                None => Removal::default(),
            },
            _ => Removal::default(),
        }
    }
}

impl Removable for Decl {
    fn remove_bindings(&mut self, doomed: &mut dyn FnMut(&Ident) -> bool) -> Removal {
        match self {
            Decl::Fn(fn_decl) => fn_decl.remove_bindings(doomed),
            Decl::Var(var_decl) => var_decl.remove_bindings(doomed),
            _ => Removal::default(),
        }
    }
}

impl Removable for FnDecl {
    fn remove_bindings(&mut self, doomed: &mut dyn FnMut(&Ident) -> bool) -> Removal {
        Removal::whole(doomed(&self.ident))
    }
}

impl Removable for ImportDecl {
    fn remove_bindings(&mut self, doomed: &mut dyn FnMut(&Ident) -> bool) -> Removal {
        let before = self.specifiers.len();
        self.specifiers.retain(|specifier| {
            let local = match specifier {
                ImportSpecifier::Named(named) => &named.local,
                ImportSpecifier::Default(default) => &default.local,
                ImportSpecifier::Namespace(namespace) => &namespace.local,
            };
            !doomed(local)
        });
        // dropping the last specifier drops the whole import, side effects included
        Removal::partial(before - self.specifiers.len(), self.specifiers.is_empty())
    }
}

impl Removable for VarDecl {
    fn remove_bindings(&mut self, doomed: &mut dyn FnMut(&Ident) -> bool) -> Removal {
        let mut removed = 0;
        self.decls.retain_mut(|declarator| {
            let removal = declarator.remove_bindings(doomed);
            removed += removal.removed;
            !removal.emptied
        });
        Removal::partial(removed, self.decls.is_empty())
    }
}

impl Removable for VarDeclarator {
    fn remove_bindings(&mut self, doomed: &mut dyn FnMut(&Ident) -> bool) -> Removal {
        self.name.remove_bindings(doomed)
    }
}

impl Removable for Pat {
    fn remove_bindings(&mut self, doomed: &mut dyn FnMut(&Ident) -> bool) -> Removal {
        match self {
            Pat::Ident(binding_ident) => Removal::whole(doomed(&binding_ident.id)),
            Pat::Array(array_pat) => array_pat.remove_bindings(doomed),
            Pat::Object(obj_pat) => obj_pat.remove_bindings(doomed),
            Pat::Rest(rest_pat) => rest_pat.arg.remove_bindings(doomed),
            // the default value goes with its binding
            Pat::Assign(assign_pat) => assign_pat.left.remove_bindings(doomed),
            Pat::Invalid(_) | Pat::Expr(_) => Removal::default(),
        }
    }
}

impl Removable for ArrayPat {
    fn remove_bindings(&mut self, doomed: &mut dyn FnMut(&Ident) -> bool) -> Removal {
        let mut removed = 0;
        for elem in self.elems.iter_mut() {
            if let Some(pat) = elem {
                let removal = pat.remove_bindings(doomed);
                removed += removal.removed;
                // a hole keeps the positions of the elements after it
                if removal.emptied {
                    *elem = None;
                }
            }
        }
        if removed > 0 {
            while matches!(self.elems.last(), Some(None)) {
                self.elems.pop();
            }
        }
        Removal::partial(removed, self.elems.is_empty())
    }
}

impl Removable for ObjectPat {
    fn remove_bindings(&mut self, doomed: &mut dyn FnMut(&Ident) -> bool) -> Removal {
        let mut removed = 0;

        // `...rest` collects whatever the other properties don't name, so the
        // siblings can only go once the rest binding is gone
        if let Some(index) = self
            .props
            .iter()
            .position(|prop| matches!(prop, ObjectPatProp::Rest(_)))
        {
            if let ObjectPatProp::Rest(rest_pat) = &mut self.props[index] {
                let removal = rest_pat.arg.remove_bindings(doomed);
                removed += removal.removed;
                if !removal.emptied {
                    return Removal::partial(removed, false);
                }
            }
            self.props.remove(index);
        }

        self.props.retain_mut(|prop| {
            let removal = match prop {
                ObjectPatProp::KeyValue(kv_prop) => kv_prop.value.remove_bindings(doomed),
                ObjectPatProp::Assign(assign_prop) => {
                    Removal::whole(doomed(&assign_prop.key.id))
                }
                ObjectPatProp::Rest(rest_pat) => rest_pat.arg.remove_bindings(doomed),
            };
            removed += removal.removed;
            !removal.emptied
        });
        Removal::partial(removed, self.props.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use swc_core::ecma::visit::{VisitMut, VisitMutWith};

    use super::*;
    use crate::ast::tests::TestUtils;

    struct RemoveByName(&'static [&'static str]);

    impl VisitMut for RemoveByName {
        fn visit_mut_module_items(&mut self, items: &mut Vec<ModuleItem>) {
            let names = self.0;
            items.retain_mut(|item| {
                !item
                    .remove_bindings(&mut |ident: &Ident| names.contains(&&*ident.sym))
                    .emptied
            });
        }
    }

    fn run(code: &str, names: &'static [&'static str]) -> String {
        let mut tu = TestUtils::gen_js_ast(code);
        tu.ast.ast.visit_mut_with(&mut RemoveByName(names));
        tu.js_ast_to_code()
    }

    #[test]
    fn test_var_declarators() {
        assert_eq!(
            run("const a = 1, b = 2;", &["b"]),
            TestUtils::normalize("const a = 1;")
        );
        assert_eq!(
            run("const a = 1, b = 2;", &["a", "b"]),
            TestUtils::normalize("")
        );
    }

    #[test]
    fn test_object_pattern() {
        assert_eq!(
            run("const { a, b: c, d = 1 } = obj;", &["c", "d"]),
            TestUtils::normalize("const { a } = obj;")
        );
        assert_eq!(
            run("const { a, b: c } = obj;", &["a", "c"]),
            TestUtils::normalize("")
        );
    }

    #[test]
    fn test_nested_object_pattern() {
        assert_eq!(
            run("const { a: { b }, c } = obj;", &["b"]),
            TestUtils::normalize("const { c } = obj;")
        );
    }

    #[test]
    fn test_object_pattern_with_live_rest() {
        assert_eq!(
            run("const { a, ...rest } = obj;", &["a"]),
            TestUtils::normalize("const { a, ...rest } = obj;")
        );
        assert_eq!(
            run("const { a, b, ...rest } = obj;", &["a", "rest"]),
            TestUtils::normalize("const { b } = obj;")
        );
    }

    #[test]
    fn test_array_pattern() {
        assert_eq!(
            run("const [a, b, c] = arr;", &["b"]),
            TestUtils::normalize("const [a, , c] = arr;")
        );
        assert_eq!(
            run("const [a, b, ...c] = arr;", &["b", "c"]),
            TestUtils::normalize("const [a] = arr;")
        );
        assert_eq!(
            run("const [a, [b]] = arr;", &["a", "b"]),
            TestUtils::normalize("")
        );
    }

    #[test]
    fn test_import_specifiers() {
        assert_eq!(
            run("import a, { b, c as d } from 'm';", &["a", "d"]),
            TestUtils::normalize("import { b } from 'm';")
        );
        assert_eq!(
            run("import * as ns from 'm';", &["ns"]),
            TestUtils::normalize("")
        );
        assert_eq!(
            run("import 'side-effect';", &["a"]),
            TestUtils::normalize("import 'side-effect';")
        );
    }

    #[test]
    fn test_function_assignment() {
        assert_eq!(
            run("let a; a = () => 1; b = function () {}; a = 2;", &["a", "b"]),
            TestUtils::normalize("a = 2;")
        );
    }

    #[test]
    fn test_function_declaration() {
        assert_eq!(
            run("function a() {} function b() {}", &["a"]),
            TestUtils::normalize("function b() {}")
        );
    }
}
