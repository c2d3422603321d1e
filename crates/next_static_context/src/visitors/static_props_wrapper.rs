use anyhow::Result;
use swc_core::common::util::take::Take;
use swc_core::common::{SyntaxContext, DUMMY_SP};
use swc_core::ecma::ast::{
    ArrowExpr, BlockStmt, BlockStmtOrExpr, Decl, Expr, FnDecl, Function, Ident, ImportSpecifier,
    ModuleDecl, ModuleItem, Pat, ReturnStmt, Stmt,
};
use swc_core::ecma::visit::VisitMut;
use tracing::debug;

use crate::ast::parse_items;

pub const STATIC_CONTEXT_MODULE: &str = "next-static-context";
pub const EXPORT_NAME_GET_STATIC_PROPS: &str = "getStaticProps";

const SSG_EXPORTS: [&str; 2] = [
    EXPORT_NAME_GET_STATIC_PROPS,
    // legacy name, still exported by older pages
    "unstable_getStaticProps",
];

const RENAMED_GET_STATIC_PROPS: &str = "_getStaticProps";

const IMPORT_TEMPLATE: &str = "import { getStaticContext } from 'next-static-context';";

fn wrapper_template(awaits_original: bool) -> String {
    format!(
        r#"
export async function getStaticProps(...args) {{
    const originalStaticProps = {}_getStaticProps(...args);
    const staticContext = await getStaticContext(require.context(process.env.NEXT_STATIC_CONTEXT_REQUIRE_CONTEXT));
    return {{
        ...originalStaticProps,
        props: {{
            ...originalStaticProps.props,
            staticContext
        }}
    }};
}}
"#,
        if awaits_original { "await " } else { "" }
    )
}

/// Server side counterpart of the export stripper: renames the page's
/// `getStaticProps` to `_getStaticProps` and exports a new `getStaticProps`
/// that merges the static context into the props it returns.
pub struct StaticPropsWrapper {
    import: ModuleItem,
    sync_wrapper: ModuleItem,
    async_wrapper: ModuleItem,
    done: bool,
    needs_import: bool,
}

impl StaticPropsWrapper {
    pub fn new() -> Result<Self> {
        Ok(Self {
            import: single_item(IMPORT_TEMPLATE)?,
            sync_wrapper: single_item(&wrapper_template(false))?,
            async_wrapper: single_item(&wrapper_template(true))?,
            done: false,
            needs_import: true,
        })
    }

    pub fn done(&self) -> bool {
        self.done
    }
}

fn single_item(code: &str) -> Result<ModuleItem> {
    let mut items = parse_items(code)?;
    items
        .pop()
        .ok_or_else(|| anyhow::anyhow!("empty template: {}", code))
}

impl VisitMut for StaticPropsWrapper {
    fn visit_mut_module_items(&mut self, items: &mut Vec<ModuleItem>) {
        self.needs_import = !items.iter().any(is_static_context_import);

        let mut body = Vec::with_capacity(items.len() + 3);
        for mut item in items.take() {
            if self.done {
                body.push(item);
                continue;
            }
            let Some(static_props) = take_static_props(&mut item) else {
                body.push(item);
                continue;
            };
            self.done = true;
            debug!(
                "wrap getStaticProps (async: {})",
                static_props.function.is_async
            );
            if static_props.keep_item {
                body.push(item);
            }
            let is_async = static_props.function.is_async;
            body.push(
                Stmt::Decl(Decl::Fn(FnDecl {
                    ident: Ident::new(
                        RENAMED_GET_STATIC_PROPS.into(),
                        DUMMY_SP,
                        static_props.ctxt,
                    ),
                    declare: false,
                    function: static_props.function,
                }))
                .into(),
            );
            body.push(if is_async {
                self.async_wrapper.clone()
            } else {
                self.sync_wrapper.clone()
            });
        }

        if self.done && self.needs_import {
            body.insert(0, self.import.clone());
        }
        *items = body;
    }
}

struct StaticProps {
    ctxt: SyntaxContext,
    function: Box<Function>,
    // other declarators of the same export statement are still in it
    keep_item: bool,
}

fn is_ssg_export(name: &str) -> bool {
    SSG_EXPORTS.contains(&name)
}

fn take_static_props(item: &mut ModuleItem) -> Option<StaticProps> {
    let ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export_decl)) = item else {
        return None;
    };
    match &mut export_decl.decl {
        Decl::Fn(fn_decl) if is_ssg_export(&fn_decl.ident.sym) => Some(StaticProps {
            ctxt: fn_decl.ident.ctxt,
            function: fn_decl.function.take(),
            keep_item: false,
        }),
        Decl::Var(var_decl) => {
            let index = var_decl.decls.iter().position(|declarator| {
                matches!(
                    declarator.init.as_deref(),
                    Some(Expr::Fn(_) | Expr::Arrow(_))
                )
            })?;
            let Pat::Ident(binding_ident) = &var_decl.decls[index].name else {
                return None;
            };
            if !is_ssg_export(&binding_ident.id.sym) {
                return None;
            }
            let ctxt = binding_ident.id.ctxt;
            let declarator = var_decl.decls.remove(index);
            let function = match *declarator.init? {
                Expr::Fn(fn_expr) => fn_expr.function,
                Expr::Arrow(arrow_expr) => Box::new(arrow_to_function(arrow_expr)),
                _ => return None,
            };
            Some(StaticProps {
                ctxt,
                function,
                keep_item: !var_decl.decls.is_empty(),
            })
        }
        _ => None,
    }
}

fn arrow_to_function(arrow_expr: ArrowExpr) -> Function {
    let ArrowExpr {
        params,
        body,
        is_async,
        is_generator,
        return_type,
        type_params,
        span,
        ctxt,
        ..
    } = arrow_expr;
    Function {
        params: params
            .into_iter()
            .map(|pat| pat.into())
            .collect::<Vec<_>>(),
        body: Some(match *body {
            BlockStmtOrExpr::BlockStmt(block_stmt) => block_stmt,
            BlockStmtOrExpr::Expr(expr) => BlockStmt {
                span,
                ctxt,
                stmts: vec![Stmt::Return(ReturnStmt {
                    span,
                    arg: Some(expr),
                })],
            },
        }),
        is_async,
        is_generator,
        span,
        ctxt,
        return_type,
        type_params,
        decorators: vec![],
    }
}

fn is_static_context_import(item: &ModuleItem) -> bool {
    let ModuleItem::ModuleDecl(ModuleDecl::Import(import_decl)) = item else {
        return false;
    };
    &*import_decl.src.value == STATIC_CONTEXT_MODULE
        && import_decl.specifiers.iter().any(|specifier| {
            matches!(
                specifier,
                ImportSpecifier::Named(named) if &*named.local.sym == "getStaticContext"
            )
        })
}
