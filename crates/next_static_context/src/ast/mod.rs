use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use swc_core::common::sync::Lrc;
use swc_core::common::{FileName, Globals, Mark, SourceMap, Span, Spanned, DUMMY_SP, GLOBALS};
use swc_core::ecma::ast::{EsVersion, Module, ModuleItem};
use swc_core::ecma::codegen::text_writer::JsWriter;
use swc_core::ecma::codegen::{Config as JsCodegenConfig, Emitter};
use swc_core::ecma::parser::error::Error as SwcParseError;
use swc_core::ecma::parser::lexer::Lexer;
use swc_core::ecma::parser::{EsSyntax, Parser, StringInput, Syntax, TsSyntax};
use swc_core::ecma::transforms::base::resolver;
use swc_core::ecma::visit::{VisitMut, VisitMutWith};
use tracing::debug;

use crate::config::Config;
use crate::transform::transform_js;

pub mod error;

use error::{GenerateError, ParseError};

pub struct Context {
    pub config: Config,
    pub cm: Lrc<SourceMap>,
    pub globals: Globals,
}

impl Context {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cm: Default::default(),
            globals: Globals::new(),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// A parsed module whose identifiers have been tagged by `resolver`, so every
/// binding is identified by its `Id`.
pub struct JsAst {
    pub ast: Module,
    pub path: String,
    context: Arc<Context>,
}

impl fmt::Debug for JsAst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsAst({})", self.path)
    }
}

impl JsAst {
    pub fn new(path: &str, content: String, context: Arc<Context>) -> Result<Self> {
        let fm = context
            .cm
            .new_source_file(FileName::Real(PathBuf::from(path)).into(), content);
        let is_ts = path.ends_with(".ts") || path.ends_with(".tsx");
        let syntax = syntax_for(path);
        let lexer = Lexer::new(syntax, EsVersion::latest(), StringInput::from(&*fm), None);
        let mut parser = Parser::new_from(lexer);
        let result = parser.parse_module();

        let mut ast_errors = parser.take_errors();
        let ast = match result {
            Ok(ast) if ast_errors.is_empty() => ast,
            result => {
                if let Err(err) = result {
                    ast_errors.push(err);
                }
                return Err(anyhow!(ParseError::JsParseError {
                    messages: code_frames(&ast_errors, path, &context.cm),
                }));
            }
        };

        GLOBALS.set(&context.globals, || {
            let mut ast = ast;
            ast.visit_mut_with(&mut resolver(Mark::new(), Mark::new(), is_ts));
            debug!("parsed {} ({} items)", path, ast.body.len());
            Ok(JsAst {
                ast,
                path: path.to_string(),
                context: context.clone(),
            })
        })
    }

    pub fn transform(&mut self) -> Result<()> {
        let context = self.context.clone();
        GLOBALS.set(&context.globals, || transform_js(&mut self.ast, &context.config))
    }

    pub fn generate(&self) -> Result<String> {
        let cm = self.context.cm.clone();
        let mut buf = vec![];
        {
            let mut emitter = Emitter {
                cfg: JsCodegenConfig::default()
                    .with_minify(self.context.config.minify)
                    .with_target(EsVersion::latest()),
                cm: cm.clone(),
                comments: None,
                wr: Box::new(JsWriter::new(cm.clone(), "\n", &mut buf, None)),
            };
            emitter.emit_module(&self.ast).map_err(|err| {
                anyhow!(GenerateError::JsGenerateError {
                    message: err.to_string()
                })
            })?;
        }
        Ok(String::from_utf8(buf)?)
    }
}

fn syntax_for(path: &str) -> Syntax {
    if path.ends_with(".ts") || path.ends_with(".tsx") {
        Syntax::Typescript(TsSyntax {
            tsx: path.ends_with(".tsx"),
            decorators: true,
            ..Default::default()
        })
    } else {
        Syntax::Es(EsSyntax {
            jsx: true,
            decorators: true,
            decorators_before_export: true,
            ..Default::default()
        })
    }
}

fn code_frames(errors: &[SwcParseError], path: &str, cm: &Lrc<SourceMap>) -> String {
    errors
        .iter()
        .map(|err| {
            let loc = cm.lookup_char_pos(err.span().lo);
            format!(
                "{}:{}:{}: {}",
                path,
                loc.line,
                loc.col_display + 1,
                err.kind().msg()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parses a code template into module items. Spans are reset since the
/// template lives in its own source map.
pub fn parse_items(code: &str) -> Result<Vec<ModuleItem>> {
    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(FileName::Anon.into(), code.to_string());
    let lexer = Lexer::new(
        Syntax::Es(Default::default()),
        EsVersion::latest(),
        StringInput::from(&*fm),
        None,
    );
    let mut parser = Parser::new_from(lexer);
    let result = parser.parse_module();
    let mut ast_errors = parser.take_errors();
    let mut module = match result {
        Ok(module) if ast_errors.is_empty() => module,
        result => {
            if let Err(err) = result {
                ast_errors.push(err);
            }
            return Err(anyhow!(ParseError::JsParseError {
                messages: code_frames(&ast_errors, "<template>", &cm),
            }));
        }
    };
    module.visit_mut_with(&mut SpanResetter);
    Ok(module.body)
}

struct SpanResetter;

impl VisitMut for SpanResetter {
    fn visit_mut_span(&mut self, span: &mut Span) {
        *span = DUMMY_SP;
    }
}
