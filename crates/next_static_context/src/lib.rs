use std::sync::Arc;

use anyhow::Result;

pub mod ast;
pub mod binding;
pub mod config;
pub mod error;
pub mod logger;
pub mod transform;
pub mod visitors;

mod removable;

use crate::ast::{Context, JsAst};
use crate::config::Config;

/// Parses `code`, runs the transform for `config.mode` and prints the result.
pub fn transform_code(path: &str, code: String, config: Config) -> Result<String> {
    config.validate()?;
    let context = Arc::new(Context::new(config));
    let mut ast = JsAst::new(path, code, context)?;
    ast.transform()?;
    ast.generate()
}
