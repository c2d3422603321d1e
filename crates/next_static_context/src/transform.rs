use std::collections::HashSet;

use anyhow::Result;
use swc_core::ecma::ast::Module;
use swc_core::ecma::visit::VisitMutWith;
use tracing::debug;

use crate::binding::BindingIndex;
use crate::config::{Config, Mode};
use crate::error::TransformError;
use crate::visitors::export_stripper::ExportStripper;
use crate::visitors::reference_marker::mark_candidates;
use crate::visitors::static_props_wrapper::StaticPropsWrapper;
use crate::visitors::sweeper::{SweptSite, Sweeper};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StripReport {
    /// Export specifiers, declarations or declarators removed for the name.
    pub exports_removed: usize,
    /// Swept binding names in removal order, one per declaration site.
    pub swept: Vec<String>,
    pub passes: usize,
}

/// Declaration sites removed by earlier passes. One binding can have several
/// sites (`var a; var a;`), each goes exactly once.
#[derive(Debug, Default)]
struct SweptSites(HashSet<SweptSite>);

impl SweptSites {
    /// Records one pass worth of removals and returns how many there were.
    fn record(
        &mut self,
        sites: Vec<SweptSite>,
        report: &mut StripReport,
    ) -> Result<usize, TransformError> {
        let count = sites.len();
        for site in sites {
            let name = site.id.0.to_string();
            if !self.0.insert(site) {
                return Err(TransformError::BindingRemovedTwice { name });
            }
            report.swept.push(name);
        }
        Ok(count)
    }
}

/// Removes the export `export_name` and every function, variable and import
/// that was only there to serve it.
///
/// `module` must have been through `resolver`. On error it is left exactly as
/// it was passed in.
pub fn strip_export(
    module: &mut Module,
    export_name: &str,
    max_passes: Option<usize>,
) -> Result<StripReport, TransformError> {
    let mut working = module.clone();

    let candidates = mark_candidates(&BindingIndex::crawl(&working));

    let mut stripper = ExportStripper::new(export_name);
    working.visit_mut_with(&mut stripper);
    if stripper.removed == 0 {
        debug!("no `{}` export, nothing to strip", export_name);
        return Ok(StripReport::default());
    }

    let limit = max_passes.unwrap_or(candidates.len() + 1);
    let mut swept = SweptSites::default();
    let mut report = StripReport {
        exports_removed: stripper.removed,
        ..Default::default()
    };

    loop {
        if report.passes >= limit {
            return Err(TransformError::FixedPointNotReached {
                passes: report.passes,
                limit,
            });
        }
        report.passes += 1;

        let index = BindingIndex::crawl(&working);
        let mut sweeper = Sweeper::new(&candidates, &index);
        working.visit_mut_with(&mut sweeper);

        let count = swept.record(sweeper.into_removed(), &mut report)?;
        debug!("pass {}: swept {} declarations", report.passes, count);
        if count == 0 {
            break;
        }
    }

    *module = working;
    Ok(report)
}

pub fn transform_js(module: &mut Module, config: &Config) -> Result<()> {
    match config.mode {
        Mode::Client => {
            let report = strip_export(module, &config.export_name, config.max_passes)?;
            debug!(
                "strip `{}`: {} export(s), swept [{}] in {} passes",
                config.export_name,
                report.exports_removed,
                report.swept.join(", "),
                report.passes
            );
        }
        Mode::Server => {
            let mut wrapper = StaticPropsWrapper::new()?;
            module.visit_mut_with(&mut wrapper);
            debug!("wrap getStaticProps: {}", wrapper.done());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::tests::TestUtils;

    fn strip(code: &str) -> (String, StripReport) {
        let mut tu = TestUtils::gen_js_ast(code);
        let report = strip_export(&mut tu.ast.ast, "getStaticContext", None).unwrap();
        (tu.js_ast_to_code(), report)
    }

    #[test]
    fn test_chain_needs_several_passes() {
        let (code, report) = strip(
            r#"
const a = 1;
const b = () => a;
const c = () => b();
export function getStaticContext() { return c(); }
export const kept = 1;
"#,
        );
        assert_eq!(code, TestUtils::normalize("export const kept = 1;"));
        assert_eq!(report.exports_removed, 1);
        assert_eq!(report.swept, vec!["c", "b", "a"]);
        // one pass per link, plus the one that finds nothing
        assert_eq!(report.passes, 4);
    }

    #[test]
    fn test_no_export_is_a_no_op() {
        let code = "const a = 1; export const b = a;";
        let (out, report) = strip(code);
        assert_eq!(out, TestUtils::normalize(code));
        assert_eq!(report, StripReport::default());
    }

    #[test]
    fn test_pass_limit_is_fatal_and_leaves_module_untouched() {
        let code = r#"
const a = 1;
const b = () => a;
export function getStaticContext() { return b(); }
"#;
        let mut tu = TestUtils::gen_js_ast(code);
        let err = strip_export(&mut tu.ast.ast, "getStaticContext", Some(1)).unwrap_err();
        assert_eq!(
            err,
            TransformError::FixedPointNotReached {
                passes: 1,
                limit: 1
            }
        );
        assert_eq!(tu.js_ast_to_code(), TestUtils::normalize(code));
    }

    #[test]
    fn test_same_site_swept_again_is_fatal() {
        let code = r#"
use(a);
var a = 1;
var a = 2;
"#;
        let mut tu = TestUtils::gen_js_ast(code);
        let candidates = mark_candidates(&BindingIndex::crawl(&tu.ast.ast));
        tu.ast.ast.body.remove(0);
        let pristine = tu.ast.ast.clone();

        let mut swept = SweptSites::default();
        let mut report = StripReport::default();
        let sweep = |module: &mut Module| {
            let index = BindingIndex::crawl(&*module);
            let mut sweeper = Sweeper::new(&candidates, &index);
            module.visit_mut_with(&mut sweeper);
            sweeper.into_removed()
        };

        let first = sweep(&mut tu.ast.ast);
        assert_eq!(swept.record(first, &mut report), Ok(2));
        assert_eq!(report.swept, vec!["a", "a"]);

        // the same declarations coming back means a pass removed something twice
        let mut again = pristine;
        let second = sweep(&mut again);
        assert_eq!(
            swept.record(second, &mut report),
            Err(TransformError::BindingRemovedTwice {
                name: "a".to_string()
            })
        );
    }

    #[test]
    fn test_server_mode_dispatch() {
        let mut tu =
            TestUtils::gen_js_ast("export function getStaticProps() { return { props: {} }; }");
        let config = Config {
            mode: Mode::Server,
            ..Default::default()
        };
        transform_js(&mut tu.ast.ast, &config).unwrap();
        assert!(tu.js_ast_to_code().contains("_getStaticProps"));
    }

    #[test]
    fn test_client_mode_dispatch() {
        let mut tu = TestUtils::gen_js_ast(
            "import fs from 'fs'; export function getStaticContext() { return fs; }",
        );
        transform_js(&mut tu.ast.ast, &Config::default()).unwrap();
        assert_eq!(tu.js_ast_to_code(), TestUtils::normalize(""));
    }
}
