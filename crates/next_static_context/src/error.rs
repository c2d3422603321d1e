use thiserror::Error;

/// Failures of the elimination itself. These mean the transform has a bug,
/// never that the input module is unusual, so they are never swallowed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    #[error("dead code sweep did not settle after {passes} passes (limit {limit})")]
    FixedPointNotReached { passes: usize, limit: usize },
    #[error("binding `{name}` was removed in an earlier pass but still has a declaration")]
    BindingRemovedTwice { name: String },
}
